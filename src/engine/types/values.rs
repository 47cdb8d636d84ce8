//! Runtime value types

use super::super::errors::ErrorInfo;
use super::super::stdlib::Builtin;
use super::block::Block;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    Obj(HashMap<String, Val>),
    /// Interpreted function
    Function(Arc<Callable>),
    /// Native function from the standard library
    Builtin(Builtin),
    /// Error value with code and message
    Error(ErrorInfo),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Bool(b) => *b,
            Val::Null => false,
            _ => true,
        }
    }

    /// Short name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Null => "null",
            Val::Bool(_) => "bool",
            Val::Num(_) => "number",
            Val::Str(_) => "string",
            Val::List(_) => "list",
            Val::Obj(_) => "object",
            Val::Function(_) => "function",
            Val::Builtin(_) => "builtin",
            Val::Error(_) => "error",
        }
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Num(n)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

/* ===================== Callable ===================== */

/// A function value: ordered parameter names and a body.
///
/// Invoking it allocates a new frame binding the arguments to the parameters
/// and evaluates the body with the call site's continuation as the return
/// continuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callable {
    pub params: Vec<String>,
    pub body: Arc<Block>,
}

impl Callable {
    pub fn new(params: Vec<String>, body: Block) -> Self {
        Self {
            params,
            body: Arc::new(body),
        }
    }
}
