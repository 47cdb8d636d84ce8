//! Engine error values and error codes
//!
//! `ErrorInfo` is the payload of faults raised by the engine itself (undefined
//! variables, type mismatches, bad arity). Faults raised by interpreted code with
//! `Throw` may carry any value.

use serde::{Deserialize, Serialize};

pub const UNDEFINED_VARIABLE: &str = "UNDEFINED_VARIABLE";
pub const TYPE_ERROR: &str = "TYPE_ERROR";
pub const DIVISION_BY_ZERO: &str = "DIVISION_BY_ZERO";
pub const NOT_CALLABLE: &str = "NOT_CALLABLE";
pub const WRONG_ARG_COUNT: &str = "WRONG_ARG_COUNT";
pub const WRONG_ARG_TYPE: &str = "WRONG_ARG_TYPE";
pub const USER_FAILURE: &str = "USER_FAILURE";

/// Error value with code and message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
