//! Block tree node types
//!
//! A `Block` is the unit of program logic consumed by the engine. Trees arrive
//! fully resolved (usually as JSON) from whatever front end produced them.
//! Nodes that a continuation has to come back to after evaluating a child are
//! held behind an `Arc`, so the continuation can point at the node without
//! copying the subtree.

use super::values::Val;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Block AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Block {
    Const {
        v: Val,
    },
    Local {
        name: String,
    },
    /// Declare a binding in the current frame
    Let {
        name: String,
        value: Arc<Block>,
    },
    /// Update the nearest existing binding
    Assign {
        name: String,
        value: Arc<Block>,
    },
    Sequence(Arc<Sequence>),
    Binary(Arc<Binary>),
    Not {
        value: Arc<Block>,
    },
    If(Arc<If>),
    While(Arc<While>),
    Call(Arc<Call>),
    Return {
        value: Option<Arc<Block>>,
    },
    Throw {
        value: Arc<Block>,
    },
    TryCatch(Arc<TryCatch>),
    /// Suspend the program, handing the value to the driver
    Yield {
        value: Arc<Block>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub body: Vec<Arc<Block>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub op: BinOp,
    pub lhs: Arc<Block>,
    pub rhs: Arc<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub test: Arc<Block>,
    pub then_b: Arc<Block>,
    pub else_b: Option<Arc<Block>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct While {
    pub test: Arc<Block>,
    pub body: Arc<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: Arc<Block>,
    pub args: Vec<Arc<Block>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryCatch {
    pub body: Arc<Block>,
    pub catch_var: String,
    pub handler: Arc<Block>,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/* ===================== Constructors ===================== */

impl Block {
    pub fn constant(v: impl Into<Val>) -> Self {
        Block::Const { v: v.into() }
    }

    pub fn null() -> Self {
        Block::Const { v: Val::Null }
    }

    pub fn local(name: &str) -> Self {
        Block::Local {
            name: name.to_string(),
        }
    }

    pub fn let_(name: &str, value: Block) -> Self {
        Block::Let {
            name: name.to_string(),
            value: Arc::new(value),
        }
    }

    pub fn assign(name: &str, value: Block) -> Self {
        Block::Assign {
            name: name.to_string(),
            value: Arc::new(value),
        }
    }

    pub fn sequence(body: Vec<Block>) -> Self {
        Block::Sequence(Arc::new(Sequence {
            body: body.into_iter().map(Arc::new).collect(),
        }))
    }

    pub fn binary(op: BinOp, lhs: Block, rhs: Block) -> Self {
        Block::Binary(Arc::new(Binary {
            op,
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        }))
    }

    pub fn not(value: Block) -> Self {
        Block::Not {
            value: Arc::new(value),
        }
    }

    pub fn if_(test: Block, then_b: Block, else_b: Option<Block>) -> Self {
        Block::If(Arc::new(If {
            test: Arc::new(test),
            then_b: Arc::new(then_b),
            else_b: else_b.map(Arc::new),
        }))
    }

    pub fn while_(test: Block, body: Block) -> Self {
        Block::While(Arc::new(While {
            test: Arc::new(test),
            body: Arc::new(body),
        }))
    }

    pub fn call(callee: Block, args: Vec<Block>) -> Self {
        Block::Call(Arc::new(Call {
            callee: Arc::new(callee),
            args: args.into_iter().map(Arc::new).collect(),
        }))
    }

    /// Call a function bound to `name`
    pub fn call_named(name: &str, args: Vec<Block>) -> Self {
        Block::call(Block::local(name), args)
    }

    pub fn return_(value: Option<Block>) -> Self {
        Block::Return {
            value: value.map(Arc::new),
        }
    }

    pub fn throw(value: Block) -> Self {
        Block::Throw {
            value: Arc::new(value),
        }
    }

    pub fn try_catch(body: Block, catch_var: &str, handler: Block) -> Self {
        Block::TryCatch(Arc::new(TryCatch {
            body: Arc::new(body),
            catch_var: catch_var.to_string(),
            handler: Arc::new(handler),
        }))
    }

    pub fn yield_(value: Block) -> Self {
        Block::Yield {
            value: Arc::new(value),
        }
    }
}
