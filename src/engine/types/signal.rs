//! Signals returned up through native (Rust) call chains
//!
//! Native functions return `Result<Val, Signal>`. A signal is not a failure of
//! the native code: it asks the nearest trampoline boundary to do something the
//! native frame cannot do itself, and every native frame in between forwards it
//! with `?`.

use super::values::{Callable, Val};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Invoke `callable` in place of the native call; its result becomes the
    /// result of the native call
    Invoke(Invocation),
    /// Raise a program fault at the native call site
    Throw(Val),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub callable: Arc<Callable>,
    pub args: Vec<Val>,
}

impl Signal {
    pub fn invoke(callable: Arc<Callable>, args: Vec<Val>) -> Self {
        Signal::Invoke(Invocation { callable, args })
    }
}
