//! Execution frame types
//!
//! Frames live in the `Heap` arena and are addressed by `FrameId`. A continuation
//! captures ids, never the frames themselves, so every driver forked from the
//! same point sees the same bindings.

use super::continuation::Continuation;
use super::values::Val;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable index of a frame in the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub(crate) usize);

impl FrameId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Activation record
///
/// `returns` is set on function frames (and the top-level frame) and marks the
/// boundary of variable lookup. `fault` is set on the top-level frame and on
/// try scopes. Frames with neither are nested scopes and defer both to their
/// parent.
#[derive(Debug, Clone)]
pub struct Frame {
    pub parent: Option<FrameId>,
    pub returns: Option<Continuation>,
    pub fault: Option<Continuation>,
    pub locals: HashMap<String, Val>,
}

impl Frame {
    /// Top-level frame: no caller, returning or faulting ends the program
    pub fn top_level() -> Self {
        Self {
            parent: None,
            returns: Some(Continuation::halt()),
            fault: Some(Continuation::halt()),
            locals: HashMap::new(),
        }
    }

    /// Frame for a function invocation returning to `k`
    pub fn call(caller: FrameId, k: Continuation) -> Self {
        Self {
            parent: Some(caller),
            returns: Some(k),
            fault: None,
            locals: HashMap::new(),
        }
    }

    /// Scope whose faults go to `handler`
    pub fn try_scope(parent: FrameId, handler: Continuation) -> Self {
        Self {
            parent: Some(parent),
            returns: None,
            fault: Some(handler),
            locals: HashMap::new(),
        }
    }

    /// Plain nested scope
    pub fn scope(parent: FrameId) -> Self {
        Self {
            parent: Some(parent),
            returns: None,
            fault: None,
            locals: HashMap::new(),
        }
    }

    pub fn is_function_boundary(&self) -> bool {
        self.returns.is_some()
    }
}
