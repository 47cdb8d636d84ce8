//! Standard library function implementations
//!
//! This module contains all builtin function implementations organized by category.

pub mod control;
pub mod math;

use super::types::{Signal, Val};
use serde::{Deserialize, Serialize};

pub use control::{suspend, suspend_callable};

/* ===================== Builtin Function Types ===================== */

/// Builtin function identifiers
///
/// Each variant represents a specific native function. These are serializable
/// and can be stored in frames and continuations like any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Builtin {
    Suspend,
    Apply,
    Fail,
    Floor,
    Abs,
    Len,
}

impl Builtin {
    /// Name under which the builtin is visible to programs
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Suspend => "suspend",
            Builtin::Apply => "apply",
            Builtin::Fail => "fail",
            Builtin::Floor => "floor",
            Builtin::Abs => "abs",
            Builtin::Len => "len",
        }
    }

    pub fn by_name(name: &str) -> Option<Builtin> {
        match name {
            "suspend" => Some(Builtin::Suspend),
            "apply" => Some(Builtin::Apply),
            "fail" => Some(Builtin::Fail),
            "floor" => Some(Builtin::Floor),
            "abs" => Some(Builtin::Abs),
            "len" => Some(Builtin::Len),
            _ => None,
        }
    }
}

/* ===================== Builtin Dispatcher ===================== */

/// Call a builtin function with arguments
///
/// Native code cannot suspend or run interpreted code by itself; it returns a
/// `Signal` instead, which the caller must forward unchanged.
pub fn call_builtin(func: &Builtin, args: &[Val]) -> Result<Val, Signal> {
    match func {
        Builtin::Suspend => control::suspend_builtin(args),
        Builtin::Apply => control::apply(args),
        Builtin::Fail => control::fail(args),
        Builtin::Floor => math::floor(args),
        Builtin::Abs => math::abs(args),
        Builtin::Len => math::len(args),
    }
}

/// Raise a wrong-arity fault from native code
pub(crate) fn expect_args(args: &[Val], count: usize) -> Result<(), Signal> {
    if args.len() != count {
        return Err(Signal::Throw(Val::Error(super::errors::ErrorInfo::new(
            super::errors::WRONG_ARG_COUNT,
            format!("Expected {} arguments, got {}", count, args.len()),
        ))));
    }
    Ok(())
}
