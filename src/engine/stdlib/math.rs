//! Math and collection stdlib functions

use super::expect_args;
use crate::engine::errors::{self, ErrorInfo};
use crate::engine::types::{Signal, Val};

fn number(args: &[Val], name: &str) -> Result<f64, Signal> {
    expect_args(args, 1)?;
    match &args[0] {
        Val::Num(n) => Ok(*n),
        other => Err(Signal::Throw(Val::Error(ErrorInfo::new(
            errors::WRONG_ARG_TYPE,
            format!("{} expects a number, got {}", name, other.type_name()),
        )))),
    }
}

/// floor(n)
pub fn floor(args: &[Val]) -> Result<Val, Signal> {
    Ok(Val::Num(number(args, "floor")?.floor()))
}

/// abs(n)
pub fn abs(args: &[Val]) -> Result<Val, Signal> {
    Ok(Val::Num(number(args, "abs")?.abs()))
}

/// len(list | string)
pub fn len(args: &[Val]) -> Result<Val, Signal> {
    expect_args(args, 1)?;
    match &args[0] {
        Val::List(items) => Ok(Val::Num(items.len() as f64)),
        Val::Str(s) => Ok(Val::Num(s.chars().count() as f64)),
        other => Err(Signal::Throw(Val::Error(ErrorInfo::new(
            errors::WRONG_ARG_TYPE,
            format!("len expects a list or string, got {}", other.type_name()),
        )))),
    }
}
