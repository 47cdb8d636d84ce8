//! Binary operator semantics

use super::errors::{self, ErrorInfo};
use super::types::{BinOp, Val};

/// Apply a binary operator to two evaluated operands
pub fn apply(op: BinOp, lhs: &Val, rhs: &Val) -> Result<Val, ErrorInfo> {
    match op {
        BinOp::Add => match (lhs, rhs) {
            (Val::Num(a), Val::Num(b)) => Ok(Val::Num(a + b)),
            (Val::Str(a), Val::Str(b)) => Ok(Val::Str(format!("{}{}", a, b))),
            (Val::List(a), Val::List(b)) => {
                Ok(Val::List(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => Err(mismatch(op, lhs, rhs)),
        },

        BinOp::Sub => numeric(op, lhs, rhs, |a, b| Ok(a - b)),
        BinOp::Mul => numeric(op, lhs, rhs, |a, b| Ok(a * b)),
        BinOp::Div => numeric(op, lhs, rhs, |a, b| {
            if b == 0.0 {
                Err(ErrorInfo::new(errors::DIVISION_BY_ZERO, "Division by zero"))
            } else {
                Ok(a / b)
            }
        }),
        BinOp::Mod => numeric(op, lhs, rhs, |a, b| {
            if b == 0.0 {
                Err(ErrorInfo::new(errors::DIVISION_BY_ZERO, "Modulo by zero"))
            } else {
                Ok(a % b)
            }
        }),

        BinOp::Eq => Ok(Val::Bool(lhs == rhs)),
        BinOp::Ne => Ok(Val::Bool(lhs != rhs)),

        BinOp::Lt => compare(op, lhs, rhs, |o| o.is_lt()),
        BinOp::Le => compare(op, lhs, rhs, |o| o.is_le()),
        BinOp::Gt => compare(op, lhs, rhs, |o| o.is_gt()),
        BinOp::Ge => compare(op, lhs, rhs, |o| o.is_ge()),

        // Only reached when the left operand did not short-circuit
        BinOp::And | BinOp::Or => Ok(rhs.clone()),
    }
}

fn numeric(
    op: BinOp,
    lhs: &Val,
    rhs: &Val,
    f: impl Fn(f64, f64) -> Result<f64, ErrorInfo>,
) -> Result<Val, ErrorInfo> {
    match (lhs, rhs) {
        (Val::Num(a), Val::Num(b)) => f(*a, *b).map(Val::Num),
        _ => Err(mismatch(op, lhs, rhs)),
    }
}

fn compare(
    op: BinOp,
    lhs: &Val,
    rhs: &Val,
    f: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Val, ErrorInfo> {
    let ordering = match (lhs, rhs) {
        (Val::Num(a), Val::Num(b)) => a.partial_cmp(b),
        (Val::Str(a), Val::Str(b)) => Some(a.cmp(b)),
        _ => return Err(mismatch(op, lhs, rhs)),
    };
    // NaN compares false against everything
    Ok(Val::Bool(ordering.map(f).unwrap_or(false)))
}

fn mismatch(op: BinOp, lhs: &Val, rhs: &Val) -> ErrorInfo {
    ErrorInfo::new(
        errors::TYPE_ERROR,
        format!(
            "Cannot apply {:?} to {} and {}",
            op,
            lhs.type_name(),
            rhs.type_name()
        ),
    )
}
