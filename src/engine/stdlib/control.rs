//! Control stdlib functions: suspend, apply, fail

use super::{call_builtin, expect_args};
use crate::engine::errors::{self, ErrorInfo};
use crate::engine::types::{Block, Callable, Signal, Val};
use std::sync::Arc;

/// Suspend the running program.
///
/// Control goes back to the caller of `Driver::run`, which returns `value`.
/// When the driver is resumed with `run(y)`, the call to `suspend` evaluates
/// to `y`.
///
/// This always returns `Err(Signal::Invoke(..))` carrying the function
/// `fn(v) = yield v`; native code forwards it with `?` until it reaches the
/// engine, which invokes that function like any other call. If the signal
/// reaches code that is not being run by a driver, converting it into
/// `crate::Error` reports it as `Error::UncaughtSignal`.
pub fn suspend(value: Val) -> Result<Val, Signal> {
    Err(Signal::invoke(suspend_callable(), vec![value]))
}

/// The synthetic function behind `suspend`
pub fn suspend_callable() -> Arc<Callable> {
    Arc::new(Callable::new(
        vec!["v".to_string()],
        Block::yield_(Block::local("v")),
    ))
}

/// suspend(value)
pub fn suspend_builtin(args: &[Val]) -> Result<Val, Signal> {
    expect_args(args, 1)?;
    suspend(args[0].clone())
}

/// apply(f, ...args) - call `f` from native code
///
/// Builtins are called directly on the native stack, so a builtin that
/// signals (e.g. `apply(suspend, x)`) has its signal forwarded through this
/// frame.
pub fn apply(args: &[Val]) -> Result<Val, Signal> {
    let Some((callee, rest)) = args.split_first() else {
        return Err(Signal::Throw(Val::Error(ErrorInfo::new(
            errors::WRONG_ARG_COUNT,
            "apply expects a function as its first argument",
        ))));
    };

    match callee {
        Val::Function(callable) => Err(Signal::invoke(callable.clone(), rest.to_vec())),
        Val::Builtin(builtin) => call_builtin(builtin, rest),
        other => Err(Signal::Throw(Val::Error(ErrorInfo::new(
            errors::NOT_CALLABLE,
            format!("Value of type {} is not callable", other.type_name()),
        )))),
    }
}

/// fail(message) - raise a fault from native code
pub fn fail(args: &[Val]) -> Result<Val, Signal> {
    expect_args(args, 1)?;
    let message = match &args[0] {
        Val::Str(s) => s.clone(),
        other => format!("{:?}", other),
    };
    Err(Signal::Throw(Val::Error(ErrorInfo::new(
        errors::USER_FAILURE,
        message,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspend_returns_invocation_signal() {
        let Err(Signal::Invoke(invocation)) = suspend(Val::Num(3.0)) else {
            unreachable!("suspend must signal");
        };
        assert_eq!(invocation.args, vec![Val::Num(3.0)]);
        assert_eq!(invocation.callable.params, vec!["v".to_string()]);
        assert_eq!(
            *invocation.callable.body,
            Block::yield_(Block::local("v"))
        );
    }

    #[test]
    fn test_signal_crosses_nested_native_frames() {
        // apply(apply, suspend, 1) -> apply(suspend, 1) -> suspend(1)
        let args = vec![
            Val::Builtin(super::super::Builtin::Apply),
            Val::Builtin(super::super::Builtin::Suspend),
            Val::Num(1.0),
        ];
        let Err(Signal::Invoke(invocation)) = apply(&args) else {
            unreachable!("signal must propagate");
        };
        assert_eq!(invocation.args, vec![Val::Num(1.0)]);
    }

    #[test]
    fn test_apply_non_callable_throws() {
        let Err(Signal::Throw(Val::Error(err))) = apply(&[Val::Num(1.0)]) else {
            unreachable!("expected a fault");
        };
        assert_eq!(err.code, errors::NOT_CALLABLE);
    }
}
