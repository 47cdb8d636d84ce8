//! Function application
//!
//! The trampoline boundary for native code: a builtin that needs an
//! interpreted function to run (including `suspend`) returns
//! `Signal::Invoke`, and it is turned into an ordinary invocation here.

use super::errors::{self, ErrorInfo};
use super::exec_loop::Next;
use super::heap::Heap;
use super::stdlib::call_builtin;
use super::types::{Callable, Continuation, Frame, FrameId, Signal, Val};
use tracing::trace;

/// Call `callee` with `args` from `env`; the result goes to `k`
pub fn apply(heap: &mut Heap, callee: Val, args: Vec<Val>, env: FrameId, k: Continuation) -> Next {
    match callee {
        Val::Function(callable) => invoke(heap, &callable, args, env, k),

        Val::Builtin(builtin) => match call_builtin(&builtin, &args) {
            Ok(v) => Next::resume(k, v),
            Err(Signal::Invoke(invocation)) => {
                trace!(builtin = ?builtin, "native call requested invocation");
                invoke(heap, &invocation.callable, invocation.args, env, k)
            }
            Err(Signal::Throw(fault)) => Next::throw(env, fault),
        },

        other => Next::throw(
            env,
            Val::Error(ErrorInfo::new(
                errors::NOT_CALLABLE,
                format!("Value of type {} is not callable", other.type_name()),
            )),
        ),
    }
}

/// Invoke an interpreted function: new frame, bound parameters, body
pub fn invoke(
    heap: &mut Heap,
    callable: &Callable,
    args: Vec<Val>,
    caller: FrameId,
    k: Continuation,
) -> Next {
    if args.len() != callable.params.len() {
        return Next::throw(
            caller,
            Val::Error(ErrorInfo::new(
                errors::WRONG_ARG_COUNT,
                format!(
                    "Expected {} arguments, got {}",
                    callable.params.len(),
                    args.len()
                ),
            )),
        );
    }

    let frame = heap.alloc(Frame::call(caller, k.clone()));
    for (param, arg) in callable.params.iter().zip(args) {
        heap.declare(frame, param, arg);
    }

    // Falling off the end of the body returns its value
    Next::eval(callable.body.clone(), frame, k)
}
