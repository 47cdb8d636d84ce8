//! Continuation handlers
//!
//! `receive` feeds a value into a continuation and describes what happens next.
//! Like block evaluation, it never runs more than one unit of work.

use super::call::apply;
use super::errors::{self, ErrorInfo};
use super::exec_loop::Next;
use super::heap::Heap;
use super::operators;
use super::types::{BinOp, Continuation, Frame, Kont, Val};

pub fn receive(heap: &mut Heap, k: &Continuation, value: Val) -> Next {
    match k.kont() {
        // Finished: surfaces to the driver as a suspension that cannot be resumed
        Kont::Halt => Next::Yield {
            k: k.clone(),
            value,
        },

        Kont::Start { block, env, k } => Next::eval(block.clone(), *env, k.clone()),

        Kont::Bind {
            name,
            declare,
            env,
            k,
        } => {
            if *declare {
                heap.declare(*env, name, value.clone());
            } else if !heap.assign(*env, name, value.clone()) {
                return Next::throw(
                    *env,
                    Val::Error(ErrorInfo::new(
                        errors::UNDEFINED_VARIABLE,
                        format!("Cannot assign to undeclared variable '{}'", name),
                    )),
                );
            }
            Next::resume(k.clone(), value)
        }

        Kont::Seq { seq, next, env, k } => match seq.body.get(*next) {
            // Value of the last element is the value of the sequence
            None => Next::resume(k.clone(), value),
            Some(block) => Next::eval(
                block.clone(),
                *env,
                Continuation::new(Kont::Seq {
                    seq: seq.clone(),
                    next: next + 1,
                    env: *env,
                    k: k.clone(),
                }),
            ),
        },

        Kont::BinaryLhs { bin, env, k } => {
            let short_circuit = match bin.op {
                BinOp::And => !value.is_truthy(),
                BinOp::Or => value.is_truthy(),
                _ => false,
            };
            if short_circuit {
                return Next::resume(k.clone(), value);
            }

            Next::eval(
                bin.rhs.clone(),
                *env,
                Continuation::new(Kont::BinaryRhs {
                    op: bin.op,
                    lhs: value,
                    env: *env,
                    k: k.clone(),
                }),
            )
        }

        Kont::BinaryRhs { op, lhs, env, k } => match operators::apply(*op, lhs, &value) {
            Ok(result) => Next::resume(k.clone(), result),
            Err(info) => Next::throw(*env, Val::Error(info)),
        },

        Kont::Negate { k } => Next::resume(k.clone(), Val::Bool(!value.is_truthy())),

        Kont::Branch { cond, env, k } => {
            if value.is_truthy() {
                Next::eval(cond.then_b.clone(), *env, k.clone())
            } else {
                match &cond.else_b {
                    Some(else_b) => Next::eval(else_b.clone(), *env, k.clone()),
                    None => Next::resume(k.clone(), Val::Null),
                }
            }
        }

        Kont::LoopTest { lp, env, k } => {
            if value.is_truthy() {
                Next::eval(
                    lp.body.clone(),
                    *env,
                    Continuation::new(Kont::LoopBody {
                        lp: lp.clone(),
                        env: *env,
                        k: k.clone(),
                    }),
                )
            } else {
                Next::resume(k.clone(), Val::Null)
            }
        }

        Kont::LoopBody { lp, env, k } => Next::eval(
            lp.test.clone(),
            *env,
            Continuation::new(Kont::LoopTest {
                lp: lp.clone(),
                env: *env,
                k: k.clone(),
            }),
        ),

        Kont::Callee { call, env, k } => match call.args.first() {
            None => apply(heap, value, Vec::new(), *env, k.clone()),
            Some(first) => Next::eval(
                first.clone(),
                *env,
                Continuation::new(Kont::Args {
                    call: call.clone(),
                    callee: value,
                    args: Vec::with_capacity(call.args.len()),
                    env: *env,
                    k: k.clone(),
                }),
            ),
        },

        Kont::Args {
            call,
            callee,
            args,
            env,
            k,
        } => {
            let mut args = args.clone();
            args.push(value);

            match call.args.get(args.len()) {
                None => apply(heap, callee.clone(), args, *env, k.clone()),
                Some(block) => Next::eval(
                    block.clone(),
                    *env,
                    Continuation::new(Kont::Args {
                        call: call.clone(),
                        callee: callee.clone(),
                        args,
                        env: *env,
                        k: k.clone(),
                    }),
                ),
            }
        }

        Kont::Raise { env } => Next::throw(*env, value),

        Kont::Catch { handler, env, k } => {
            // The caught value is only visible inside the handler
            let scope = heap.alloc(Frame::scope(*env));
            heap.declare(scope, &handler.catch_var, value);
            Next::eval(handler.handler.clone(), scope, k.clone())
        }

        Kont::YieldTo { k } => {
            // A suspension in tail position must stay resumable: the driver
            // treats a HALT resumption point as a finished program
            let k = if k.is_halt() {
                Continuation::new(Kont::Forward { k: k.clone() })
            } else {
                k.clone()
            };
            Next::Yield { k, value }
        }

        Kont::Forward { k } => Next::resume(k.clone(), value),
    }
}
