//! Block evaluation handlers
//!
//! Each block kind performs at most one unit of work: it either produces a
//! value for its continuation right away, or asks for a child block to be
//! evaluated with a new continuation that remembers where to pick up.

use super::errors::{self, ErrorInfo};
use super::exec_loop::Next;
use super::heap::Heap;
use super::stdlib::Builtin;
use super::types::{Block, Continuation, Frame, FrameId, Kont, Val};
use std::sync::Arc;

/// Evaluate `block` under `env`, delivering its value to `k`
pub fn evaluate(heap: &mut Heap, block: &Arc<Block>, env: FrameId, k: Continuation) -> Next {
    match &**block {
        Block::Const { v } => Next::resume(k, v.clone()),

        Block::Local { name } => eval_local(heap, name, env, k),

        Block::Let { name, value } => Next::eval(
            value.clone(),
            env,
            Continuation::new(Kont::Bind {
                name: name.clone(),
                declare: true,
                env,
                k,
            }),
        ),

        Block::Assign { name, value } => Next::eval(
            value.clone(),
            env,
            Continuation::new(Kont::Bind {
                name: name.clone(),
                declare: false,
                env,
                k,
            }),
        ),

        Block::Sequence(seq) => match seq.body.first() {
            None => Next::resume(k, Val::Null),
            Some(first) => Next::eval(
                first.clone(),
                env,
                Continuation::new(Kont::Seq {
                    seq: seq.clone(),
                    next: 1,
                    env,
                    k,
                }),
            ),
        },

        Block::Binary(bin) => Next::eval(
            bin.lhs.clone(),
            env,
            Continuation::new(Kont::BinaryLhs {
                bin: bin.clone(),
                env,
                k,
            }),
        ),

        Block::Not { value } => {
            Next::eval(value.clone(), env, Continuation::new(Kont::Negate { k }))
        }

        Block::If(cond) => Next::eval(
            cond.test.clone(),
            env,
            Continuation::new(Kont::Branch {
                cond: cond.clone(),
                env,
                k,
            }),
        ),

        Block::While(lp) => Next::eval(
            lp.test.clone(),
            env,
            Continuation::new(Kont::LoopTest {
                lp: lp.clone(),
                env,
                k,
            }),
        ),

        Block::Call(call) => Next::eval(
            call.callee.clone(),
            env,
            Continuation::new(Kont::Callee {
                call: call.clone(),
                env,
                k,
            }),
        ),

        Block::Return { value } => {
            // The continuation of the Return block itself is dropped
            let returns = heap.return_continuation(env);
            match value {
                Some(value) => Next::eval(value.clone(), env, returns),
                None => Next::resume(returns, Val::Null),
            }
        }

        Block::Throw { value } => {
            Next::eval(value.clone(), env, Continuation::new(Kont::Raise { env }))
        }

        Block::TryCatch(handler) => {
            let catch = Continuation::new(Kont::Catch {
                handler: handler.clone(),
                env,
                k: k.clone(),
            });
            let scope = heap.alloc(Frame::try_scope(env, catch));
            Next::eval(handler.body.clone(), scope, k)
        }

        Block::Yield { value } => {
            Next::eval(value.clone(), env, Continuation::new(Kont::YieldTo { k }))
        }
    }
}

/// Execute Local block
///
/// Bindings first, then the standard library by name.
fn eval_local(heap: &Heap, name: &str, env: FrameId, k: Continuation) -> Next {
    if let Some(v) = heap.lookup(env, name) {
        return Next::resume(k, v);
    }

    match Builtin::by_name(name) {
        Some(builtin) => Next::resume(k, Val::Builtin(builtin)),
        None => Next::throw(
            env,
            Val::Error(ErrorInfo::new(
                errors::UNDEFINED_VARIABLE,
                format!("Variable '{}' is not defined", name),
            )),
        ),
    }
}
