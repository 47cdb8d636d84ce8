//! Core execution loop
//!
//! This module contains `Next` and its pump - the heart of the engine.
//! Evaluating a block or feeding a continuation never recurses into the next
//! piece of work; it describes it as a `Next` and returns. `Next::run` then
//! loops over those descriptions, so native stack usage stays constant no
//! matter how deep or long the interpreted program is.
//!
//! ## Function Organization
//! 1. Next::run() - Top-level pump (calls step repeatedly)
//! 2. Next::step() - One unit of work (dispatches to block / continuation handlers)

use super::evaluate::evaluate;
use super::heap::Heap;
use super::receive::receive;
use super::types::{Block, Continuation, FrameId, Val};
use std::sync::Arc;
use tracing::{debug, trace};

/* ===================== Step Result ===================== */

/// Result of one evaluation step
#[derive(Debug)]
pub enum Next {
    /// Evaluate `block` under `env`, delivering its value to `k`
    Eval {
        block: Arc<Block>,
        env: FrameId,
        k: Continuation,
    },
    /// Feed `value` into `k`
    Resume { k: Continuation, value: Val },
    /// Raise `fault` from `env`
    Throw { env: FrameId, fault: Val },
    /// Suspend: hand `value` to the driver, resume later at `k`
    Yield { k: Continuation, value: Val },
}

/// How a pump ended
#[derive(Debug)]
pub enum Outcome {
    /// Suspended at `k`. A `HALT` continuation means the program finished and
    /// `value` is its result.
    Yielded { k: Continuation, value: Val },
    /// A fault escaped the top-level frame
    Faulted { fault: Val },
}

impl Next {
    pub fn eval(block: Arc<Block>, env: FrameId, k: Continuation) -> Self {
        Next::Eval { block, env, k }
    }

    pub fn resume(k: Continuation, value: Val) -> Self {
        Next::Resume { k, value }
    }

    pub fn throw(env: FrameId, fault: Val) -> Self {
        Next::Throw { env, fault }
    }

    /// Pump until the program suspends, finishes or faults
    pub fn run(self, heap: &mut Heap) -> Outcome {
        self.run_with(heap, None)
    }

    /// Pump, sweeping unreachable frames whenever the heap grows past
    /// `collect_threshold`.
    ///
    /// Only sound when nothing outside this pump holds continuations into the
    /// heap, i.e. the caller is the heap's sole owner.
    pub(crate) fn run_with(self, heap: &mut Heap, collect_threshold: Option<usize>) -> Outcome {
        let mut next = self;
        let mut steps: u64 = 0;
        let mut collect_at = collect_threshold;

        loop {
            if let Next::Yield { k, value } = next {
                debug!(steps, "pump suspended");
                return Outcome::Yielded { k, value };
            }

            if let Some(limit) = collect_at {
                if heap.live() > limit {
                    next.sweep(heap);
                    // Grow the limit with the live set so a deep program
                    // does not sweep on every step
                    collect_at = Some(limit.max(heap.live() * 2));
                }
            }

            next = match next.step(heap) {
                Ok(n) => n,
                Err(fault) => {
                    debug!(steps, "pump stopped on uncaught fault");
                    return Outcome::Faulted { fault };
                }
            };
            steps += 1;
        }
    }

    /// Execute one unit of work.
    ///
    /// Returns the fault when it reaches the `HALT` fault continuation of the
    /// top-level frame.
    pub fn step(self, heap: &mut Heap) -> Result<Next, Val> {
        match self {
            Next::Eval { block, env, k } => {
                trace!(frame = %env, block = block_name(&block), "eval");
                Ok(evaluate(heap, &block, env, k))
            }

            Next::Resume { k, value } => Ok(receive(heap, &k, value)),

            Next::Throw { env, fault } => {
                let handler = heap.fault_continuation(env);
                if handler.is_halt() {
                    return Err(fault);
                }
                trace!(frame = %env, "fault caught");
                Ok(receive(heap, &handler, fault))
            }

            Next::Yield { .. } => Ok(self),
        }
    }

    fn sweep(&self, heap: &mut Heap) {
        match self {
            Next::Eval { env, k, .. } => heap.sweep(&[*env], &[k]),
            Next::Resume { k, .. } | Next::Yield { k, .. } => heap.sweep(&[], &[k]),
            Next::Throw { env, .. } => heap.sweep(&[*env], &[]),
        };
    }
}

fn block_name(block: &Block) -> &'static str {
    match block {
        Block::Const { .. } => "Const",
        Block::Local { .. } => "Local",
        Block::Let { .. } => "Let",
        Block::Assign { .. } => "Assign",
        Block::Sequence(_) => "Sequence",
        Block::Binary(_) => "Binary",
        Block::Not { .. } => "Not",
        Block::If(_) => "If",
        Block::While(_) => "While",
        Block::Call(_) => "Call",
        Block::Return { .. } => "Return",
        Block::Throw { .. } => "Throw",
        Block::TryCatch(_) => "TryCatch",
        Block::Yield { .. } => "Yield",
    }
}
