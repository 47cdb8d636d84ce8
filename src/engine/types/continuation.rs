//! Continuations: "the rest of the program" as data
//!
//! Every place the engine has to come back to after evaluating a sub-block is
//! one `Kont` variant. A `Continuation` is an immutable, shared handle to one;
//! new continuations wrap older ones, nothing is ever edited in place. The
//! variants are plain data (frame ids, block nodes, values), so a chain can be
//! written out link by link; see `snapshot`.
//!
//! Chains grow as deep as the interpreted program recurses. Dropping one
//! unlinks it iteratively instead of recursing once per link.

use super::block::{Binary, BinOp, Block, Call, If, Sequence, TryCatch, While};
use super::frame::FrameId;
use super::values::Val;
use std::sync::{Arc, OnceLock};

/// Shared handle to a resumption point
#[derive(Debug, Clone)]
pub struct Continuation(Arc<Kont>);

static HALT: OnceLock<Continuation> = OnceLock::new();

/// Resumption point kinds
#[derive(Debug)]
pub enum Kont {
    /// End of the program
    Halt,
    /// Ignore the received value and start evaluating `block`
    Start {
        block: Arc<Block>,
        env: FrameId,
        k: Continuation,
    },
    /// Bind the received value to `name`
    Bind {
        name: String,
        declare: bool,
        env: FrameId,
        k: Continuation,
    },
    /// Evaluate `seq.body[next..]`
    Seq {
        seq: Arc<Sequence>,
        next: usize,
        env: FrameId,
        k: Continuation,
    },
    BinaryLhs {
        bin: Arc<Binary>,
        env: FrameId,
        k: Continuation,
    },
    BinaryRhs {
        op: BinOp,
        lhs: Val,
        env: FrameId,
        k: Continuation,
    },
    Negate {
        k: Continuation,
    },
    Branch {
        cond: Arc<If>,
        env: FrameId,
        k: Continuation,
    },
    LoopTest {
        lp: Arc<While>,
        env: FrameId,
        k: Continuation,
    },
    LoopBody {
        lp: Arc<While>,
        env: FrameId,
        k: Continuation,
    },
    /// The callee has been evaluated, arguments are next
    Callee {
        call: Arc<Call>,
        env: FrameId,
        k: Continuation,
    },
    /// Arguments evaluated so far
    Args {
        call: Arc<Call>,
        callee: Val,
        args: Vec<Val>,
        env: FrameId,
        k: Continuation,
    },
    /// Raise the received value as a fault from `env`
    Raise {
        env: FrameId,
    },
    /// Fault handler installed by a try block
    Catch {
        handler: Arc<TryCatch>,
        env: FrameId,
        k: Continuation,
    },
    /// Suspend with the received value, resuming at `k`
    YieldTo {
        k: Continuation,
    },
    /// Pass the received value on to `k` unchanged
    Forward {
        k: Continuation,
    },
}

impl Continuation {
    pub fn new(kont: Kont) -> Self {
        Continuation(Arc::new(kont))
    }

    /// The terminal continuation. Every HALT is the same shared node.
    pub fn halt() -> Self {
        HALT.get_or_init(|| Continuation(Arc::new(Kont::Halt)))
            .clone()
    }

    pub fn is_halt(&self) -> bool {
        matches!(*self.0, Kont::Halt)
    }

    pub fn kont(&self) -> &Kont {
        &self.0
    }

    /// Identity comparison: true when both handles point at the same resumption point
    pub fn ptr_eq(a: &Continuation, b: &Continuation) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// The enclosing continuation, if any
    pub(crate) fn next(&self) -> Option<&Continuation> {
        self.links().1
    }

    /// The frame and the enclosing continuation this one refers to
    pub(crate) fn links(&self) -> (Option<FrameId>, Option<&Continuation>) {
        match &*self.0 {
            Kont::Halt => (None, None),
            Kont::Negate { k } | Kont::YieldTo { k } | Kont::Forward { k } => (None, Some(k)),
            Kont::Raise { env } => (Some(*env), None),
            Kont::Start { env, k, .. }
            | Kont::Bind { env, k, .. }
            | Kont::Seq { env, k, .. }
            | Kont::BinaryLhs { env, k, .. }
            | Kont::BinaryRhs { env, k, .. }
            | Kont::Branch { env, k, .. }
            | Kont::LoopTest { env, k, .. }
            | Kont::LoopBody { env, k, .. }
            | Kont::Callee { env, k, .. }
            | Kont::Args { env, k, .. }
            | Kont::Catch { env, k, .. } => (Some(*env), Some(k)),
        }
    }
}

impl Kont {
    /// Detach the enclosing continuation, leaving HALT in its place
    fn take_next(&mut self) -> Option<Continuation> {
        match self {
            Kont::Halt | Kont::Raise { .. } => None,
            Kont::Negate { k }
            | Kont::YieldTo { k }
            | Kont::Forward { k }
            | Kont::Start { k, .. }
            | Kont::Bind { k, .. }
            | Kont::Seq { k, .. }
            | Kont::BinaryLhs { k, .. }
            | Kont::BinaryRhs { k, .. }
            | Kont::Branch { k, .. }
            | Kont::LoopTest { k, .. }
            | Kont::LoopBody { k, .. }
            | Kont::Callee { k, .. }
            | Kont::Args { k, .. }
            | Kont::Catch { k, .. } => {
                if k.is_halt() {
                    None
                } else {
                    Some(std::mem::replace(k, Continuation::halt()))
                }
            }
        }
    }
}

impl Drop for Kont {
    fn drop(&mut self) {
        // Each node we are the last owner of is detached from its parent
        // before it is freed, so the chain is torn down in a flat loop
        let mut next = self.take_next();
        while let Some(k) = next {
            next = Arc::into_inner(k.0).and_then(|mut kont| kont.take_next());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(depth: usize) -> Continuation {
        let mut k = Continuation::halt();
        for _ in 0..depth {
            k = Continuation::new(Kont::Negate { k });
        }
        k
    }

    #[test]
    fn test_long_chain_drops_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024)
            .spawn(|| drop(chain(1_000_000)))
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_drop_keeps_shared_tail() {
        let tail = chain(10);
        let head = Continuation::new(Kont::Forward { k: tail.clone() });
        drop(head);

        // The tail is still intact for its other owner
        let mut depth = 0;
        let mut k = &tail;
        while let Some(next) = k.next() {
            depth += 1;
            k = next;
        }
        assert_eq!(depth, 10);
        assert!(k.is_halt());
    }

    #[test]
    fn test_halt_is_shared() {
        assert!(Continuation::ptr_eq(
            &Continuation::halt(),
            &Continuation::halt()
        ));
    }
}
