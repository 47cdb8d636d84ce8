//! Flat encoding of the resumable state
//!
//! Continuation chains are as long as the program's call depth and share
//! their tails with the frames' return and fault links. Writing them as
//! nested JSON would repeat every shared tail and nest once per link, so the
//! state is laid out as tables instead:
//!
//! - `links`: one record per distinct continuation, pointing at the
//!   continuation it wraps by index. A record only ever points at an earlier
//!   record, so loading is a single forward pass.
//! - `frames`: heap slots, with return and fault links as indexes into `links`
//! - `nodes`: block nodes referenced by continuations, each written once
//!
//! Sharing is keyed on `Arc` identity and rebuilt on load.

use crate::engine::heap::Heap;
use crate::engine::types::{
    BinOp, Binary, Block, Call, Continuation, Frame, FrameId, If, Kont, Sequence, TryCatch, Val,
    While,
};
use crate::engine::Settings;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/* ===================== Tables ===================== */

/// Shared nodes, written once each and referred to by position
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct Table<T> {
    items: Vec<Arc<T>>,
    #[serde(skip)]
    index: HashMap<usize, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn intern(&mut self, node: &Arc<T>) -> usize {
        let items = &mut self.items;
        *self
            .index
            .entry(Arc::as_ptr(node) as usize)
            .or_insert_with(|| {
                items.push(node.clone());
                items.len() - 1
            })
    }

    fn get(&self, idx: usize, what: &str) -> Result<Arc<T>> {
        self.items
            .get(idx)
            .cloned()
            .ok_or_else(|| Error::Corrupt(format!("missing {} node {}", what, idx)))
    }
}

#[derive(Default, Serialize, Deserialize)]
struct Nodes {
    blocks: Table<Block>,
    sequences: Table<Sequence>,
    binaries: Table<Binary>,
    branches: Table<If>,
    loops: Table<While>,
    calls: Table<Call>,
    handlers: Table<TryCatch>,
}

/* ===================== Records ===================== */

/// A `Kont` with its enclosing continuation and block nodes as indexes
#[derive(Serialize, Deserialize)]
#[serde(tag = "t")]
enum Link {
    Halt,
    Start { block: usize, env: FrameId, k: usize },
    Bind { name: String, declare: bool, env: FrameId, k: usize },
    Seq { seq: usize, next: usize, env: FrameId, k: usize },
    BinaryLhs { bin: usize, env: FrameId, k: usize },
    BinaryRhs { op: BinOp, lhs: Val, env: FrameId, k: usize },
    Negate { k: usize },
    Branch { cond: usize, env: FrameId, k: usize },
    LoopTest { lp: usize, env: FrameId, k: usize },
    LoopBody { lp: usize, env: FrameId, k: usize },
    Callee { call: usize, env: FrameId, k: usize },
    Args { call: usize, callee: Val, args: Vec<Val>, env: FrameId, k: usize },
    Raise { env: FrameId },
    Catch { handler: usize, env: FrameId, k: usize },
    YieldTo { k: usize },
    Forward { k: usize },
}

#[derive(Serialize, Deserialize)]
struct FrameRecord {
    parent: Option<FrameId>,
    returns: Option<usize>,
    fault: Option<usize>,
    locals: HashMap<String, Val>,
}

/// Everything needed to resume
#[derive(Serialize, Deserialize)]
pub(crate) struct State {
    program: usize,
    settings: Settings,
    links: Vec<Link>,
    frames: Vec<Option<FrameRecord>>,
    nodes: Nodes,
}

/* ===================== Encoding ===================== */

#[derive(Default)]
struct Encoder {
    links: Vec<Link>,
    ids: HashMap<usize, usize>,
    nodes: Nodes,
}

impl Encoder {
    /// Index of `root`, adding it and every link below it not yet in the table
    fn link(&mut self, root: &Continuation) -> usize {
        // Walk down to the first link already written, then add the missing
        // ones bottom-up so each record points at an earlier one
        let mut pending = Vec::new();
        let mut cur = Some(root.clone());
        while let Some(k) = cur {
            if self.ids.contains_key(&k.addr()) {
                break;
            }
            cur = k.next().cloned();
            pending.push(k);
        }

        for k in pending.into_iter().rev() {
            let record = self.record(&k);
            self.ids.insert(k.addr(), self.links.len());
            self.links.push(record);
        }

        self.ids[&root.addr()]
    }

    /// Index of a link that is already written
    fn id(&self, k: &Continuation) -> usize {
        self.ids[&k.addr()]
    }

    fn record(&mut self, k: &Continuation) -> Link {
        match k.kont() {
            Kont::Halt => Link::Halt,
            Kont::Start { block, env, k } => Link::Start {
                block: self.nodes.blocks.intern(block),
                env: *env,
                k: self.id(k),
            },
            Kont::Bind {
                name,
                declare,
                env,
                k,
            } => Link::Bind {
                name: name.clone(),
                declare: *declare,
                env: *env,
                k: self.id(k),
            },
            Kont::Seq { seq, next, env, k } => Link::Seq {
                seq: self.nodes.sequences.intern(seq),
                next: *next,
                env: *env,
                k: self.id(k),
            },
            Kont::BinaryLhs { bin, env, k } => Link::BinaryLhs {
                bin: self.nodes.binaries.intern(bin),
                env: *env,
                k: self.id(k),
            },
            Kont::BinaryRhs { op, lhs, env, k } => Link::BinaryRhs {
                op: *op,
                lhs: lhs.clone(),
                env: *env,
                k: self.id(k),
            },
            Kont::Negate { k } => Link::Negate { k: self.id(k) },
            Kont::Branch { cond, env, k } => Link::Branch {
                cond: self.nodes.branches.intern(cond),
                env: *env,
                k: self.id(k),
            },
            Kont::LoopTest { lp, env, k } => Link::LoopTest {
                lp: self.nodes.loops.intern(lp),
                env: *env,
                k: self.id(k),
            },
            Kont::LoopBody { lp, env, k } => Link::LoopBody {
                lp: self.nodes.loops.intern(lp),
                env: *env,
                k: self.id(k),
            },
            Kont::Callee { call, env, k } => Link::Callee {
                call: self.nodes.calls.intern(call),
                env: *env,
                k: self.id(k),
            },
            Kont::Args {
                call,
                callee,
                args,
                env,
                k,
            } => Link::Args {
                call: self.nodes.calls.intern(call),
                callee: callee.clone(),
                args: args.clone(),
                env: *env,
                k: self.id(k),
            },
            Kont::Raise { env } => Link::Raise { env: *env },
            Kont::Catch { handler, env, k } => Link::Catch {
                handler: self.nodes.handlers.intern(handler),
                env: *env,
                k: self.id(k),
            },
            Kont::YieldTo { k } => Link::YieldTo { k: self.id(k) },
            Kont::Forward { k } => Link::Forward { k: self.id(k) },
        }
    }
}

/* ===================== Decoding ===================== */

impl Link {
    /// Rebuild the continuation. `earlier` holds every link decoded so far.
    fn resolve(self, earlier: &[Continuation], nodes: &Nodes) -> Result<Continuation> {
        let k = |idx: usize| {
            earlier
                .get(idx)
                .cloned()
                .ok_or_else(|| Error::Corrupt(format!("link {} is not written before its use", idx)))
        };

        let kont = match self {
            Link::Halt => return Ok(Continuation::halt()),
            Link::Start { block, env, k: next } => Kont::Start {
                block: nodes.blocks.get(block, "block")?,
                env,
                k: k(next)?,
            },
            Link::Bind {
                name,
                declare,
                env,
                k: next,
            } => Kont::Bind {
                name,
                declare,
                env,
                k: k(next)?,
            },
            Link::Seq {
                seq,
                next,
                env,
                k: outer,
            } => Kont::Seq {
                seq: nodes.sequences.get(seq, "sequence")?,
                next,
                env,
                k: k(outer)?,
            },
            Link::BinaryLhs { bin, env, k: next } => Kont::BinaryLhs {
                bin: nodes.binaries.get(bin, "binary")?,
                env,
                k: k(next)?,
            },
            Link::BinaryRhs {
                op,
                lhs,
                env,
                k: next,
            } => Kont::BinaryRhs {
                op,
                lhs,
                env,
                k: k(next)?,
            },
            Link::Negate { k: next } => Kont::Negate { k: k(next)? },
            Link::Branch { cond, env, k: next } => Kont::Branch {
                cond: nodes.branches.get(cond, "if")?,
                env,
                k: k(next)?,
            },
            Link::LoopTest { lp, env, k: next } => Kont::LoopTest {
                lp: nodes.loops.get(lp, "while")?,
                env,
                k: k(next)?,
            },
            Link::LoopBody { lp, env, k: next } => Kont::LoopBody {
                lp: nodes.loops.get(lp, "while")?,
                env,
                k: k(next)?,
            },
            Link::Callee { call, env, k: next } => Kont::Callee {
                call: nodes.calls.get(call, "call")?,
                env,
                k: k(next)?,
            },
            Link::Args {
                call,
                callee,
                args,
                env,
                k: next,
            } => Kont::Args {
                call: nodes.calls.get(call, "call")?,
                callee,
                args,
                env,
                k: k(next)?,
            },
            Link::Raise { env } => Kont::Raise { env },
            Link::Catch {
                handler,
                env,
                k: next,
            } => Kont::Catch {
                handler: nodes.handlers.get(handler, "try")?,
                env,
                k: k(next)?,
            },
            Link::YieldTo { k: next } => Kont::YieldTo { k: k(next)? },
            Link::Forward { k: next } => Kont::Forward { k: k(next)? },
        };

        Ok(Continuation::new(kont))
    }
}

/* ===================== State ===================== */

impl State {
    /// Lay out `program` and the frames of `heap`
    pub(crate) fn capture(program: &Continuation, heap: &Heap, settings: &Settings) -> State {
        let mut encoder = Encoder::default();

        let frames: Vec<Option<FrameRecord>> = heap
            .slots()
            .iter()
            .map(|slot| {
                slot.as_ref().map(|frame| FrameRecord {
                    parent: frame.parent,
                    returns: frame.returns.as_ref().map(|k| encoder.link(k)),
                    fault: frame.fault.as_ref().map(|k| encoder.link(k)),
                    locals: frame.locals.clone(),
                })
            })
            .collect();
        let program = encoder.link(program);

        State {
            program,
            settings: settings.clone(),
            links: encoder.links,
            frames,
            nodes: encoder.nodes,
        }
    }

    /// Rebuild the continuation, heap and settings
    pub(crate) fn restore(self) -> Result<(Continuation, Heap, Settings)> {
        let State {
            program,
            settings,
            links,
            frames,
            nodes,
        } = self;

        let mut conts: Vec<Continuation> = Vec::with_capacity(links.len());
        for link in links {
            let k = link.resolve(&conts, &nodes)?;
            conts.push(k);
        }

        let lookup = |idx: usize| {
            conts
                .get(idx)
                .cloned()
                .ok_or_else(|| Error::Corrupt(format!("missing link {}", idx)))
        };

        let slots = frames
            .into_iter()
            .map(|slot| {
                slot.map(|record| {
                    Ok::<Frame, Error>(Frame {
                        parent: record.parent,
                        returns: record.returns.map(lookup).transpose()?,
                        fault: record.fault.map(lookup).transpose()?,
                        locals: record.locals,
                    })
                })
                .transpose()
            })
            .collect::<Result<Vec<_>>>()?;

        let program = lookup(program)?;
        Ok((program, Heap::from_slots(slots), settings))
    }

    /// Whether the stored program can still be resumed
    pub(crate) fn is_resumable(&self) -> Result<bool> {
        match self.links.get(self.program) {
            Some(link) => Ok(!matches!(link, Link::Halt)),
            None => Err(Error::Corrupt(format!("missing link {}", self.program))),
        }
    }
}
