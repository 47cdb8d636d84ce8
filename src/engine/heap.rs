//! Frame heap
//!
//! Arena of frames addressed by stable `FrameId`s. Slots of swept frames are
//! recycled through a free list; the id of a live frame never changes.

use super::types::{Continuation, Frame, FrameId, Val};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Heap {
    slots: Vec<Option<Frame>>,
    free: Vec<usize>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heap holding `slots` at their indexes. The free list is rebuilt from
    /// the empty slots, so it can never point at a live frame.
    pub(crate) fn from_slots(mut slots: Vec<Option<Frame>>) -> Self {
        while matches!(slots.last(), Some(None)) {
            slots.pop();
        }

        let free = slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.is_none().then_some(idx))
            .rev()
            .collect();

        Heap { slots, free }
    }

    pub(crate) fn slots(&self) -> &[Option<Frame>] {
        &self.slots
    }

    /* ===================== Frame Management ===================== */

    pub fn alloc(&mut self, frame: Frame) -> FrameId {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(frame);
                FrameId(idx)
            }
            None => {
                self.slots.push(Some(frame));
                FrameId(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of frames currently allocated
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn frame(&self, id: FrameId) -> &Frame {
        match self.get(id) {
            Some(frame) => frame,
            None => panic!("Internal error: dangling frame reference {}", id),
        }
    }

    fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(frame) => frame,
            None => panic!("Internal error: dangling frame reference {}", id),
        }
    }

    /* ===================== Bindings ===================== */

    /// Find the frame holding `name`.
    ///
    /// Searches the scopes of the current function, then the program's
    /// top-level frame.
    fn resolve(&self, env: FrameId, name: &str) -> Option<FrameId> {
        let mut id = env;
        loop {
            let frame = self.frame(id);
            if frame.locals.contains_key(name) {
                return Some(id);
            }
            if frame.is_function_boundary() {
                break;
            }
            match frame.parent {
                Some(parent) => id = parent,
                None => return None,
            }
        }

        let root = self.root_of(id);
        self.frame(root).locals.contains_key(name).then_some(root)
    }

    fn root_of(&self, mut id: FrameId) -> FrameId {
        while let Some(parent) = self.frame(id).parent {
            id = parent;
        }
        id
    }

    pub fn lookup(&self, env: FrameId, name: &str) -> Option<Val> {
        let id = self.resolve(env, name)?;
        self.frame(id).locals.get(name).cloned()
    }

    /// Bind `name` in `env` itself, shadowing any outer binding
    pub fn declare(&mut self, env: FrameId, name: &str, value: Val) {
        self.frame_mut(env).locals.insert(name.to_string(), value);
    }

    /// Update the nearest existing binding. Returns false if there is none.
    pub fn assign(&mut self, env: FrameId, name: &str, value: Val) -> bool {
        let Some(id) = self.resolve(env, name) else {
            return false;
        };
        self.frame_mut(id).locals.insert(name.to_string(), value);
        true
    }

    /* ===================== Control Links ===================== */

    /// Continuation that a `Return` in `env` transfers to
    pub fn return_continuation(&self, env: FrameId) -> Continuation {
        self.walk(env, |frame| frame.returns.as_ref())
    }

    /// Continuation that a fault raised in `env` transfers to
    pub fn fault_continuation(&self, env: FrameId) -> Continuation {
        self.walk(env, |frame| frame.fault.as_ref())
    }

    fn walk(&self, env: FrameId, pick: impl Fn(&Frame) -> Option<&Continuation>) -> Continuation {
        let mut id = env;
        loop {
            let frame = self.frame(id);
            if let Some(k) = pick(frame) {
                return k.clone();
            }
            match frame.parent {
                Some(parent) => id = parent,
                // Only reachable for a frame tree without a top-level frame
                None => return Continuation::halt(),
            }
        }
    }

    /* ===================== Reachability ===================== */

    /// Every frame reachable from the given roots.
    ///
    /// Fails with the first id that does not name an allocated frame.
    pub fn reachable(
        &self,
        frames: &[FrameId],
        conts: &[&Continuation],
    ) -> Result<HashSet<FrameId>, FrameId> {
        let mut live = HashSet::new();
        let mut seen = HashSet::new();
        let mut frame_stack: Vec<FrameId> = frames.to_vec();
        let mut cont_stack: Vec<&Continuation> = conts.to_vec();

        loop {
            if let Some(k) = cont_stack.pop() {
                if !seen.insert(k.addr()) {
                    continue;
                }
                let (env, outer) = k.links();
                frame_stack.extend(env);
                cont_stack.extend(outer);
            } else if let Some(id) = frame_stack.pop() {
                if !live.insert(id) {
                    continue;
                }
                let frame = self.get(id).ok_or(id)?;
                frame_stack.extend(frame.parent);
                cont_stack.extend(frame.returns.iter());
                cont_stack.extend(frame.fault.iter());
            } else {
                break;
            }
        }

        Ok(live)
    }

    /// Free every frame not reachable from the roots. Returns the number freed.
    pub fn sweep(&mut self, frames: &[FrameId], conts: &[&Continuation]) -> usize {
        let live = match self.reachable(frames, conts) {
            Ok(live) => live,
            Err(id) => {
                debug!(frame = %id, "skipping sweep, root references a missing frame");
                return 0;
            }
        };

        let mut freed = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_some() && !live.contains(&FrameId(idx)) {
                *slot = None;
                self.free.push(idx);
                freed += 1;
            }
        }

        debug!(freed, live = self.live(), "swept frame heap");
        freed
    }

    /// Copy of the frames reachable from `root`, at their original ids
    pub fn extract(&self, root: &Continuation) -> Result<Heap, FrameId> {
        let live = self.reachable(&[], &[root])?;

        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| {
                if live.contains(&FrameId(idx)) {
                    slot.clone()
                } else {
                    None
                }
            })
            .collect();

        Ok(Heap::from_slots(slots))
    }

    /// Check that every frame reachable from `root` exists
    pub fn verify(&self, root: &Continuation) -> Result<(), FrameId> {
        self.reachable(&[], &[root]).map(|_| ())
    }
}
