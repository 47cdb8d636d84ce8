//! Driver: the externally visible handle on a resumable program
//!
//! The driver holds:
//! - program: the continuation to feed on the next `run`
//! - heap: the frame arena, shared with every fork

use super::exec_loop::{Next, Outcome};
use super::heap::Heap;
use super::types::{Block, Continuation, Frame, Kont, Val};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/* ===================== Settings ===================== */

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sweep unreachable frames once this many are allocated.
    /// Only applies while a driver has no live forks.
    pub collect_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collect_threshold: 1024,
        }
    }
}

/* ===================== Driver ===================== */

/// Mutable handle on a program that runs until it suspends
#[derive(Debug)]
pub struct Driver {
    pub(crate) id: Uuid,
    /// Represents the remainder of the program to execute
    pub(crate) program: Continuation,
    pub(crate) heap: Arc<Mutex<Heap>>,
    pub(crate) settings: Settings,
}

impl Driver {
    /// Create a driver that will execute `program`
    ///
    /// Nothing is evaluated until the first `run`.
    pub fn new(program: Block) -> Self {
        Self::with_settings(program, Settings::default())
    }

    pub fn with_settings(program: Block, settings: Settings) -> Self {
        let mut heap = Heap::new();
        let top = heap.alloc(Frame::top_level());

        let start = Continuation::new(Kont::Start {
            block: Arc::new(program),
            env: top,
            k: Continuation::halt(),
        });

        Self::from_parts(Uuid::new_v4(), start, heap, settings)
    }

    pub(crate) fn from_parts(
        id: Uuid,
        program: Continuation,
        heap: Heap,
        settings: Settings,
    ) -> Self {
        Self {
            id,
            program,
            heap: Arc::new(Mutex::new(heap)),
            settings,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The current resumption point
    pub fn continuation(&self) -> &Continuation {
        &self.program
    }

    /// Whether the program can be resumed.
    ///
    /// If this returns false, `run` fails with `Error::NotResumable`.
    pub fn is_resumable(&self) -> bool {
        !self.program.is_halt()
    }

    /// Shallow copy pointing at the exact same point of the program.
    ///
    /// The fork shares every frame (and so every local variable) with this
    /// driver. For an independent copy, round-trip through `to_bytes` /
    /// `from_bytes` instead.
    pub fn fork(&self) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            program: self.program.clone(),
            heap: Arc::clone(&self.heap),
            settings: self.settings.clone(),
        }
    }

    /// Run the program until it suspends the next time.
    ///
    /// `value` becomes the result of the `suspend` call the program is paused
    /// in (it is ignored by the first `run`). Returns the value the program
    /// suspended with, or its final value once it completes.
    pub fn run(&mut self, value: Val) -> Result<Val> {
        if !self.is_resumable() {
            return Err(Error::NotResumable);
        }

        let mut heap = self.heap.lock().map_err(|_| Error::Poisoned)?;

        // No fork can observe frames we drop
        let collect = (Arc::strong_count(&self.heap) == 1).then_some(self.settings.collect_threshold);

        debug!(driver = %self.id, "resuming program");
        let next = Next::resume(self.program.clone(), value);

        match next.run_with(&mut heap, collect) {
            Outcome::Yielded { k, value } => {
                self.program = k;
                if collect.is_some() && heap.live() > self.settings.collect_threshold {
                    heap.sweep(&[], &[&self.program]);
                }
                debug!(
                    driver = %self.id,
                    resumable = self.is_resumable(),
                    frames = heap.live(),
                    "program suspended"
                );
                Ok(value)
            }
            Outcome::Faulted { fault } => {
                self.program = Continuation::halt();
                if collect.is_some() {
                    heap.sweep(&[], &[&self.program]);
                }
                debug!(driver = %self.id, fault = ?fault, "program terminated by uncaught fault");
                Err(Error::Uncaught(fault))
            }
        }
    }
}
