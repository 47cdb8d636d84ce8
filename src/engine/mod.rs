//! # Engine - Continuation Trampoline
//!
//! Runs a `Block` tree as a resumable state machine.
//!
//! ## Core Principles
//!
//! 1. **Continuations are data**: "the rest of the program" is a chain of `Kont`
//!    values, so a paused program can be copied, forked and serialized
//! 2. **Trampolined execution**: blocks and continuations return a `Next`
//!    instead of calling each other; `Next::run` loops, the native stack never grows
//! 3. **Frames in an arena**: continuations hold `FrameId`s, so forks share locals
//! 4. **Suspend is a call**: `suspend` asks the engine to invoke `fn(v) = yield v`,
//!    reusing ordinary call/return to pause at any depth
//! 5. **Pure engine**: no I/O, no threads, no timers - runs until suspend or completion

pub mod call;
pub mod driver;
pub mod errors;
pub mod evaluate;
pub mod exec_loop;
pub mod heap;
pub mod json;
pub mod operators;
pub mod receive;
pub mod stdlib;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use driver::{Driver, Settings};
pub use exec_loop::{Next, Outcome};
pub use heap::Heap;
pub use json::{json_to_val, val_to_json};
pub use stdlib::{suspend, Builtin};
pub use types::{Block, Callable, Continuation, Signal, Val};
