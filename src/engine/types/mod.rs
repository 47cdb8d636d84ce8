//! Type definitions for the engine
//!
//! This module contains all the core data types:
//! - Block tree (Block and its node structs)
//! - Runtime values (Val, Callable)
//! - Continuations (Continuation, Kont)
//! - Frames (Frame, FrameId)
//! - Native call signals (Signal, Invocation)

pub mod block;
pub mod continuation;
pub mod frame;
pub mod signal;
pub mod values;

// Re-export all types for convenient access
pub use block::{BinOp, Binary, Block, Call, If, Sequence, TryCatch, While};
pub use continuation::{Continuation, Kont};
pub use frame::{Frame, FrameId};
pub use signal::{Invocation, Signal};
pub use values::{Callable, Val};
