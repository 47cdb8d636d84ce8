//! Errors surfaced to the embedding application

use crate::engine::types::{Signal, Val};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A program fault escaped the top-level frame
    #[error("program terminated with an uncaught fault: {0:?}")]
    Uncaught(Val),

    #[error("program has terminated and cannot be resumed")]
    NotResumable,

    /// An invocation signal reached code that is not run by a driver
    #[error("invocation signal escaped outside of a running program: {0}")]
    UncaughtSignal(String),

    #[error("failed to serialize or deserialize driver state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot digest mismatch: expected {expected}, found {found}")]
    DigestMismatch { expected: String, found: String },

    #[error("unsupported snapshot format version {0}")]
    UnsupportedFormat(u32),

    #[error("snapshot references missing frame {0}")]
    DanglingFrame(usize),

    /// Snapshot tables that do not fit together
    #[error("snapshot state is inconsistent: {0}")]
    Corrupt(String),

    #[error("frame heap lock poisoned by a panic in another driver")]
    Poisoned,
}

impl From<Signal> for Error {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Invoke(invocation) => Error::UncaughtSignal(format!(
                "call of function({}) with {} argument(s)",
                invocation.callable.params.join(", "),
                invocation.args.len()
            )),
            Signal::Throw(fault) => Error::Uncaught(fault),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
