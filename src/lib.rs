pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod snapshot;

// Re-export main types
pub use engine::{suspend, Block, Driver, Settings, Val};
pub use error::{Error, Result};
pub use snapshot::Envelope;
