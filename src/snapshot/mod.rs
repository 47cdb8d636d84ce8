//! Driver persistence
//!
//! A snapshot is a JSON envelope around the serialized resumable state:
//!
//! ```json
//! {
//!   "format": 2,
//!   "driver_id": "…",
//!   "created_at": "2026-01-01T00:00:00Z",
//!   "digest": "<sha256 hex of state>",
//!   "state": "<JSON-encoded continuation, frames and settings>"
//! }
//! ```
//!
//! The state is written as flat tables (see `state`), so its size and nesting
//! do not grow with the call depth of the suspended program.
//!
//! Only the frames reachable from the driver's continuation are written, so
//! a snapshot of a fork does not drag its siblings' frames along. A restored
//! driver owns a private heap: it shares nothing with the driver it was taken
//! from.

mod state;

use crate::engine::Driver;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use state::State;
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 2;

/// Snapshot metadata and payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub format: u32,
    pub driver_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub digest: String,
    pub state: String,
}

impl Envelope {
    /// Parse and verify an envelope without rebuilding the driver
    pub fn decode(bytes: &[u8]) -> Result<Envelope> {
        let envelope: Envelope = serde_json::from_slice(bytes)?;

        if envelope.format != FORMAT_VERSION {
            return Err(Error::UnsupportedFormat(envelope.format));
        }

        let found = digest(&envelope.state);
        if found != envelope.digest {
            return Err(Error::DigestMismatch {
                expected: envelope.digest,
                found,
            });
        }

        Ok(envelope)
    }

    /// Whether the snapshotted program can still be resumed
    pub fn is_resumable(&self) -> Result<bool> {
        let state: State = serde_json::from_str(&self.state)?;
        state.is_resumable()
    }
}

pub(crate) fn digest(state: &str) -> String {
    let hash = Sha256::digest(state.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

impl Driver {
    /// Serialize the resumable state of this driver
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let heap = {
            let heap = self.heap.lock().map_err(|_| Error::Poisoned)?;
            heap.extract(&self.program)
                .map_err(|id| Error::DanglingFrame(id.index()))?
        };

        let state = State::capture(&self.program, &heap, &self.settings);
        let state = serde_json::to_string(&state)?;

        let envelope = Envelope {
            format: FORMAT_VERSION,
            driver_id: self.id,
            created_at: Utc::now(),
            digest: digest(&state),
            state,
        };

        debug!(driver = %self.id, bytes = envelope.state.len(), "snapshot taken");
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Rebuild a driver from `to_bytes` output
    pub fn from_bytes(bytes: &[u8]) -> Result<Driver> {
        let envelope = Envelope::decode(bytes)?;
        let state: State = serde_json::from_str(&envelope.state)?;
        let (program, heap, settings) = state.restore()?;

        heap.verify(&program)
            .map_err(|id| Error::DanglingFrame(id.index()))?;

        debug!(driver = %envelope.driver_id, frames = heap.live(), "snapshot restored");
        Ok(Driver::from_parts(envelope.driver_id, program, heap, settings))
    }
}
