//! Flat log rows.
//!
//! A driver loop appends one [`StepRecord`] per time step: the weights it saw
//! and the decision it got. Rows are JSON lines; where they are written is up
//! to the caller.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EnvResult;
use crate::policy::Decision;
use crate::state::Snapshot;

/// Identifies one run of a driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Creates a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the flat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Run this row belongs to.
    pub run_id: RunId,

    /// Zero-based step index within the run.
    pub step: u64,

    /// When the decision was made.
    pub recorded_at: DateTime<Utc>,

    /// Weights the decision was made from.
    pub snapshot: Snapshot,

    /// The decision.
    pub decision: Decision,
}

impl StepRecord {
    /// Creates a row stamped with the current time.
    #[must_use]
    pub fn new(run_id: RunId, step: u64, snapshot: Snapshot, decision: Decision) -> Self {
        Self {
            run_id,
            step,
            recorded_at: Utc::now(),
            snapshot,
            decision,
        }
    }

    /// Encodes the row as a single line of JSON (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns `EnvError::Serialization` if encoding fails.
    pub fn to_json_line(&self) -> EnvResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Appends the row and a newline to `writer`.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::Serialization` or `EnvError::Io`.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> EnvResult<()> {
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
