//! Processing run record and status machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pipeline run states, strictly ordered.
///
/// Forward-only over PENDING -> TRANSCRIBING -> REDACTING -> GENERATING ->
/// COMPLETED; FAILED is reachable from any non-terminal state and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[default]
    Pending,
    Transcribing,
    Redacting,
    Generating,
    Completed,
    Failed,
}

impl RunStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Transcribing => "transcribing",
            Self::Redacting => "redacting",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Position in the forward-only ordering
    const fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Transcribing => 1,
            Self::Redacting => 2,
            Self::Generating => 3,
            Self::Completed => 4,
            Self::Failed => 5,
        }
    }

    /// Check if this status admits no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when a status transition would regress or leave a terminal state
#[derive(Debug, Clone, Error)]
#[error("Invalid status transition: {from} -> {to}")]
pub struct StatusTransitionError {
    pub from: RunStatus,
    pub to: RunStatus,
}

/// Single-writer record of one pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRun {
    pub recording_id: Uuid,
    pub status: RunStatus,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessingRun {
    /// Create a new pending run for a recording
    pub fn new(recording_id: Uuid) -> Self {
        Self {
            recording_id,
            status: RunStatus::Pending,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Advance to the next status. Monotone: never regresses, never leaves
    /// a terminal state.
    pub fn advance(&mut self, to: RunStatus) -> Result<(), StatusTransitionError> {
        let invalid = self.status.is_terminal()
            || to.rank() <= self.status.rank()
            || to == RunStatus::Failed;
        if invalid {
            return Err(StatusTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        if to == RunStatus::Completed {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Mark the run failed, recording the stage error. Terminal.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), StatusTransitionError> {
        if self.status.is_terminal() {
            return Err(StatusTransitionError {
                from: self.status,
                to: RunStatus::Failed,
            });
        }
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
