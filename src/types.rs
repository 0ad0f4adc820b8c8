//! Core types shared by the poll loop and its collaborators

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status of a homework submission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    /// Reviewer accepted the work
    Approved,
    /// Reviewer picked the work up
    Reviewing,
    /// Reviewer sent the work back with comments
    Rejected,
}

impl HomeworkStatus {
    /// All statuses the review API is known to report
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Wire representation used by the review API
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Fixed human-readable verdict for this status
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            HomeworkStatus::Reviewing => "The work has been taken for review.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(crate::error::Error::UnknownStatus(other.to_string())),
        }
    }
}

/// What a single poll iteration ended up doing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new message went out to the chat
    Notified {
        /// Text that was sent
        message: String,
    },
    /// The message matched the last one sent and was suppressed
    Duplicate,
    /// The API returned no homeworks for the watermark window
    Empty,
    /// The iteration failed; the loop carries on after its sleep
    Failed(ErrorKind),
}

impl PollOutcome {
    /// Whether the iteration counts towards the failure streak
    pub fn is_failure(&self) -> bool {
        matches!(self, PollOutcome::Failed(_))
    }
}
