use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signing status of a visit note.
///
/// Only `Draft` and `Pending` permit content appends; a `Signed` note is
/// edit-locked until explicitly reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitNoteStatus {
    Draft,
    Pending,
    Signed,
}

impl VisitNoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitNoteStatus::Draft => "draft",
            VisitNoteStatus::Pending => "pending",
            VisitNoteStatus::Signed => "signed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(VisitNoteStatus::Draft),
            "pending" => Some(VisitNoteStatus::Pending),
            "signed" => Some(VisitNoteStatus::Signed),
            _ => None,
        }
    }

    /// Whether note content may be appended in this status.
    pub fn allows_append(self) -> bool {
        !matches!(self, VisitNoteStatus::Signed)
    }
}

/// One status transition, recorded on the visit's append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub from: VisitNoteStatus,
    pub to: VisitNoteStatus,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}
