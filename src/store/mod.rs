pub mod repository;
pub mod sqlite;
pub mod sqlite_store;

pub use sqlite::*;
pub use sqlite_store::*;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuditEvent, NoteDraft, Visit, VisitNoteEntry, VisitNoteStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Store rejected the operation: {0}")]
    Rejected(String),
}

/// CRUD over visits, note entries, status, and the audit trail.
///
/// The store is an opaque collaborator: it persists what it is told and
/// enforces no lifecycle rules (edit-lock and transition legality live in
/// the state machine, which must be invoked first). Entries and audit
/// events are append-only.
pub trait NoteStore {
    fn create_visit(&mut self, patient_id: Option<Uuid>) -> Result<Visit, StoreError>;

    fn get_visit(&self, visit_id: Uuid) -> Result<Visit, StoreError>;

    fn append_note_entry(
        &mut self,
        visit_id: Uuid,
        draft: &NoteDraft,
    ) -> Result<VisitNoteEntry, StoreError>;

    /// All entries for a visit, oldest-first.
    fn note_entries(&self, visit_id: Uuid) -> Result<Vec<VisitNoteEntry>, StoreError>;

    /// Persist a new status. `signed_by`/`signed_at` are set when signing
    /// and cleared when the caller passes `None` (revert to draft).
    fn update_status(
        &mut self,
        visit_id: Uuid,
        new_status: VisitNoteStatus,
        signed_by: Option<&str>,
        signed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    fn append_audit_event(&mut self, visit_id: Uuid, event: &AuditEvent)
        -> Result<(), StoreError>;

    /// Audit trail for a visit, oldest-first.
    fn audit_trail(&self, visit_id: Uuid) -> Result<Vec<AuditEvent>, StoreError>;
}
