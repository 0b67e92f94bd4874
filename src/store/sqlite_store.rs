use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::{AuditEvent, NoteDraft, Visit, VisitNoteEntry, VisitNoteStatus};

use super::repository::{
    get_audit_trail, get_note_entries, get_visit, insert_audit_event, insert_note_entry,
    insert_visit, update_visit_status,
};
use super::{open_database, open_memory_database, NoteStore, StoreError};

/// SQLite-backed implementation of the note store.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: open_memory_database()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NoteStore for SqliteNoteStore {
    fn create_visit(&mut self, patient_id: Option<Uuid>) -> Result<Visit, StoreError> {
        let visit = Visit {
            id: Uuid::new_v4(),
            patient_id,
            status: VisitNoteStatus::Draft,
            signed_by: None,
            signed_at: None,
            created_at: Utc::now(),
        };
        insert_visit(&self.conn, &visit)?;
        tracing::info!(visit_id = %visit.id, "Created visit");
        Ok(visit)
    }

    fn get_visit(&self, visit_id: Uuid) -> Result<Visit, StoreError> {
        get_visit(&self.conn, visit_id)
    }

    fn append_note_entry(
        &mut self,
        visit_id: Uuid,
        draft: &NoteDraft,
    ) -> Result<VisitNoteEntry, StoreError> {
        let entry = VisitNoteEntry {
            id: Uuid::new_v4(),
            visit_id,
            section: draft.section,
            content: draft.content.clone(),
            source: draft.source,
            created_at: Utc::now(),
        };
        insert_note_entry(&self.conn, &entry)?;
        Ok(entry)
    }

    fn note_entries(&self, visit_id: Uuid) -> Result<Vec<VisitNoteEntry>, StoreError> {
        get_note_entries(&self.conn, visit_id)
    }

    fn update_status(
        &mut self,
        visit_id: Uuid,
        new_status: VisitNoteStatus,
        signed_by: Option<&str>,
        signed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        update_visit_status(&self.conn, visit_id, new_status, signed_by, signed_at)
    }

    fn append_audit_event(
        &mut self,
        visit_id: Uuid,
        event: &AuditEvent,
    ) -> Result<(), StoreError> {
        insert_audit_event(&self.conn, visit_id, event)
    }

    fn audit_trail(&self, visit_id: Uuid) -> Result<Vec<AuditEvent>, StoreError> {
        get_audit_trail(&self.conn, visit_id)
    }
}
