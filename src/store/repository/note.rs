use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::models::{NoteSection, NoteSource, VisitNoteEntry};
use crate::store::StoreError;

/// Insert a note entry. Entries are append-only: there is no update or
/// delete path, amendments arrive as new rows.
pub fn insert_note_entry(conn: &Connection, entry: &VisitNoteEntry) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO note_entries (id, visit_id, section, content, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.id.to_string(),
            entry.visit_id.to_string(),
            entry.section.as_str(),
            entry.content,
            entry.source.as_str(),
            entry.created_at,
        ],
    )?;
    Ok(())
}

/// All note entries for a visit, oldest-first.
pub fn get_note_entries(conn: &Connection, visit_id: Uuid) -> Result<Vec<VisitNoteEntry>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, visit_id, section, content, source, created_at
         FROM note_entries
         WHERE visit_id = ?1
         ORDER BY created_at ASC, rowid ASC",
    )?;
    let rows = stmt.query_map(params![visit_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, DateTime<Utc>>(5)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, visit_id, section, content, source, created_at) = row?;
        entries.push(build_entry(id, visit_id, section, content, source, created_at)?);
    }
    Ok(entries)
}

fn build_entry(
    id: String,
    visit_id: String,
    section: String,
    content: String,
    source: String,
    created_at: DateTime<Utc>,
) -> Result<VisitNoteEntry, StoreError> {
    let id = Uuid::parse_str(&id).map_err(|_| StoreError::InvalidEnum {
        field: "note_entries.id".into(),
        value: id.clone(),
    })?;
    let visit_id = Uuid::parse_str(&visit_id).map_err(|_| StoreError::InvalidEnum {
        field: "note_entries.visit_id".into(),
        value: visit_id.clone(),
    })?;
    let section = NoteSection::from_str(&section).ok_or_else(|| StoreError::InvalidEnum {
        field: "note_entries.section".into(),
        value: section.clone(),
    })?;
    let source = NoteSource::from_str(&source).ok_or_else(|| StoreError::InvalidEnum {
        field: "note_entries.source".into(),
        value: source.clone(),
    })?;

    Ok(VisitNoteEntry {
        id,
        visit_id,
        section,
        content,
        source,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Visit, VisitNoteStatus};
    use crate::store::repository::visit::insert_visit;
    use crate::store::open_memory_database;

    fn seed_visit(conn: &Connection) -> Uuid {
        let visit = Visit {
            id: Uuid::new_v4(),
            patient_id: None,
            status: VisitNoteStatus::Draft,
            signed_by: None,
            signed_at: None,
            created_at: Utc::now(),
        };
        insert_visit(conn, &visit).unwrap();
        visit.id
    }

    fn entry(visit_id: Uuid, section: NoteSection, content: &str) -> VisitNoteEntry {
        VisitNoteEntry {
            id: Uuid::new_v4(),
            visit_id,
            section,
            content: content.into(),
            source: NoteSource::Manual,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_list_round_trip() {
        let conn = open_memory_database().unwrap();
        let visit_id = seed_visit(&conn);

        insert_note_entry(&conn, &entry(visit_id, NoteSection::Subjective, "headache")).unwrap();
        insert_note_entry(&conn, &entry(visit_id, NoteSection::Plan, "rest")).unwrap();

        let entries = get_note_entries(&conn, visit_id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "headache");
        assert_eq!(entries[1].section, NoteSection::Plan);
    }

    #[test]
    fn entries_scoped_to_visit() {
        let conn = open_memory_database().unwrap();
        let visit_a = seed_visit(&conn);
        let visit_b = seed_visit(&conn);

        insert_note_entry(&conn, &entry(visit_a, NoteSection::Objective, "BP noted")).unwrap();

        assert_eq!(get_note_entries(&conn, visit_a).unwrap().len(), 1);
        assert!(get_note_entries(&conn, visit_b).unwrap().is_empty());
    }

    #[test]
    fn foreign_key_rejects_orphan_entry() {
        let conn = open_memory_database().unwrap();
        let err = insert_note_entry(
            &conn,
            &entry(Uuid::new_v4(), NoteSection::Subjective, "orphan"),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
