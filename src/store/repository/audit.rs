use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::models::{AuditEvent, VisitNoteStatus};
use crate::store::StoreError;

/// Append one status-transition event to the audit log.
pub fn insert_audit_event(
    conn: &Connection,
    visit_id: Uuid,
    event: &AuditEvent,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO audit_log (visit_id, from_status, to_status, actor, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            visit_id.to_string(),
            event.from.as_str(),
            event.to.as_str(),
            event.actor,
            event.timestamp,
        ],
    )?;
    Ok(())
}

/// Audit trail for a visit, oldest-first.
pub fn get_audit_trail(conn: &Connection, visit_id: Uuid) -> Result<Vec<AuditEvent>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT from_status, to_status, actor, timestamp
         FROM audit_log
         WHERE visit_id = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![visit_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, DateTime<Utc>>(3)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (from, to, actor, timestamp) = row?;
        let from = VisitNoteStatus::from_str(&from).ok_or_else(|| StoreError::InvalidEnum {
            field: "audit_log.from_status".into(),
            value: from.clone(),
        })?;
        let to = VisitNoteStatus::from_str(&to).ok_or_else(|| StoreError::InvalidEnum {
            field: "audit_log.to_status".into(),
            value: to.clone(),
        })?;
        events.push(AuditEvent {
            from,
            to,
            actor,
            timestamp,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visit;
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

    #[test]
    fn events_come_back_oldest_first() {
        let conn = open_memory_database().unwrap();
        let visit_id = seed_visit(&conn);

        let first = AuditEvent {
            from: VisitNoteStatus::Draft,
            to: VisitNoteStatus::Pending,
            actor: "dr.okafor".into(),
            timestamp: Utc::now(),
        };
        let second = AuditEvent {
            from: VisitNoteStatus::Pending,
            to: VisitNoteStatus::Signed,
            actor: "dr.okafor".into(),
            timestamp: Utc::now(),
        };
        insert_audit_event(&conn, visit_id, &first).unwrap();
        insert_audit_event(&conn, visit_id, &second).unwrap();

        let trail = get_audit_trail(&conn, visit_id).unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].to, VisitNoteStatus::Pending);
        assert_eq!(trail[1].to, VisitNoteStatus::Signed);
    }

    #[test]
    fn empty_trail_for_fresh_visit() {
        let conn = open_memory_database().unwrap();
        let visit_id = seed_visit(&conn);
        assert!(get_audit_trail(&conn, visit_id).unwrap().is_empty());
    }
}
