use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::models::{Visit, VisitNoteStatus};
use crate::store::StoreError;

/// Insert a visit record.
pub fn insert_visit(conn: &Connection, visit: &Visit) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO visits (id, patient_id, status, signed_by, signed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            visit.id.to_string(),
            visit.patient_id.map(|id| id.to_string()),
            visit.status.as_str(),
            visit.signed_by,
            visit.signed_at,
            visit.created_at,
        ],
    )?;
    Ok(())
}

/// Load a visit by id.
pub fn get_visit(conn: &Connection, visit_id: Uuid) -> Result<Visit, StoreError> {
    conn.query_row(
        "SELECT id, patient_id, status, signed_by, signed_at, created_at
         FROM visits WHERE id = ?1",
        params![visit_id.to_string()],
        row_to_visit,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity_type: "visit".into(),
            id: visit_id.to_string(),
        },
        other => StoreError::Sqlite(other),
    })
    .and_then(|r| r)
}

/// Update a visit's status and signature metadata.
pub fn update_visit_status(
    conn: &Connection,
    visit_id: Uuid,
    status: VisitNoteStatus,
    signed_by: Option<&str>,
    signed_at: Option<DateTime<Utc>>,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE visits SET status = ?2, signed_by = ?3, signed_at = ?4 WHERE id = ?1",
        params![visit_id.to_string(), status.as_str(), signed_by, signed_at],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            entity_type: "visit".into(),
            id: visit_id.to_string(),
        });
    }
    Ok(())
}

fn row_to_visit(row: &Row) -> rusqlite::Result<Result<Visit, StoreError>> {
    let id: String = row.get(0)?;
    let patient_id: Option<String> = row.get(1)?;
    let status: String = row.get(2)?;

    Ok(build_visit(
        id,
        patient_id,
        status,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn build_visit(
    id: String,
    patient_id: Option<String>,
    status: String,
    signed_by: Option<String>,
    signed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
) -> Result<Visit, StoreError> {
    let id = Uuid::parse_str(&id).map_err(|_| StoreError::InvalidEnum {
        field: "visits.id".into(),
        value: id.clone(),
    })?;
    let patient_id = match patient_id {
        Some(p) => Some(Uuid::parse_str(&p).map_err(|_| StoreError::InvalidEnum {
            field: "visits.patient_id".into(),
            value: p.clone(),
        })?),
        None => None,
    };
    let status = VisitNoteStatus::from_str(&status).ok_or_else(|| StoreError::InvalidEnum {
        field: "visits.status".into(),
        value: status.clone(),
    })?;

    Ok(Visit {
        id,
        patient_id,
        status,
        signed_by,
        signed_at,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_memory_database;

    fn sample_visit() -> Visit {
        Visit {
            id: Uuid::new_v4(),
            patient_id: Some(Uuid::new_v4()),
            status: VisitNoteStatus::Draft,
            signed_by: None,
            signed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let visit = sample_visit();
        insert_visit(&conn, &visit).unwrap();

        let loaded = get_visit(&conn, visit.id).unwrap();
        assert_eq!(loaded.id, visit.id);
        assert_eq!(loaded.patient_id, visit.patient_id);
        assert_eq!(loaded.status, VisitNoteStatus::Draft);
        assert!(loaded.signed_by.is_none());
    }

    #[test]
    fn get_missing_visit_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = get_visit(&conn, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn status_update_stamps_signature() {
        let conn = open_memory_database().unwrap();
        let visit = sample_visit();
        insert_visit(&conn, &visit).unwrap();

        let signed_at = Utc::now();
        update_visit_status(
            &conn,
            visit.id,
            VisitNoteStatus::Signed,
            Some("dr.okafor"),
            Some(signed_at),
        )
        .unwrap();

        let loaded = get_visit(&conn, visit.id).unwrap();
        assert_eq!(loaded.status, VisitNoteStatus::Signed);
        assert_eq!(loaded.signed_by.as_deref(), Some("dr.okafor"));
        assert!(loaded.signed_at.is_some());
    }

    #[test]
    fn status_update_on_missing_visit_fails() {
        let conn = open_memory_database().unwrap();
        let err =
            update_visit_status(&conn, Uuid::new_v4(), VisitNoteStatus::Pending, None, None)
                .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
