//! Visit note lifecycle: the state machine over draft/pending/signed.
//!
//! Rules enforced here, not in the store:
//! - a `Signed` note is edit-locked: appending content fails with
//!   `EditLocked`, reported distinctly so the caller can offer the
//!   revert-to-draft path;
//! - `signed → pending` is never permitted;
//! - `signed → draft` happens only through `revert_to_draft` with an
//!   explicit confirmation, never as a side effect of anything else;
//! - every successful transition appends exactly one audit event; a store
//!   rejection surfaces the error and records nothing.
//!
//! There is no optimistic lock on status: two actors racing to sign the
//! same visit is a read-modify-write race the upstream design leaves open.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuditEvent, NoteDraft, NoteSection, Visit, VisitNoteEntry, VisitNoteStatus};
use crate::store::{NoteStore, StoreError};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Visit {visit_id} is signed; content is locked until it is reverted to draft")]
    EditLocked { visit_id: Uuid },

    #[error("Status transition {from:?} -> {to:?} is not permitted")]
    TransitionNotPermitted {
        from: VisitNoteStatus,
        to: VisitNoteStatus,
    },

    #[error("Reverting a signed note requires explicit confirmation")]
    RevertNotConfirmed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a status transition requested through the general path.
///
/// `signed → draft` is rejected here even though it is reachable; it must
/// come through `revert_to_draft`, which carries the confirmation.
pub fn check_transition(
    from: VisitNoteStatus,
    to: VisitNoteStatus,
) -> Result<(), LifecycleError> {
    use VisitNoteStatus::*;
    match (from, to) {
        (a, b) if a == b => Err(LifecycleError::TransitionNotPermitted { from, to }),
        (Signed, Pending) | (Signed, Draft) => {
            Err(LifecycleError::TransitionNotPermitted { from, to })
        }
        _ => Ok(()),
    }
}

/// A visit's entries regrouped by SOAP section, oldest-first within each.
/// This is the display view; derived, never stored.
#[derive(Debug, Clone, Default)]
pub struct SoapView {
    pub subjective: Vec<VisitNoteEntry>,
    pub objective: Vec<VisitNoteEntry>,
    pub assessment: Vec<VisitNoteEntry>,
    pub plan: Vec<VisitNoteEntry>,
}

/// The lifecycle service: owns the store and guards every mutation with
/// the state-machine rules.
pub struct NoteLifecycle<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NoteLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn create_visit(&mut self, patient_id: Option<Uuid>) -> Result<Visit, LifecycleError> {
        Ok(self.store.create_visit(patient_id)?)
    }

    pub fn status(&self, visit_id: Uuid) -> Result<VisitNoteStatus, LifecycleError> {
        Ok(self.store.get_visit(visit_id)?.status)
    }

    /// Append note content, enforcing the edit-lock before any store call.
    pub fn append_entry(
        &mut self,
        visit_id: Uuid,
        draft: &NoteDraft,
    ) -> Result<VisitNoteEntry, LifecycleError> {
        let status = self.status(visit_id)?;
        if !status.allows_append() {
            return Err(LifecycleError::EditLocked { visit_id });
        }
        Ok(self.store.append_note_entry(visit_id, draft)?)
    }

    /// General status change (`draft → pending`, `draft/pending → signed`).
    /// Signing stamps `signed_by`/`signed_at`; one audit event is appended
    /// after the status persists.
    pub fn set_status(
        &mut self,
        visit_id: Uuid,
        to: VisitNoteStatus,
        actor: &str,
    ) -> Result<(), LifecycleError> {
        let from = self.status(visit_id)?;
        check_transition(from, to)?;

        let now = Utc::now();
        let (signed_by, signed_at) = if to == VisitNoteStatus::Signed {
            (Some(actor), Some(now))
        } else {
            (None, None)
        };
        self.store.update_status(visit_id, to, signed_by, signed_at)?;
        self.record_transition(visit_id, from, to, actor)?;
        Ok(())
    }

    /// Sign the note, freezing its content.
    pub fn sign(&mut self, visit_id: Uuid, actor: &str) -> Result<(), LifecycleError> {
        self.set_status(visit_id, VisitNoteStatus::Signed, actor)
    }

    /// The deliberate unlock path: `signed → draft`, only with explicit
    /// confirmation. Clears the signature metadata.
    pub fn revert_to_draft(
        &mut self,
        visit_id: Uuid,
        actor: &str,
        confirmed: bool,
    ) -> Result<(), LifecycleError> {
        if !confirmed {
            return Err(LifecycleError::RevertNotConfirmed);
        }
        let from = self.status(visit_id)?;
        if from != VisitNoteStatus::Signed {
            return Err(LifecycleError::TransitionNotPermitted {
                from,
                to: VisitNoteStatus::Draft,
            });
        }

        self.store
            .update_status(visit_id, VisitNoteStatus::Draft, None, None)?;
        self.record_transition(visit_id, from, VisitNoteStatus::Draft, actor)?;
        Ok(())
    }

    pub fn audit_trail(&self, visit_id: Uuid) -> Result<Vec<AuditEvent>, LifecycleError> {
        Ok(self.store.audit_trail(visit_id)?)
    }

    /// Regroup the visit's entries into the SOAP display view.
    pub fn soap_view(&self, visit_id: Uuid) -> Result<SoapView, LifecycleError> {
        let mut view = SoapView::default();
        for entry in self.store.note_entries(visit_id)? {
            match entry.section {
                NoteSection::Subjective => view.subjective.push(entry),
                NoteSection::Objective => view.objective.push(entry),
                NoteSection::Assessment => view.assessment.push(entry),
                NoteSection::Plan => view.plan.push(entry),
            }
        }
        Ok(view)
    }

    fn record_transition(
        &mut self,
        visit_id: Uuid,
        from: VisitNoteStatus,
        to: VisitNoteStatus,
        actor: &str,
    ) -> Result<(), LifecycleError> {
        let event = AuditEvent {
            from,
            to,
            actor: actor.to_string(),
            timestamp: Utc::now(),
        };
        self.store.append_audit_event(visit_id, &event)?;
        tracing::info!(
            visit_id = %visit_id,
            from = from.as_str(),
            to = to.as_str(),
            "Visit status changed"
        );
        Ok(())
    }
}
