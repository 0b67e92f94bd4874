use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::VisitNoteStatus;

/// A clinical encounter. Aggregates note entries, one current status, and
/// an audit trail; never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub status: VisitNoteStatus,
    pub signed_by: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Subjective section of the in-memory visit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectiveFields {
    pub chief_complaint: String,
    pub hpi: String,
}

/// Objective section of the in-memory visit form (vitals).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveFields {
    pub bp: String,
    pub hr: String,
    pub temp: String,
    pub weight: String,
}

/// Assessment & plan section of the in-memory visit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentPlanFields {
    pub assessment: String,
    pub plan: String,
}

/// The clinician-facing form state for an open visit, passed into the
/// merger as a value and patched by the caller. Explicit value type so the
/// merge stays a pure function with no hidden aliasing of form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitFormState {
    pub subjective: SubjectiveFields,
    pub objective: ObjectiveFields,
    pub assessment_plan: AssessmentPlanFields,
}

/// Fields the merger wants to fill in. `None` means "leave alone"; a
/// `Some` value is only ever produced for fields the draft left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub chief_complaint: Option<String>,
    pub hpi: Option<String>,
    pub bp: Option<String>,
    pub hr: Option<String>,
    pub temp: Option<String>,
    pub weight: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        self.chief_complaint.is_none()
            && self.hpi.is_none()
            && self.bp.is_none()
            && self.hr.is_none()
            && self.temp.is_none()
            && self.weight.is_none()
            && self.assessment.is_none()
            && self.plan.is_none()
    }
}

impl VisitFormState {
    /// Apply a merge patch. Existing non-empty values always win over the
    /// patch; a clinician's manual entry is never clobbered, even if the
    /// patch was produced against a stale copy of the form.
    pub fn apply(&mut self, patch: &DraftPatch) {
        fill_if_empty(&mut self.subjective.chief_complaint, &patch.chief_complaint);
        fill_if_empty(&mut self.subjective.hpi, &patch.hpi);
        fill_if_empty(&mut self.objective.bp, &patch.bp);
        fill_if_empty(&mut self.objective.hr, &patch.hr);
        fill_if_empty(&mut self.objective.temp, &patch.temp);
        fill_if_empty(&mut self.objective.weight, &patch.weight);
        fill_if_empty(&mut self.assessment_plan.assessment, &patch.assessment);
        fill_if_empty(&mut self.assessment_plan.plan, &patch.plan);
    }
}

fn fill_if_empty(field: &mut String, patch: &Option<String>) {
    if field.trim().is_empty() {
        if let Some(value) = patch {
            *field = value.clone();
        }
    }
}
