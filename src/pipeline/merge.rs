//! Reconciliation of a structured extraction into SOAP note entries and a
//! draft-form patch.
//!
//! The merge is a pure function: it reads the current form state to decide
//! which fields it may fill, and returns intents (entries to append and a
//! patch to apply) without touching anything itself. Notes are append-only
//! (the merger never edits or removes an entry) and the patch never carries
//! a value for a field the clinician already filled in.
//!
//! Running the same extraction twice appends the same entries twice. That
//! mirrors the upstream behavior deliberately: there is no content-hash
//! dedupe, and callers re-running a transcription get duplicate
//! dictation-sourced entries.

use crate::models::{
    DraftPatch, NoteDraft, NoteSection, NoteSource, PrescriptionEntry, StructuredExtraction,
    VisitFormState,
};

use super::findings::sanitize_findings;
use super::vitals::extract_vitals;

/// What a merge pass wants done: entries to append via the note store, and
/// form fields to fill. The caller commits both and re-fetches
/// authoritative state.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub notes: Vec<NoteDraft>,
    pub patch: DraftPatch,
}

/// Merge an extraction against the current draft form.
pub fn merge(extraction: &StructuredExtraction, draft: &VisitFormState) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    merge_symptoms(extraction, draft, &mut outcome);
    merge_exam_findings(extraction, draft, &mut outcome);
    merge_history(extraction, draft, &mut outcome);
    merge_diagnosis(extraction, draft, &mut outcome);
    merge_treatment_plan(extraction, draft, &mut outcome);
    merge_prescriptions(extraction, &mut outcome);

    if let Some(transcript) = non_empty(extraction.transcript.as_deref()) {
        push_note(&mut outcome, NoteSection::Subjective, transcript.to_string());
    }
    if let Some(summary) = non_empty(extraction.summary.as_deref()) {
        push_note(&mut outcome, NoteSection::Assessment, summary.to_string());
    }

    outcome
}

fn merge_symptoms(
    extraction: &StructuredExtraction,
    draft: &VisitFormState,
    outcome: &mut MergeOutcome,
) {
    let joined = extraction
        .current_symptoms
        .iter()
        .filter_map(|s| non_empty(s.symptom.as_deref()))
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        return;
    }

    if is_empty(&draft.subjective.chief_complaint) {
        outcome.patch.chief_complaint = Some(joined.clone());
    }
    push_note(
        outcome,
        NoteSection::Subjective,
        format!("Chief Complaint: {joined}"),
    );
}

fn merge_exam_findings(
    extraction: &StructuredExtraction,
    draft: &VisitFormState,
    outcome: &mut MergeOutcome,
) {
    let Some(findings) = extraction.physical_exam_findings.as_ref() else {
        return;
    };

    // The flattened findings text doubles as the extractor's last-resort
    // regex target.
    let fallback_text = findings
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let vitals = extract_vitals(Some(findings), &fallback_text);

    if is_empty(&draft.objective.bp) {
        outcome.patch.bp = vitals.blood_pressure.clone();
    }
    if is_empty(&draft.objective.hr) {
        outcome.patch.hr = vitals.heart_rate.clone();
    }
    if is_empty(&draft.objective.temp) {
        outcome.patch.temp = vitals.temperature.clone();
    }
    if is_empty(&draft.objective.weight) {
        outcome.patch.weight = vitals.weight.clone();
    }

    if !vitals.is_empty() {
        let lines = vitals
            .labeled()
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        push_note(outcome, NoteSection::Objective, format!("Vital Signs:\n{lines}"));
    }

    let sanitized = sanitize_findings(findings);
    if !sanitized.is_empty() {
        let lines = sanitized
            .iter()
            .map(|f| format!("{}: {}", f.key, f.text))
            .collect::<Vec<_>>()
            .join("\n");
        push_note(
            outcome,
            NoteSection::Objective,
            format!("Physical Examination: {lines}"),
        );
    }
}

fn merge_history(
    extraction: &StructuredExtraction,
    draft: &VisitFormState,
    outcome: &mut MergeOutcome,
) {
    let joined = join_lines(&extraction.past_medical_history);
    if joined.is_empty() {
        return;
    }

    if is_empty(&draft.subjective.hpi) {
        outcome.patch.hpi = Some(joined.clone());
    }
    push_note(
        outcome,
        NoteSection::Subjective,
        format!("Past Medical History: {joined}"),
    );
}

fn merge_diagnosis(
    extraction: &StructuredExtraction,
    draft: &VisitFormState,
    outcome: &mut MergeOutcome,
) {
    let Some(joined) = extraction
        .diagnosis
        .as_ref()
        .map(|d| d.joined())
        .filter(|s| !s.is_empty())
    else {
        return;
    };

    if is_empty(&draft.assessment_plan.assessment) {
        outcome.patch.assessment = Some(joined.clone());
    }
    push_note(
        outcome,
        NoteSection::Assessment,
        format!("Diagnosis: {joined}"),
    );
}

fn merge_treatment_plan(
    extraction: &StructuredExtraction,
    draft: &VisitFormState,
    outcome: &mut MergeOutcome,
) {
    let joined = join_lines(&extraction.treatment_plan);
    if joined.is_empty() {
        return;
    }

    if is_empty(&draft.assessment_plan.plan) {
        outcome.patch.plan = Some(joined.clone());
    }
    push_note(outcome, NoteSection::Plan, format!("Treatment Plan: {joined}"));
}

/// Prescriptions only produce a note entry; there is no prescription form
/// field to patch.
fn merge_prescriptions(extraction: &StructuredExtraction, outcome: &mut MergeOutcome) {
    let lines: Vec<String> = extraction
        .prescriptions
        .iter()
        .filter_map(format_prescription)
        .collect();
    if lines.is_empty() {
        return;
    }
    push_note(
        outcome,
        NoteSection::Plan,
        format!("Prescriptions: {}", lines.join("\n")),
    );
}

/// `"<medication>, Dosage: <d>, Frequency: <f>, Duration: <dur>"` with
/// empty parts omitted. A prescription with no parts at all yields nothing.
fn format_prescription(p: &PrescriptionEntry) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(med) = non_empty(p.medication.as_deref()) {
        parts.push(med.to_string());
    }
    if let Some(dosage) = non_empty(p.dosage.as_deref()) {
        parts.push(format!("Dosage: {dosage}"));
    }
    if let Some(freq) = non_empty(p.frequency.as_deref()) {
        parts.push(format!("Frequency: {freq}"));
    }
    if let Some(duration) = non_empty(p.duration.as_deref()) {
        parts.push(format!("Duration: {duration}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn push_note(outcome: &mut MergeOutcome, section: NoteSection, content: String) {
    outcome
        .notes
        .push(NoteDraft::new(section, content, NoteSource::Dictation));
}

fn join_lines(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_empty(field: &str) -> bool {
    field.trim().is_empty()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
