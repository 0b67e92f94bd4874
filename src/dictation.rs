//! Dictation ingestion: transcription, extraction, merge, append.
//!
//! One ingestion pass is a single async operation from the caller's point
//! of view: transcribe the audio, recover the structured payload, merge it
//! against the form state, then push the produced entries through the
//! lifecycle service. Appends are best-effort: one failed append is logged
//! and counted without aborting its siblings. The caller applies the
//! returned patch and re-fetches authoritative state; there is no local
//! cache invalidation beyond that reload.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::{LifecycleError, NoteLifecycle};
use crate::models::{DraftPatch, StructuredExtraction, VisitFormState};
use crate::pipeline::{merge, parse_structured_payload};
use crate::store::NoteStore;

#[derive(Error, Debug)]
pub enum DictationError {
    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// What the transcription service returns. Any field may be absent; the
/// `structured` payload is raw model output and is parsed leniently.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionOutcome {
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub structured: Option<Value>,
}

/// The external transcription collaborator (audio in, structured text out).
pub trait Transcriber {
    fn transcribe(
        &self,
        audio_path: &Path,
        visit_id: Uuid,
    ) -> impl std::future::Future<Output = Result<TranscriptionOutcome, DictationError>> + Send;
}

/// Result of one ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Note entries successfully appended.
    pub appended: usize,
    /// Note entries the store rejected (logged, not fatal).
    pub failed: usize,
    /// Form fields to fill; the caller commits this.
    pub patch: DraftPatch,
}

/// Run one dictation pass against a visit.
///
/// Fails fast with `EditLocked` when the visit is signed; dictation never
/// silently unlocks a note. Transcription failure aborts the pass; append
/// failures do not.
pub async fn ingest_dictation<T, S>(
    transcriber: &T,
    lifecycle: &mut NoteLifecycle<S>,
    visit_id: Uuid,
    audio_path: &Path,
    form: &VisitFormState,
) -> Result<IngestReport, DictationError>
where
    T: Transcriber,
    S: NoteStore,
{
    let status = lifecycle.status(visit_id)?;
    if !status.allows_append() {
        return Err(LifecycleError::EditLocked { visit_id }.into());
    }

    let outcome = transcriber.transcribe(audio_path, visit_id).await?;
    let extraction = build_extraction(outcome);
    let merged = merge(&extraction, form);

    let mut report = IngestReport {
        patch: merged.patch,
        ..Default::default()
    };

    for draft in &merged.notes {
        match lifecycle.append_entry(visit_id, draft) {
            Ok(_) => report.appended += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(
                    visit_id = %visit_id,
                    section = draft.section.as_str(),
                    error = %e,
                    "Note append failed during dictation merge"
                );
            }
        }
    }

    tracing::info!(
        visit_id = %visit_id,
        appended = report.appended,
        failed = report.failed,
        "Dictation pass complete"
    );
    Ok(report)
}

/// Fold the service's top-level transcript/summary into the extraction.
/// The structured payload's own fields win when both are present.
fn build_extraction(outcome: TranscriptionOutcome) -> StructuredExtraction {
    let mut extraction = parse_structured_payload(outcome.structured.as_ref());
    if extraction.transcript.is_none() {
        extraction.transcript = outcome.transcript.filter(|s| !s.trim().is_empty());
    }
    if extraction.summary.is_none() {
        extraction.summary = outcome.summary.filter(|s| !s.trim().is_empty());
    }
    extraction
}
