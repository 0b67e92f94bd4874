//! Visit-note lifecycle and dictation-ingestion core.
//!
//! The pieces, leaves first: `store` is CRUD over visits, append-only note
//! entries, and the audit trail; `pipeline` recovers vitals and exam
//! findings from dictation output and merges them into SOAP note entries
//! plus a form patch; `lifecycle` is the draft/pending/signed state machine
//! guarding every mutation; `dictation` orchestrates one transcription pass
//! end to end.

pub mod config;
pub mod dictation;
pub mod lifecycle;
pub mod models;
pub mod pipeline;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration harnesses embedding
/// this crate. Honors RUST_LOG, falls back to the crate default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
