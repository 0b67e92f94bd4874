use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SOAP section a note entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSection {
    Subjective,
    Objective,
    Assessment,
    Plan,
}

impl NoteSection {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteSection::Subjective => "subjective",
            NoteSection::Objective => "objective",
            NoteSection::Assessment => "assessment",
            NoteSection::Plan => "plan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "subjective" => Some(NoteSection::Subjective),
            "objective" => Some(NoteSection::Objective),
            "assessment" => Some(NoteSection::Assessment),
            "plan" => Some(NoteSection::Plan),
            _ => None,
        }
    }

    /// Display heading for the derived SOAP view.
    pub fn heading(self) -> &'static str {
        match self {
            NoteSection::Subjective => "Subjective",
            NoteSection::Objective => "Objective",
            NoteSection::Assessment => "Assessment",
            NoteSection::Plan => "Plan",
        }
    }
}

/// How a note entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSource {
    Manual,
    Dictation,
}

impl NoteSource {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteSource::Manual => "manual",
            NoteSource::Dictation => "dictation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(NoteSource::Manual),
            "dictation" => Some(NoteSource::Dictation),
            _ => None,
        }
    }
}

/// A single persisted note entry. Immutable once appended; amendments are
/// new entries, and the per-section display view is re-derived from the full
/// entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitNoteEntry {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub section: NoteSection,
    pub content: String,
    pub source: NoteSource,
    pub created_at: DateTime<Utc>,
}

/// An entry the merger intends to append. The store stamps id and
/// created_at at persist time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub section: NoteSection,
    pub content: String,
    pub source: NoteSource,
}

impl NoteDraft {
    pub fn new(section: NoteSection, content: impl Into<String>, source: NoteSource) -> Self {
        Self {
            section,
            content: content.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_round_trips_through_str() {
        for section in [
            NoteSection::Subjective,
            NoteSection::Objective,
            NoteSection::Assessment,
            NoteSection::Plan,
        ] {
            assert_eq!(NoteSection::from_str(section.as_str()), Some(section));
        }
    }

    #[test]
    fn unknown_section_is_none() {
        assert_eq!(NoteSection::from_str("vitals"), None);
    }

    #[test]
    fn source_round_trips_through_str() {
        assert_eq!(NoteSource::from_str("manual"), Some(NoteSource::Manual));
        assert_eq!(NoteSource::from_str("dictation"), Some(NoteSource::Dictation));
        assert_eq!(NoteSource::from_str("typed"), None);
    }
}
