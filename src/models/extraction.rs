use serde::{Deserialize, Serialize};

/// One symptom item from the transcription service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomEntry {
    #[serde(default)]
    pub symptom: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// One prescription item from the transcription service. Every part is
/// optional; the model frequently omits fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionEntry {
    #[serde(default)]
    pub medication: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Diagnosis arrives either as a single string or an array of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosisField {
    Single(String),
    Multiple(Vec<String>),
}

impl DiagnosisField {
    /// Normalize to one comma-joined string, skipping empty items.
    pub fn joined(&self) -> String {
        match self {
            DiagnosisField::Single(s) => s.trim().to_string(),
            DiagnosisField::Multiple(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// The parsed dictation result: a loosely-typed tree where every field is
/// optional and `physical_exam_findings` stays an untyped JSON map (its
/// values mix prose, nested objects, and JSON fragments embedded in
/// strings). Transient; consumed by the merger, never persisted as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredExtraction {
    #[serde(default)]
    pub current_symptoms: Vec<SymptomEntry>,
    #[serde(default)]
    pub physical_exam_findings: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub past_medical_history: Vec<String>,
    #[serde(default)]
    pub diagnosis: Option<DiagnosisField>,
    #[serde(default)]
    pub treatment_plan: Vec<String>,
    #[serde(default)]
    pub prescriptions: Vec<PrescriptionEntry>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Vitals pulled out of a dictation result. A populated field came from the
/// highest-priority source that matched and is never overwritten by a
/// lower-priority one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsBundle {
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<String>,
    pub temperature: Option<String>,
    pub weight: Option<String>,
}

impl VitalsBundle {
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.is_none()
            && self.heart_rate.is_none()
            && self.temperature.is_none()
            && self.weight.is_none()
    }

    /// Labeled (name, value) pairs for the populated fields, in display order.
    pub fn labeled(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(ref bp) = self.blood_pressure {
            out.push(("Blood Pressure", bp.as_str()));
        }
        if let Some(ref hr) = self.heart_rate {
            out.push(("Heart Rate", hr.as_str()));
        }
        if let Some(ref temp) = self.temperature {
            out.push(("Temperature", temp.as_str()));
        }
        if let Some(ref weight) = self.weight {
            out.push(("Weight", weight.as_str()));
        }
        out
    }
}
