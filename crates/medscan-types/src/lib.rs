//! Shared domain models for the medscan workspace.
//!
//! This crate centralizes lightweight data structures used across the
//! preprocess, OCR, extraction, source-lookup, and CLI crates. Keep it
//! backend-agnostic and avoid heavy dependencies so every crate can depend on
//! it without pulling native SDKs or HTTP stacks.

use serde::Serialize;
use thiserror::Error;

/// One differently-filtered rendering of the source image, produced to
/// improve OCR yield under differing label and packaging conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    Enhanced,
    Contrast,
    Denoise,
    Sharpen,
    BoxOptimized,
    TextFocused,
}

impl VariantKind {
    /// Fixed production order; selection tie-breaks follow this order.
    pub const ALL: [VariantKind; 6] = [
        VariantKind::Enhanced,
        VariantKind::Contrast,
        VariantKind::Denoise,
        VariantKind::Sharpen,
        VariantKind::BoxOptimized,
        VariantKind::TextFocused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Enhanced => "enhanced",
            VariantKind::Contrast => "contrast",
            VariantKind::Denoise => "denoise",
            VariantKind::Sharpen => "sharpen",
            VariantKind::BoxOptimized => "box-optimized",
            VariantKind::TextFocused => "text-focused",
        }
    }
}

/// Transcription produced by one OCR pass over one variant.
#[derive(Debug, Clone)]
pub struct OcrOutcome {
    pub variant: VariantKind,
    pub text: String,
    /// Recognition confidence in `0.0..=100.0`.
    pub confidence: f32,
}

impl OcrOutcome {
    pub fn new(variant: VariantKind, text: String, confidence: f32) -> Self {
        Self {
            variant,
            text,
            confidence: confidence.clamp(0.0, 100.0),
        }
    }

    /// Outcome for a variant whose OCR pass failed.
    pub fn empty(variant: VariantKind) -> Self {
        Self {
            variant,
            text: String::new(),
            confidence: 0.0,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Extraction strategy that produced a candidate, in priority order:
/// dictionary matches always outrank heuristic matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategyKind {
    Dictionary,
    Pattern,
    Capitalization,
    WordShape,
}

impl ExtractionStrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStrategyKind::Dictionary => "dictionary",
            ExtractionStrategyKind::Pattern => "pattern",
            ExtractionStrategyKind::Capitalization => "capitalization",
            ExtractionStrategyKind::WordShape => "word-shape",
        }
    }

    /// Lower rank wins when duplicate names collapse.
    pub fn priority(self) -> u8 {
        match self {
            ExtractionStrategyKind::Dictionary => 0,
            ExtractionStrategyKind::Pattern => 1,
            ExtractionStrategyKind::Capitalization => 2,
            ExtractionStrategyKind::WordShape => 3,
        }
    }
}

/// A provisionally-identified medication name, not yet validated against any
/// authoritative source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationCandidate {
    pub name: String,
    pub strategy: ExtractionStrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl MedicationCandidate {
    pub fn new(name: impl Into<String>, strategy: ExtractionStrategyKind) -> Self {
        Self {
            name: name.into(),
            strategy,
            strength: None,
            frequency: None,
        }
    }

    pub fn with_strength(mut self, value: impl Into<String>) -> Self {
        self.strength = Some(value.into());
        self
    }

    pub fn with_frequency(mut self, value: impl Into<String>) -> Self {
        self.frequency = Some(value.into());
        self
    }
}

/// Candidate length window; the extractor rejects names outside it.
#[derive(Debug, Clone, Copy)]
pub struct CandidateLimits {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for CandidateLimits {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_len: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateRejection {
    #[error("candidate '{name}' is shorter than {min} characters")]
    TooShort { name: String, min: usize },
    #[error("candidate '{name}' is longer than {max} characters")]
    TooLong { name: String, max: usize },
    #[error("candidate '{name}' contains non-alphabetic characters")]
    NonAlphabetic { name: String },
    #[error("candidate '{name}' is excluded vocabulary")]
    StopWord { name: String },
}

/// Length and character-class checks shared by all extraction strategies.
/// Stop-word exclusion lives with the vocabulary tables in the extract crate.
pub fn check_candidate_shape(
    name: &str,
    limits: &CandidateLimits,
) -> Result<(), CandidateRejection> {
    let len = name.chars().count();
    if len < limits.min_len {
        return Err(CandidateRejection::TooShort {
            name: name.to_string(),
            min: limits.min_len,
        });
    }
    if len > limits.max_len {
        return Err(CandidateRejection::TooLong {
            name: name.to_string(),
            max: limits.max_len,
        });
    }
    if !name.chars().all(|c| c.is_alphabetic()) {
        return Err(CandidateRejection::NonAlphabetic {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Answer from one external drug-information source. Absent data is `None`,
/// never a sentinel string; a source with nothing to say produces no record
/// at all. `confidence` is a producer-supplied constant used only to rank
/// merges, not a statistical estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceResult {
    pub source: String,
    pub queried_name: String,
    pub generic_name: Option<String>,
    pub brand_names: Vec<String>,
    pub manufacturer: Option<String>,
    pub dosage_form: Option<String>,
    pub route: Option<String>,
    pub used_for: Option<String>,
    pub side_effects: Option<String>,
    pub warnings: Option<String>,
    pub rxcui: Option<String>,
    pub confidence: f32,
}

impl SourceResult {
    pub fn new(source: impl Into<String>, queried_name: impl Into<String>, confidence: f32) -> Self {
        Self {
            source: source.into(),
            queried_name: queried_name.into(),
            generic_name: None,
            brand_names: Vec::new(),
            manufacturer: None,
            dosage_form: None,
            route: None,
            used_for: None,
            side_effects: None,
            warnings: None,
            rxcui: None,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// True when the source answered but carried no usable field.
    pub fn is_empty(&self) -> bool {
        self.generic_name.is_none()
            && self.brand_names.is_empty()
            && self.manufacturer.is_none()
            && self.dosage_form.is_none()
            && self.route.is_none()
            && self.used_for.is_none()
            && self.side_effects.is_none()
            && self.warnings.is_none()
            && self.rxcui.is_none()
    }
}

/// Field-by-field reconciliation of every contributing source, preferring the
/// highest-priority source that had a value for each field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedMedicationInfo {
    pub name: String,
    /// Contributing source identifiers, in the order first encountered
    /// during the merge.
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brand_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rxcui: Option<String>,
}

impl MergedMedicationInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Per-variant OCR summary carried on every report for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub variant: VariantKind,
    pub confidence: f32,
    pub characters: usize,
}

impl VariantSummary {
    pub fn from_outcome(outcome: &OcrOutcome) -> Self {
        Self {
            variant: outcome.variant,
            confidence: outcome.confidence,
            characters: outcome.text.trim().chars().count(),
        }
    }
}

/// Final result of one scan. Total failures are values here, never errors:
/// the caller can always render a deterministic response and suggest manual
/// entry when nothing was found.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanReport {
    Found {
        candidate: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        strength: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        frequency: Option<String>,
        /// Original spelling when the candidate was corrected before lookup.
        #[serde(skip_serializing_if = "Option::is_none")]
        corrected_from: Option<String>,
        info: MergedMedicationInfo,
        ocr: Vec<VariantSummary>,
    },
    NoReadableText {
        ocr: Vec<VariantSummary>,
    },
    NoMedicationInfo {
        #[serde(skip_serializing_if = "Option::is_none")]
        candidate: Option<String>,
        ocr: Vec<VariantSummary>,
    },
}
