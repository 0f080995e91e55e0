use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::vocab;
use medscan_types::{
    CandidateLimits, CandidateRejection, ExtractionStrategyKind, MedicationCandidate,
    check_candidate_shape,
};

static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z]+(?:cillin|mycin|cycline|prazole|sartan|statin|olol)\b")
        .expect("suffix pattern")
});

static DOSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\s+(\d+(?:\.\d+)?)\s*(mg|mcg|ml|g|iu|units)\b")
        .expect("dosage pattern")
});

static FREQUENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:once|twice|three times|four times)\s+(?:a day|daily|per day)|every\s+\d+\s+(?:hours?|days?))\b",
    )
    .expect("frequency pattern")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractorConfig {
    pub limits: CandidateLimits,
}

/// Extracts medication-name candidates from normalized label text by running
/// every strategy independently and collapsing duplicates onto the
/// highest-priority strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateExtractor {
    config: ExtractorConfig,
}

impl CandidateExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, text: &str) -> Vec<MedicationCandidate> {
        let mut merged: Vec<MedicationCandidate> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for backend in strategy_order() {
            for candidate in backend.extract(text) {
                if let Err(rejection) = admit(&candidate.name, &self.config.limits) {
                    debug!(
                        strategy = backend.kind().as_str(),
                        reason = %rejection,
                        "candidate rejected"
                    );
                    continue;
                }
                let key = candidate.name.to_ascii_lowercase();
                match by_name.get(&key) {
                    Some(&index) => {
                        // Duplicate from a lower-priority strategy may still
                        // carry the strength or frequency the winner lacked.
                        let kept = &mut merged[index];
                        if kept.strength.is_none() {
                            kept.strength = candidate.strength;
                        }
                        if kept.frequency.is_none() {
                            kept.frequency = candidate.frequency;
                        }
                    }
                    None => {
                        by_name.insert(key, merged.len());
                        merged.push(candidate);
                    }
                }
            }
        }

        merged
    }
}

fn admit(name: &str, limits: &CandidateLimits) -> Result<(), CandidateRejection> {
    check_candidate_shape(name, limits)?;
    if vocab::is_stop_word(name) {
        return Err(CandidateRejection::StopWord {
            name: name.to_string(),
        });
    }
    Ok(())
}

trait ExtractionBackend: Send + Sync {
    fn kind(&self) -> ExtractionStrategyKind;
    fn extract(&self, text: &str) -> Vec<MedicationCandidate>;
}

struct DictionaryBackend;
struct PatternBackend;
struct CapitalizationBackend;
struct WordShapeBackend;

static DICTIONARY_BACKEND: DictionaryBackend = DictionaryBackend;
static PATTERN_BACKEND: PatternBackend = PatternBackend;
static CAPITALIZATION_BACKEND: CapitalizationBackend = CapitalizationBackend;
static WORD_SHAPE_BACKEND: WordShapeBackend = WordShapeBackend;

/// Strategies in output priority order.
fn strategy_order() -> [&'static dyn ExtractionBackend; 4] {
    [
        &DICTIONARY_BACKEND,
        &PATTERN_BACKEND,
        &CAPITALIZATION_BACKEND,
        &WORD_SHAPE_BACKEND,
    ]
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
}

impl ExtractionBackend for DictionaryBackend {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::Dictionary
    }

    fn extract(&self, text: &str) -> Vec<MedicationCandidate> {
        words(text)
            .filter(|word| vocab::is_known_medication(word))
            .map(|word| MedicationCandidate::new(word, self.kind()))
            .collect()
    }
}

impl ExtractionBackend for PatternBackend {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::Pattern
    }

    fn extract(&self, text: &str) -> Vec<MedicationCandidate> {
        let frequency = FREQUENCY_RE.find(text).map(|m| m.as_str().to_string());
        let mut candidates = Vec::new();

        for capture in DOSAGE_RE.captures_iter(text) {
            let name = &capture[1];
            let strength = format!("{}{}", &capture[2], capture[3].to_ascii_lowercase());
            let mut candidate = MedicationCandidate::new(name, self.kind()).with_strength(strength);
            if let Some(phrase) = frequency.as_deref() {
                candidate = candidate.with_frequency(phrase);
            }
            candidates.push(candidate);
        }

        for matched in SUFFIX_RE.find_iter(text) {
            candidates.push(MedicationCandidate::new(matched.as_str(), self.kind()));
        }

        candidates
    }
}

impl ExtractionBackend for CapitalizationBackend {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::Capitalization
    }

    fn extract(&self, text: &str) -> Vec<MedicationCandidate> {
        words(text)
            .filter(|word| {
                word.chars().count() >= 5
                    && word.chars().next().is_some_and(char::is_uppercase)
                    && word.chars().all(char::is_alphabetic)
            })
            .map(|word| MedicationCandidate::new(word, self.kind()))
            .collect()
    }
}

impl ExtractionBackend for WordShapeBackend {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::WordShape
    }

    fn extract(&self, text: &str) -> Vec<MedicationCandidate> {
        words(text)
            .filter(|word| word.chars().all(char::is_alphabetic))
            .map(|word| MedicationCandidate::new(word, self.kind()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::VARIANT_SEPARATOR;
    use medscan_types::ExtractionStrategyKind;

    fn extract(text: &str) -> Vec<MedicationCandidate> {
        CandidateExtractor::default().extract(text)
    }

    #[test]
    fn dictionary_match_wins_and_keeps_pattern_strength() {
        let candidates = extract("ASPIRIN 325mg tablets");
        let aspirin = candidates
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case("aspirin"))
            .expect("aspirin candidate");
        assert_eq!(aspirin.strategy, ExtractionStrategyKind::Dictionary);
        assert_eq!(aspirin.strength.as_deref(), Some("325mg"));
    }

    #[test]
    fn dosage_pattern_carries_strength_and_frequency() {
        let candidates = extract("Zestrilo 10 mg take twice daily");
        let hit = candidates
            .iter()
            .find(|c| c.name == "Zestrilo")
            .expect("dosage candidate");
        assert_eq!(hit.strategy, ExtractionStrategyKind::Pattern);
        assert_eq!(hit.strength.as_deref(), Some("10mg"));
        assert_eq!(hit.frequency.as_deref(), Some("twice daily"));
    }

    #[test]
    fn pharmacological_suffixes_match() {
        let candidates = extract("prescribed flubbicillin for the infection");
        let hit = candidates
            .iter()
            .find(|c| c.name == "flubbicillin")
            .expect("suffix candidate");
        assert_eq!(hit.strategy, ExtractionStrategyKind::Pattern);
    }

    #[test]
    fn capitalized_unknown_words_are_candidates() {
        let candidates = extract("Lipitor helps cholesterol");
        let hit = candidates
            .iter()
            .find(|c| c.name == "Lipitor")
            .expect("capitalized candidate");
        assert_eq!(hit.strategy, ExtractionStrategyKind::Capitalization);
    }

    #[test]
    fn never_emits_stop_words_or_bad_shapes() {
        let text = "Take 2 Tablets daily with Water from the Bottle per Instructions ok";
        for candidate in extract(text) {
            let len = candidate.name.chars().count();
            assert!((4..=20).contains(&len), "{}", candidate.name);
            assert!(candidate.name.chars().all(char::is_alphabetic), "{}", candidate.name);
            assert!(!vocab::is_stop_word(&candidate.name), "{}", candidate.name);
        }
    }

    #[test]
    fn dictionary_candidates_lead_the_output() {
        let candidates = extract("Brandname then ibuprofen 200mg");
        assert_eq!(
            candidates.first().map(|c| c.strategy),
            Some(ExtractionStrategyKind::Dictionary)
        );
    }

    #[test]
    fn separator_marker_never_becomes_a_candidate() {
        let text = format!("ASPIRIN\n{VARIANT_SEPARATOR}\nASPIRIN 325mg");
        for candidate in extract(&text) {
            assert!(!candidate.name.eq_ignore_ascii_case("variant"));
            assert!(!candidate.name.eq_ignore_ascii_case("separator"));
        }
    }

    #[test]
    fn duplicates_collapse_case_insensitively() {
        let candidates = extract("aspirin Aspirin ASPIRIN");
        let count = candidates
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case("aspirin"))
            .count();
        assert_eq!(count, 1);
    }
}
