use medscan_types::OcrOutcome;

/// Marker inserted between variant transcriptions when extraction wants the
/// redundancy of every variant at once.
pub const VARIANT_SEPARATOR: &str = "--- VARIANT SEPARATOR ---";

/// Scoring exponents for best-variant selection. The base formula
/// (confidence × ln(length + 1)) is an empirical heuristic, so both factors
/// stay tunable instead of hard constants.
#[derive(Debug, Clone, Copy)]
pub struct SelectorConfig {
    pub confidence_weight: f32,
    pub length_weight: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            confidence_weight: 1.0,
            length_weight: 1.0,
        }
    }
}

fn score(outcome: &OcrOutcome, config: &SelectorConfig) -> f32 {
    let length = outcome.text.trim().chars().count() as f32;
    outcome.confidence.max(0.0).powf(config.confidence_weight)
        * (length + 1.0).ln().powf(config.length_weight)
}

/// Picks the transcription that is both confident and substantive. Ties keep
/// the first-seen outcome, so selection is stable in variant production
/// order.
pub fn select_best<'a>(
    outcomes: &'a [OcrOutcome],
    config: &SelectorConfig,
) -> Option<&'a OcrOutcome> {
    let mut best: Option<(&'a OcrOutcome, f32)> = None;
    for outcome in outcomes {
        let value = score(outcome, config);
        let replace = match best {
            None => true,
            Some((_, current)) => value > current,
        };
        if replace {
            best = Some((outcome, value));
        }
    }
    best.map(|(outcome, _)| outcome)
}

/// Joins every non-empty transcription with the variant separator marker.
pub fn combine_texts(outcomes: &[OcrOutcome]) -> String {
    let separator = format!("\n{VARIANT_SEPARATOR}\n");
    outcomes
        .iter()
        .map(|outcome| outcome.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(&separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscan_types::VariantKind;

    fn outcome(variant: VariantKind, text: &str, confidence: f32) -> OcrOutcome {
        OcrOutcome::new(variant, text.to_string(), confidence)
    }

    #[test]
    fn favors_confident_and_substantive_text() {
        let outcomes = [
            outcome(VariantKind::Enhanced, "AB", 95.0),
            outcome(VariantKind::Contrast, "ASPIRIN 325mg tablets take daily", 70.0),
            outcome(VariantKind::Denoise, "", 99.0),
        ];
        let best = select_best(&outcomes, &SelectorConfig::default()).unwrap();
        assert_eq!(best.variant, VariantKind::Contrast);
    }

    #[test]
    fn ties_keep_first_seen_variant() {
        let outcomes = [
            outcome(VariantKind::Enhanced, "same text", 80.0),
            outcome(VariantKind::Sharpen, "same text", 80.0),
        ];
        for _ in 0..10 {
            let best = select_best(&outcomes, &SelectorConfig::default()).unwrap();
            assert_eq!(best.variant, VariantKind::Enhanced);
        }
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select_best(&[], &SelectorConfig::default()).is_none());
    }

    #[test]
    fn combine_joins_non_empty_texts_with_marker() {
        let outcomes = [
            outcome(VariantKind::Enhanced, "first", 50.0),
            outcome(VariantKind::Contrast, "  ", 50.0),
            outcome(VariantKind::Denoise, "second", 50.0),
        ];
        let combined = combine_texts(&outcomes);
        assert_eq!(combined, format!("first\n{VARIANT_SEPARATOR}\nsecond"));
    }
}
