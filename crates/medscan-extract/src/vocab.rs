//! Process-wide vocabulary tables. Loaded once, never mutated at runtime,
//! safe to share across concurrent scans without locking.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Medications the dictionary strategy recognizes outright.
pub const KNOWN_MEDICATIONS: &[&str] = &[
    "acetaminophen",
    "albuterol",
    "alprazolam",
    "amlodipine",
    "amoxicillin",
    "aspirin",
    "atenolol",
    "atorvastatin",
    "azithromycin",
    "carvedilol",
    "cephalexin",
    "ciprofloxacin",
    "citalopram",
    "clopidogrel",
    "diazepam",
    "diclofenac",
    "donepezil",
    "doxycycline",
    "duloxetine",
    "escitalopram",
    "fluoxetine",
    "furosemide",
    "gabapentin",
    "hydrochlorothiazide",
    "ibuprofen",
    "insulin",
    "levothyroxine",
    "lisinopril",
    "loratadine",
    "losartan",
    "memantine",
    "metformin",
    "metoprolol",
    "montelukast",
    "naproxen",
    "omeprazole",
    "pantoprazole",
    "prednisone",
    "propranolol",
    "quetiapine",
    "rivastigmine",
    "sertraline",
    "simvastatin",
    "tramadol",
    "trazodone",
    "tylenol",
    "warfarin",
    "zolpidem",
];

/// Label vocabulary that must never surface as a medication candidate.
/// Includes the words the combined-text separator marker is built from.
const STOP_WORDS: &[&str] = &[
    "about",
    "adults",
    "after",
    "before",
    "bottle",
    "capsule",
    "capsules",
    "caution",
    "children",
    "contains",
    "daily",
    "directions",
    "doctor",
    "dosage",
    "doses",
    "drug",
    "every",
    "exceed",
    "expires",
    "facts",
    "food",
    "health",
    "hospital",
    "hours",
    "ingredients",
    "instructions",
    "keep",
    "label",
    "medical",
    "medicine",
    "morning",
    "night",
    "other",
    "patient",
    "pharmacy",
    "prescription",
    "product",
    "purposes",
    "refill",
    "relief",
    "separator",
    "store",
    "strength",
    "tablet",
    "tablets",
    "take",
    "their",
    "these",
    "uses",
    "variant",
    "warning",
    "warnings",
    "water",
    "while",
    "with",
    "without",
];

/// Canonical names for recurring OCR misreads of common medications.
/// Exact-key lookup only; fuzzy matching is deliberately out of bounds.
static SPELLING_CORRECTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("acetarninophen", "acetaminophen"),
        ("albuteroi", "albuterol"),
        ("amoriedlin", "amoxicillin"),
        ("arnoxicillin", "amoxicillin"),
        ("asplrin", "aspirin"),
        ("asprin", "aspirin"),
        ("atorvastatln", "atorvastatin"),
        ("gabapentln", "gabapentin"),
        ("ibuprofein", "ibuprofen"),
        ("ibuprofin", "ibuprofen"),
        ("lbuprofen", "ibuprofen"),
        ("lisinoprll", "lisinopril"),
        ("metforrnin", "metformin"),
        ("orneprazole", "omeprazole"),
        ("sirnvastatin", "simvastatin"),
        ("tylenoi", "tylenol"),
        ("warfarln", "warfarin"),
    ])
});

static KNOWN_MEDICATION_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| KNOWN_MEDICATIONS.iter().copied().collect());

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_known_medication(word: &str) -> bool {
    KNOWN_MEDICATION_SET.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word.to_ascii_lowercase().as_str())
}

pub(crate) fn correction_for(lowercase_name: &str) -> Option<&'static str> {
    SPELLING_CORRECTIONS.get(lowercase_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscan_types::{CandidateLimits, check_candidate_shape};

    #[test]
    fn lookups_are_case_insensitive() {
        assert!(is_known_medication("Aspirin"));
        assert!(is_known_medication("IBUPROFEN"));
        assert!(is_stop_word("Tablets"));
        assert!(!is_stop_word("aspirin"));
    }

    #[test]
    fn separator_marker_words_are_excluded() {
        assert!(is_stop_word("variant"));
        assert!(is_stop_word("separator"));
    }

    #[test]
    fn every_known_medication_passes_the_shape_check() {
        let limits = CandidateLimits::default();
        for name in KNOWN_MEDICATIONS {
            assert!(check_candidate_shape(name, &limits).is_ok(), "{name}");
            assert!(!is_stop_word(name), "{name} is also a stop word");
        }
    }

    #[test]
    fn corrections_map_to_known_medications() {
        for (misread, canonical) in SPELLING_CORRECTIONS.iter() {
            assert_ne!(misread, canonical);
            assert!(is_known_medication(canonical), "{canonical}");
        }
    }
}
