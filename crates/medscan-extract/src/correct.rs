use crate::vocab;

/// Maps a known OCR misread onto its canonical medication name; anything not
/// in the correction table passes through unchanged. Pure exact-key lookup.
pub fn correct(name: &str) -> &str {
    let key = name.to_ascii_lowercase();
    match vocab::correction_for(&key) {
        Some(canonical) => canonical,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::correct;

    #[test]
    fn known_misreads_map_to_canonical_names() {
        assert_eq!(correct("amoriedlin"), "amoxicillin");
        assert_eq!(correct("Amoriedlin"), "amoxicillin");
        assert_eq!(correct("metforrnin"), "metformin");
    }

    #[test]
    fn unknown_words_pass_through_unchanged() {
        assert_eq!(correct("unknownword"), "unknownword");
        assert_eq!(correct("aspirin"), "aspirin");
    }
}
