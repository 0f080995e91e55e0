const BULLET_MARKERS: [char; 4] = ['-', '*', '•', '·'];

/// Cleans typical OCR spacing artifacts: whitespace runs collapse to one
/// space, `:` `,` `.` get no space before and exactly one after, standalone
/// bullet markers canonicalize to `• `, and the result is trimmed.
///
/// Decimal points between digits are left untouched so dosage strengths like
/// "2.5mg" survive. The transform is idempotent.
pub fn normalize(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            i += 1;
            continue;
        }

        if c == ':' || c == ',' {
            pending_space = false;
            out.push(c);
            pending_space = true;
            i += 1;
            continue;
        }

        if c == '.' {
            let prev_digit = out.chars().last().is_some_and(|p| p.is_ascii_digit());
            let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if prev_digit && next_digit && !pending_space {
                out.push('.');
            } else {
                pending_space = false;
                out.push('.');
                pending_space = true;
            }
            i += 1;
            continue;
        }

        if BULLET_MARKERS.contains(&c) {
            let standalone_before = out.is_empty() || pending_space;
            let standalone_after = chars.get(i + 1).is_none_or(|n| n.is_whitespace());
            if standalone_before && standalone_after {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                out.push('•');
                pending_space = true;
                i += 1;
                continue;
            }
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("take   one\t tablet \n daily"), "take one tablet daily");
    }

    #[test]
    fn spaces_punctuation_after_not_before() {
        assert_eq!(normalize("Dosage :325 mg ,daily"), "Dosage: 325 mg, daily");
        assert_eq!(normalize("tablets.Take with water"), "tablets. Take with water");
    }

    #[test]
    fn keeps_decimal_points_inside_numbers() {
        assert_eq!(normalize("take 2.5mg nightly"), "take 2.5mg nightly");
        assert_eq!(normalize("take 2 . 5 mg"), "take 2. 5 mg");
    }

    #[test]
    fn canonicalizes_bullet_markers() {
        assert_eq!(normalize("- shake well\n* keep cold"), "• shake well • keep cold");
        assert_eq!(normalize("· store upright"), "• store upright");
    }

    #[test]
    fn leaves_hyphenated_words_alone() {
        assert_eq!(normalize("extended-release capsule"), "extended-release capsule");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(normalize("   ASPIRIN 325mg   "), "ASPIRIN 325mg");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "  IBUPROFEN  200mg ,take  twice daily .",
            "- shake\n- store:cold",
            "Warnings : do not exceed 3 .5 doses",
            "",
            "already normal text",
            "• bullet stays • put",
        ];
        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }
}
