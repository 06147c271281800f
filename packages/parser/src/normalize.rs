//! Name normalization shared by places-enrichment matching (§4.5) and
//! consensus grouping (§4.7): lowercase, strip apostrophes, hyphen→space,
//! trim.

/// Normalizes a place name for comparison/grouping.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .replace('-', " ")
        .trim()
        .to_string()
}

/// `true` if either normalized name contains the other as a substring.
#[must_use]
pub fn substring_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Word-overlap ratio: intersection of `a`'s words with `b`'s words, divided
/// by `a`'s word count. Used as the third tier of places-enrichment
/// matching, with `a` being the recommendation name.
#[must_use]
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let words_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    if words_a.is_empty() {
        return 0.0;
    }
    let words_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    let overlap = words_a.intersection(&words_b).count();
    #[allow(clippy::cast_precision_loss)]
    {
        overlap as f64 / words_a.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_apostrophes_hyphens_and_case() {
        assert_eq!(normalize_name("Joe's Diner"), "joes diner");
        assert_eq!(normalize_name("Café-Bar"), "café bar");
        assert_eq!(normalize_name("  Spaced  Out  "), "spaced  out");
    }

    #[test]
    fn two_forms_of_same_name_normalize_equal() {
        assert_eq!(normalize_name("Joe's Diner"), normalize_name("joes diner"));
    }

    #[test]
    fn word_overlap_is_ratio_over_first_argument() {
        assert!((word_overlap("the blue bistro", "blue bistro downtown") - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn substring_match_is_bidirectional() {
        assert!(substring_match("blue bistro", "bistro"));
        assert!(substring_match("bistro", "blue bistro"));
        assert!(!substring_match("blue bistro", "red cafe"));
    }
}
