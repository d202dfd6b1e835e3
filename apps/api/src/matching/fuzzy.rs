//! Indel similarity ratio on a 0–100 scale.
//!
//! `ratio(a, b) = 100 · (1 - indel(a, b) / (|a| + |b|))`, which equals
//! `100 · 2·LCS(a, b) / (|a| + |b|)` over characters. Scoring is delegated to
//! `rapidfuzz`; this module adds the 0–100 scale and a length-only bound used
//! to skip hopeless pairs.

/// Float slack when comparing a ratio against a cutoff or a bound.
pub const RATIO_EPSILON: f64 = 1e-9;

/// Similarity ratio of two strings, 0.0–100.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Best ratio reachable for strings of these lengths (LCS ≤ shorter length).
pub fn ratio_upper_bound(len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 100.0;
    }
    200.0 * len_a.min(len_b) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < RATIO_EPSILON
    }

    #[test]
    fn test_identical_strings_score_100() {
        assert!(close(ratio("python", "python"), 100.0));
        assert_eq!(ratio("", ""), 100.0);
    }

    #[test]
    fn test_disjoint_strings_score_0() {
        assert!(close(ratio("abc", "xyz"), 0.0));
        assert!(close(ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        // LCS("kitten", "sitting") = "ittn" → 2·4 / 13
        assert!(close(ratio("kitten", "sitting"), 800.0 / 13.0));
        // LCS = "develop" → 2·7 / 16
        assert!(close(ratio("developer", "develop"), 1400.0 / 16.0));
        // ratio("postgresql", "postgres") = 2·8 / 18
        assert!(close(ratio("postgresql", "postgres"), 1600.0 / 18.0));
    }

    #[test]
    fn test_ratio_is_symmetric() {
        assert!(close(ratio("rest api", "api rest"), ratio("api rest", "rest api")));
    }

    #[test]
    fn test_ratio_counts_characters_not_bytes() {
        // LCS("café", "cafe") = "caf" → 2·3 / 8
        assert!(close(ratio("café", "cafe"), 75.0));
    }

    #[test]
    fn test_upper_bound_dominates_ratio() {
        for (a, b) in [("python", "py"), ("django rest", "django"), ("go", "golang")] {
            let bound = ratio_upper_bound(a.chars().count(), b.chars().count());
            assert!(ratio(a, b) <= bound + RATIO_EPSILON);
        }
    }
}
