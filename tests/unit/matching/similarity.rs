//! Tests for the Ratcliff/Obershelp similarity ratio

#[cfg(test)]
mod tests {
    use histoquant::matching::similarity::{matching_characters, similarity};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    // Tests ratio on overlapping strings
    // Verified by dividing by the longer length instead of the sum
    #[test]
    fn test_similarity_partial_overlap() {
        assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-12);
        assert!((similarity("P1_pre", "P1-pre") - 10.0 / 12.0).abs() < 1e-12);
        assert!((similarity("P1_pre", "P2-pre") - 8.0 / 12.0).abs() < 1e-12);
    }

    // Tests empty inputs
    // Verified by returning 0 for two empty strings
    #[test]
    fn test_similarity_empty() {
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("abc", "").abs() < f64::EPSILON);
        assert!(similarity("abc", "xyz").abs() < f64::EPSILON);
    }

    // Tests blocks are found on both sides of the longest match
    // Verified by only counting the longest block
    #[test]
    fn test_matching_characters_recurses() {
        assert_eq!(matching_characters(&chars("xabcyde"), &chars("abczde")), 5);
        assert_eq!(matching_characters(&chars("P1_post"), &chars("P2-post")), 5);
    }

    // Tests earliest match wins among equal lengths
    // Verified by preferring the latest match in the first string
    #[test]
    fn test_matching_characters_tie_break() {
        // "a" pairs with b[1]; nothing remains to the right of b[1]
        assert_eq!(matching_characters(&chars("ab"), &chars("ba")), 1);
        assert!((similarity("ab", "ba") - 0.5).abs() < 1e-12);
    }

    // Tests non-ASCII identifiers count characters, not bytes
    // Verified by comparing byte slices
    #[test]
    fn test_similarity_unicode() {
        assert!((similarity("échantillon_1", "échantillon-1") - 24.0 / 26.0).abs() < 1e-12);
    }
}
