//! Sector Classifier: maps a synthesized company profile onto a coarse sector
//! used as the institutional-memory partition key.

/// Sector returned when no keyword matches.
pub const DEFAULT_SECTOR: &str = "general";

/// Known sectors, checked in order. Earlier entries win when several occur,
/// so reordering this list changes classification.
pub const SECTOR_KEYWORDS: &[&str] = &[
    "energy",
    "agriculture",
    "agtech",
    "defense",
    "aerospace",
    "healthcare",
    "financial",
    "technology",
    "manufacturing",
    "retail",
    "logistics",
    "real estate",
];

/// Returns the first keyword of `SECTOR_KEYWORDS` found anywhere in `profile`
/// (case-insensitive substring match), or `DEFAULT_SECTOR`.
pub fn classify(profile: &str) -> &'static str {
    let haystack = profile.to_lowercase();
    SECTOR_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| haystack.contains(keyword))
        .unwrap_or(DEFAULT_SECTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_general() {
        assert_eq!(classify("A bakery on Main Street."), "general");
        assert_eq!(classify(""), "general");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(classify("Leading HEALTHCARE provider"), "healthcare");
    }

    #[test]
    fn test_list_order_wins_over_text_order() {
        // "technology" appears first in the text, but "energy" ranks higher.
        let profile = "A technology company serving the energy industry.";
        assert_eq!(classify(profile), "energy");
    }

    #[test]
    fn test_multi_word_keyword() {
        assert_eq!(classify("Commercial Real Estate developer"), "real estate");
    }

    #[test]
    fn test_substring_match_inside_words() {
        // Substring semantics: "agtech" inside "agtech-focused" matches.
        assert_eq!(classify("An agtech-focused startup"), "agtech");
    }
}
