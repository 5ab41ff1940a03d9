//! Field canonicalization for cross-source metadata comparison.
//!
//! Each normalizer is a pure function over an optional field value. Absent
//! values pass through unchanged so that missingness survives normalization
//! and can be reported as a feature instead of silently becoming an empty
//! string.
//!
//! The two sources use different conventions (the catalog lists authors as
//! "Last, First" with role annotations; the citation side pre-combines
//! given/family name pairs), so each field type gets its own normalizer.

use std::sync::LazyLock;

use regex::Regex;

/// Punctuation stripped from titles before comparison.
const TITLE_PUNCTUATION: &[char] = &[
    ':', ',', ';', '\'', '"', '.', '[', ']', '!', '/', '\\', '@', '*', '#', '?', '%',
];

#[allow(clippy::expect_used)]
static ABBREVIATED_INITIAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]\.").expect("abbreviated initial regex is valid"));

#[allow(clippy::expect_used)]
static DIGITS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run regex is valid"));

#[allow(clippy::expect_used)]
static DECIMAL_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[0-9]+").expect("decimal suffix regex is valid"));

/// Role annotations removed from catalog author strings.
///
/// Ordered longest-first so "editor in chief" is removed before "editor"
/// eats its prefix.
const AUTHOR_ROLE_WORDS: &[&str] = &["editor in chief", "compiler", "author", "editor"];

/// Normalizes a title for comparison: strips punctuation, lowercases, trims.
#[must_use]
pub fn normalize_title(title: Option<&str>) -> Option<String> {
    let title = title?;
    let stripped: String = title
        .chars()
        .filter(|c| !TITLE_PUNCTUATION.contains(c))
        .collect();
    Some(stripped.to_lowercase().trim().to_string())
}

/// Normalizes a catalog-side author string ("Last, First" convention).
///
/// Parenthesized spans usually carry birth/death years and abbreviated given
/// names; when one is present the abbreviated initials are stripped first.
/// Comma-separated components are reversed so "Barthel, Thomas" compares
/// against the citation-side "thomas barthel" form. Role words, digits, and
/// bracketing punctuation are removed, and repeated tokens are deduplicated
/// preserving first-occurrence order.
#[must_use]
pub fn normalize_catalog_author(author: Option<&str>) -> Option<String> {
    let raw = author?;

    let stripped = if raw.contains('(') && raw.contains(')') {
        ABBREVIATED_INITIAL_PATTERN.replace_all(raw, "").into_owned()
    } else {
        raw.to_string()
    };
    let lowered = stripped.to_lowercase();

    let components: Vec<&str> = lowered.split(',').collect();
    let mut value = if components.len() > 1 {
        let mut reversed = components;
        reversed.reverse();
        reversed.join(" ")
    } else {
        lowered.clone()
    };

    for c in [':', '-', '[', ']', '(', ')'] {
        value = value.replace(c, "");
    }
    while value.contains("  ") {
        value = value.replace("  ", " ");
    }
    for role in AUTHOR_ROLE_WORDS {
        value = value.replace(role, "");
    }
    value = DIGITS_PATTERN.replace_all(&value, "").into_owned();
    value = value.trim().to_string();

    Some(dedup_tokens(&value))
}

/// Normalizes a citation-side author string (pre-combined name parts).
#[must_use]
pub fn normalize_citation_author(author: Option<&str>) -> Option<String> {
    let raw = author?;
    let mut value = raw.to_string();
    for c in [':', '-', '[', ']', '(', ')', '.'] {
        value = value.replace(c, "");
    }
    Some(value.to_lowercase().trim().to_string())
}

/// Normalizes a publisher string: strips square brackets only.
///
/// Catalog publishers frequently arrive wrapped in editorial brackets
/// ("[University of Hawaii]"); everything else is left intact.
#[must_use]
pub fn normalize_publisher(publisher: Option<&str>) -> Option<String> {
    let raw = publisher?;
    Some(raw.replace(['[', ']'], ""))
}

/// Normalizes a catalog date to a leading year.
///
/// Catalog dates are usually ISO-ish ("1974-01-01"); anything longer than
/// four characters is truncated to its first four.
#[must_use]
pub fn normalize_catalog_date(date: Option<&str>) -> Option<String> {
    let raw = date?;
    if raw.chars().count() > 4 {
        Some(raw.chars().take(4).collect())
    } else {
        Some(raw.to_string())
    }
}

/// Extracts a year as an integer from a free-form date string.
///
/// Returns `None` when the string carries no digits at all, or when no
/// digits remain after stripping decimal fractions and periods.
#[must_use]
pub fn extract_year(date: Option<&str>) -> Option<i64> {
    let raw = date?;
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let stripped = DECIMAL_SUFFIX_PATTERN.replace_all(raw, "");
    let stripped = stripped.replace('.', "");
    let digits: String = stripped.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Removes repeated whitespace-separated tokens, keeping the first
/// occurrence of each in its original position.
///
/// Catalog author strings often repeat a name once per role ("smith john
/// smith john"); dedup collapses those without reordering the surviving
/// tokens.
#[must_use]
pub fn dedup_tokens(value: &str) -> String {
    let mut seen = Vec::new();
    for token in value.split_whitespace() {
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen.join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_strips_punctuation_and_lowercases() {
        let title = normalize_title(Some("The Eighth Land: The Polynesian Settlement!"));
        assert_eq!(
            title.as_deref(),
            Some("the eighth land the polynesian settlement")
        );
    }

    #[test]
    fn test_normalize_title_missing_passes_through() {
        assert_eq!(normalize_title(None), None);
    }

    #[test]
    fn test_normalize_title_is_idempotent() {
        let once = normalize_title(Some("Easter Island: Island of Enigmas")).unwrap();
        let twice = normalize_title(Some(&once)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_title_never_reintroduces_stripped_characters() {
        let normalized =
            normalize_title(Some("What? A #strange% title; [brackets] / slashes\\")).unwrap();
        for c in TITLE_PUNCTUATION {
            assert!(
                !normalized.contains(*c),
                "normalized title still contains '{c}': {normalized}"
            );
        }
    }

    #[test]
    fn test_normalize_catalog_author_reverses_last_first() {
        let author = normalize_catalog_author(Some("Barthel, Thomas"));
        assert_eq!(author.as_deref(), Some("thomas barthel"));
    }

    #[test]
    fn test_normalize_catalog_author_strips_initials_in_parenthesized_form() {
        // Parenthesized span triggers abbreviated-initial stripping
        let author = normalize_catalog_author(Some("Churchill, William W. (1859-1920)"));
        assert_eq!(author.as_deref(), Some("william churchill"));
    }

    #[test]
    fn test_normalize_catalog_author_removes_role_words_and_digits() {
        let author = normalize_catalog_author(Some("Smith, Jane editor 1920"));
        assert_eq!(author.as_deref(), Some("jane smith"));
    }

    #[test]
    fn test_normalize_catalog_author_removes_editor_in_chief_whole() {
        let author = normalize_catalog_author(Some("Doe, John editor in chief"));
        assert_eq!(author.as_deref(), Some("john doe"));
    }

    #[test]
    fn test_normalize_catalog_author_single_component_kept_as_is() {
        let author = normalize_catalog_author(Some("Voltaire"));
        assert_eq!(author.as_deref(), Some("voltaire"));
    }

    #[test]
    fn test_normalize_catalog_author_dedups_repeated_tokens_in_order() {
        let author = normalize_catalog_author(Some("smith john smith"));
        assert_eq!(author.as_deref(), Some("smith john"));
    }

    #[test]
    fn test_normalize_catalog_author_missing_passes_through() {
        assert_eq!(normalize_catalog_author(None), None);
    }

    #[test]
    fn test_normalize_citation_author_strips_punctuation() {
        let author = normalize_citation_author(Some("Barthel Thomas S."));
        assert_eq!(author.as_deref(), Some("barthel thomas s"));
    }

    #[test]
    fn test_normalize_citation_author_missing_passes_through() {
        assert_eq!(normalize_citation_author(None), None);
    }

    #[test]
    fn test_normalize_publisher_strips_brackets_only() {
        let publisher = normalize_publisher(Some("[University of Hawaii]"));
        assert_eq!(publisher.as_deref(), Some("University of Hawaii"));
    }

    #[test]
    fn test_normalize_publisher_missing_passes_through() {
        assert_eq!(normalize_publisher(None), None);
    }

    #[test]
    fn test_normalize_catalog_date_truncates_long_dates() {
        assert_eq!(
            normalize_catalog_date(Some("1974-01-01")).as_deref(),
            Some("1974")
        );
    }

    #[test]
    fn test_normalize_catalog_date_short_values_unchanged() {
        assert_eq!(
            normalize_catalog_date(Some("1974")).as_deref(),
            Some("1974")
        );
        assert_eq!(normalize_catalog_date(None), None);
    }

    #[test]
    fn test_extract_year_plain() {
        assert_eq!(extract_year(Some("1974")), Some(1974));
    }

    #[test]
    fn test_extract_year_strips_decimal_suffix() {
        assert_eq!(extract_year(Some("1974.0")), Some(1974));
    }

    #[test]
    fn test_extract_year_no_digits_is_missing() {
        assert_eq!(extract_year(Some("circa unknown")), None);
        assert_eq!(extract_year(None), None);
    }

    #[test]
    fn test_dedup_tokens_preserves_first_occurrence_order() {
        assert_eq!(dedup_tokens("b a b c a"), "b a c");
    }
}
