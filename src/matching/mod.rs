//! Pairwise string similarity for record matching.
//!
//! All scores are normalized-edit-distance ratios on a `[0, 100]` scale.
//! Beyond the whole-string ratio there are two structural variants and
//! their combination:
//!
//! - **Partial**: best-matching window of the longer string at the shorter
//!   string's length. Used when one field is expected to be a longer
//!   superset of the other (catalog titles tend to be more verbose than
//!   cited ones).
//! - **Sorted**: whitespace tokens sorted before comparison, tolerant of
//!   word-order differences such as reordered name components.
//!
//! Missing or empty inputs yield `None` ("not applicable"), never a low
//! score: coercing absence to zero would bias the classifier toward
//! "no match".

mod features;

pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, build_features};

/// Which similarity variant to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    /// Whole-string similarity.
    Exact,
    /// Best-substring similarity.
    Partial,
    /// Token-order-insensitive similarity.
    Sorted,
    /// Best-substring similarity after token sorting.
    PartialSorted,
}

/// Computes the similarity of two optional strings under the given mode.
///
/// Returns `None` when either input is absent or blank. Whitespace-only
/// counts as blank: it carries no tokens to compare, and token sorting
/// would collapse it to nothing.
#[must_use]
pub fn similarity(a: Option<&str>, b: Option<&str>, mode: SimilarityMode) -> Option<f64> {
    let a = a.filter(|s| !s.trim().is_empty())?;
    let b = b.filter(|s| !s.trim().is_empty())?;

    let score = match mode {
        SimilarityMode::Exact => ratio(a, b),
        SimilarityMode::Partial => partial_ratio(a, b),
        SimilarityMode::Sorted => ratio(&sort_tokens(a), &sort_tokens(b)),
        SimilarityMode::PartialSorted => partial_ratio(&sort_tokens(a), &sort_tokens(b)),
    };
    Some(score)
}

/// Whole-string normalized-edit-distance ratio in `[0, 100]`.
fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best window of the longer string at the shorter string's length.
///
/// Slides a shorter-length window over the longer string one character at a
/// time and keeps the best whole-string ratio. Equal-length inputs reduce to
/// [`ratio`].
fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    if shorter.len() == longer.len() {
        return ratio(a, b);
    }

    let needle: String = shorter.iter().collect();
    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let haystack: String = window.iter().collect();
        best = best.max(ratio(&needle, &haystack));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Rejoins the string's whitespace tokens in sorted order.
fn sort_tokens(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
