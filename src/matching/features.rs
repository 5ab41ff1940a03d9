//! Fixed-schema feature vector computed from one merged row.
//!
//! The classifier was trained on exactly these ten features in exactly this
//! order; both the count and the order are load-bearing and must never
//! change without retraining the model artifact.

use serde::Serialize;

use crate::normalize::extract_year;
use crate::record::MergedRow;

use super::{SimilarityMode, similarity};

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 10;

/// Feature names in trained order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "title_match",
    "author_match",
    "publisher_match",
    "year_match",
    "year_na",
    "author_na",
    "publisher_na",
    "title_match_partial",
    "publisher_match_partial",
    "author_sort",
];

/// The ten-value similarity/missingness summary of a merged row.
///
/// Similarity fields are `None` when either side of the comparison is
/// absent; the `*_na` indicators carry that missingness as an explicit
/// 0/1 feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Whole-string title similarity.
    pub title_match: Option<f64>,
    /// Whole-string author similarity.
    pub author_match: Option<f64>,
    /// Whole-string publisher similarity.
    pub publisher_match: Option<f64>,
    /// Strict numeric year equality.
    pub year_match: Option<bool>,
    /// 1 when either side's year is absent.
    pub year_na: u8,
    /// 1 when either side's author is absent.
    pub author_na: u8,
    /// 1 when either side's publisher is absent.
    pub publisher_na: u8,
    /// Partial token-sorted title similarity; the catalog title is usually
    /// more verbose than the cited one.
    pub title_match_partial: Option<f64>,
    /// Partial publisher similarity, same reasoning.
    pub publisher_match_partial: Option<f64>,
    /// Token-order-insensitive author similarity.
    pub author_sort: Option<f64>,
}

impl FeatureVector {
    /// Returns the features as numeric values in trained order.
    ///
    /// `year_match` maps to 1.0/0.0; `None` stays `None` for the
    /// classifier's imputation step.
    #[must_use]
    pub fn to_values(&self) -> [Option<f64>; FEATURE_COUNT] {
        [
            self.title_match,
            self.author_match,
            self.publisher_match,
            self.year_match.map(|m| if m { 1.0 } else { 0.0 }),
            Some(f64::from(self.year_na)),
            Some(f64::from(self.author_na)),
            Some(f64::from(self.publisher_na)),
            self.title_match_partial,
            self.publisher_match_partial,
            self.author_sort,
        ]
    }
}

fn na_indicator(a: Option<&str>, b: Option<&str>) -> u8 {
    let missing = |v: Option<&str>| v.is_none_or(|s| s.trim().is_empty());
    u8::from(missing(a) || missing(b))
}

/// Computes the feature vector for one normalized merged row.
#[must_use]
pub fn build_features(row: &MergedRow) -> FeatureVector {
    let title_ia = row.title_ia.as_deref();
    let title_wiki = row.title_wiki.as_deref();
    let author_ia = row.author_ia.as_deref();
    let author_wiki = row.author_wiki.as_deref();
    let publisher_ia = row.publisher_ia.as_deref();
    let publisher_wiki = row.publisher_wiki.as_deref();

    let year_ia = extract_year(row.date_ia.as_deref());
    let year_wiki = extract_year(row.date_wiki.as_deref());
    let year_match = match (year_ia, year_wiki) {
        (Some(a), Some(b)) => Some(a == b),
        _ => None,
    };

    FeatureVector {
        title_match: similarity(title_ia, title_wiki, SimilarityMode::Exact),
        author_match: similarity(author_ia, author_wiki, SimilarityMode::Exact),
        publisher_match: similarity(publisher_ia, publisher_wiki, SimilarityMode::Exact),
        year_match,
        year_na: u8::from(year_ia.is_none() || year_wiki.is_none()),
        author_na: na_indicator(author_ia, author_wiki),
        publisher_na: na_indicator(publisher_ia, publisher_wiki),
        title_match_partial: similarity(title_wiki, title_ia, SimilarityMode::PartialSorted),
        publisher_match_partial: similarity(publisher_wiki, publisher_ia, SimilarityMode::Partial),
        author_sort: similarity(author_ia, author_wiki, SimilarityMode::Sorted),
    }
}
