//! Data model for record linkage: citation records, catalog candidates,
//! and the merged rows the feature builder consumes.
//!
//! A [`CitationRecord`] is immutable once built from parsed citation fields.
//! [`CandidateRecord`]s are produced per retrieval call and discarded after
//! merging. A [`MergedRow`] is one citation joined with one candidate; the
//! row carries both sides' fields under their source suffix (`_wiki` for the
//! citation, `_ia` for the catalog item) and is normalized in place before
//! feature extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize;
use crate::parser::CITATION_SUFFIX;

/// Citation-side author field pairs, in the order they are combined.
const AUTHOR_FIELD_ORDER: [&str; 6] = ["first", "last", "first1", "last1", "first2", "last2"];

/// Structured fields parsed from one bibliographic reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// The raw citation string this record was parsed from.
    pub citation: String,
    /// Cited title; a record without one is unprocessable.
    pub title: Option<String>,
    /// Author name combined from the first/last field pairs, space-joined.
    pub author: Option<String>,
    /// Cited publication date.
    pub date: Option<String>,
    /// Cited publisher.
    pub publisher: Option<String>,
    /// Cited source link.
    pub url: Option<String>,
}

impl CitationRecord {
    /// Builds a record from namespaced parser output.
    ///
    /// The author field is combined from up to three first/last pairs in
    /// field order, skipping absent components.
    #[must_use]
    pub fn from_fields(citation: &str, fields: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| {
            fields
                .get(&format!("{key}{CITATION_SUFFIX}"))
                .filter(|v| !v.is_empty())
                .cloned()
        };

        let author_parts: Vec<String> = AUTHOR_FIELD_ORDER.iter().filter_map(|k| get(k)).collect();
        let author = if author_parts.is_empty() {
            None
        } else {
            Some(author_parts.join(" ").trim().to_string())
        };

        Self {
            citation: citation.to_string(),
            title: get("title"),
            author,
            date: get("date"),
            publisher: get("publisher"),
            url: get("url"),
        }
    }

    /// Returns true when the record has no usable title.
    #[must_use]
    pub fn is_unusable(&self) -> bool {
        self.title.as_deref().is_none_or(|t| t.trim().is_empty())
    }
}

/// One catalog item's raw metadata returned by a title search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Catalog item identifier.
    pub identifier: String,
    /// Public access link for the item.
    pub url: Option<String>,
    /// Item title.
    pub title: Option<String>,
    /// Item creator.
    pub author: Option<String>,
    /// Item publisher.
    pub publisher: Option<String>,
    /// Item publication date.
    pub date: Option<String>,
    /// Item year field; used at merge time only when `date` is absent.
    pub year: Option<String>,
}

/// One citation joined with one catalog candidate.
///
/// Field order matches the batch training output columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRow {
    /// Candidate title.
    pub title_ia: Option<String>,
    /// Candidate creator.
    pub author_ia: Option<String>,
    /// Candidate publisher.
    pub publisher_ia: Option<String>,
    /// Candidate date.
    pub date_ia: Option<String>,
    /// Candidate access link. On the shared link field the candidate side
    /// wins; the citation's own link stays under `url_wiki`.
    pub url_ia: Option<String>,
    /// Candidate identifier.
    pub identifier_ia: String,
    /// Cited title.
    pub title_wiki: Option<String>,
    /// Cited author (combined).
    pub author_wiki: Option<String>,
    /// Cited date.
    pub date_wiki: Option<String>,
    /// Cited publisher.
    pub publisher_wiki: Option<String>,
    /// Cited source link.
    pub url_wiki: Option<String>,
    /// The raw input citation string.
    pub input_citation: String,
}

impl MergedRow {
    /// Merges one citation with one candidate.
    #[must_use]
    pub fn merge(citation: &CitationRecord, candidate: CandidateRecord) -> Self {
        Self {
            title_ia: candidate.title,
            author_ia: candidate.author,
            publisher_ia: candidate.publisher,
            // Some catalog items carry only a year, no full date
            date_ia: candidate.date.or(candidate.year),
            url_ia: candidate.url,
            identifier_ia: candidate.identifier,
            title_wiki: citation.title.clone(),
            author_wiki: citation.author.clone(),
            date_wiki: citation.date.clone(),
            publisher_wiki: citation.publisher.clone(),
            url_wiki: citation.url.clone(),
            input_citation: citation.citation.clone(),
        }
    }

    /// Canonicalizes both sides' comparison fields in place.
    ///
    /// Titles are punctuation-stripped and lowercased, each author side gets
    /// its source-specific normalizer, publishers lose their editorial
    /// brackets, and the candidate date is truncated to its leading year.
    /// The access link and raw citation are left untouched for output.
    pub fn normalize(&mut self) {
        self.title_ia = normalize::normalize_title(self.title_ia.as_deref());
        self.title_wiki = normalize::normalize_title(self.title_wiki.as_deref());
        self.author_ia = normalize::normalize_catalog_author(self.author_ia.as_deref());
        self.author_wiki = normalize::normalize_citation_author(self.author_wiki.as_deref());
        self.publisher_ia = normalize::normalize_publisher(self.publisher_ia.as_deref());
        self.publisher_wiki = normalize::normalize_publisher(self.publisher_wiki.as_deref());
        self.date_ia = normalize::normalize_catalog_date(self.date_ia.as_deref());
    }
}

/// Builds one merged row per candidate, preserving retriever order.
///
/// The retriever's order is whatever the remote search returned; it carries
/// no ranking guarantee.
#[must_use]
pub fn assemble(citation: &CitationRecord, candidates: Vec<CandidateRecord>) -> Vec<MergedRow> {
    candidates
        .into_iter()
        .map(|candidate| MergedRow::merge(citation, candidate))
        .collect()
}
