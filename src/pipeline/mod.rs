//! Pipeline orchestration for one citation.
//!
//! One citation flows PARSE → RETRIEVE → NORMALIZE → FEATURIZE → CLASSIFY →
//! FILTER → REPORT. Retrieval has three non-success exits (no results, too
//! many results, malformed query); each maps to a terminal [`Outcome`]
//! category the batch layer tallies.
//!
//! Per-citation fault policy: unusable input, a hit cap, and empty or
//! failed retrievals are recovered here and reported as outcomes. Anything
//! else is a [`PipelineError`] — the single-citation caller sees it, the
//! batch layer catches and tallies it.

pub mod batch;

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::config::PipelineConfig;
use crate::matching::{FeatureVector, build_features};
use crate::normalize::normalize_title;
use crate::parser::{ParseError, parse_cite_book};
use crate::record::{CitationRecord, MergedRow, assemble};
use crate::retriever::{CatalogRetriever, RetrieveError, SearchOutcome};

/// Unexpected faults in a citation's pipeline run.
///
/// Recoverable conditions (no title, cap hit, empty/failed retrieval) are
/// [`Outcome`] categories, not errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The citation string could not be parsed at all
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Terminal outcome of one citation's pipeline run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Citation has no usable title (category 0).
    UnusableInput,
    /// Candidate count at or above the cap (category 1); too ambiguous to
    /// resolve without raising the cap.
    CapExceeded {
        /// The reported candidate count.
        count: u64,
    },
    /// Zero results, or a retrieval failure treated identically for
    /// reporting (category 2).
    NoCandidates,
    /// Pipeline ran to completion (category 3), with zero or more scored
    /// rows.
    Success(Vec<ScoredRow>),
}

/// One merged row with its features and classification.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    /// The normalized merged row.
    pub row: MergedRow,
    /// The computed feature vector.
    pub features: FeatureVector,
    /// The classifier's decision.
    pub is_match: bool,
}

/// One classified candidate, reduced to the reporting columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Candidate title (normalized).
    pub title_ia: Option<String>,
    /// Candidate creator (normalized).
    pub author_ia: Option<String>,
    /// Candidate publisher (normalized).
    pub publisher_ia: Option<String>,
    /// Candidate date (normalized to year).
    pub date_ia: Option<String>,
    /// Candidate access link.
    pub url_ia: Option<String>,
    /// The raw input citation string.
    pub input_citation: String,
    /// The classifier's decision.
    pub r#match: bool,
}

impl MatchResult {
    /// Reduces a scored row to the reporting columns.
    #[must_use]
    pub fn from_scored(scored: &ScoredRow) -> Self {
        Self {
            title_ia: scored.row.title_ia.clone(),
            author_ia: scored.row.author_ia.clone(),
            publisher_ia: scored.row.publisher_ia.clone(),
            date_ia: scored.row.date_ia.clone(),
            url_ia: scored.row.url_ia.clone(),
            input_citation: scored.row.input_citation.clone(),
            r#match: scored.is_match,
        }
    }
}

/// Runs one parsed citation through the pipeline.
///
/// # Errors
///
/// Currently infallible beyond the recoverable outcomes; the `Result`
/// shape matches [`get_match`] so the batch layer has one catch point.
#[tracing::instrument(skip_all, fields(title = ?citation.title))]
pub async fn run_citation(
    retriever: &dyn CatalogRetriever,
    classifier: &dyn Classifier,
    citation: &CitationRecord,
    config: &PipelineConfig,
) -> Result<Outcome, PipelineError> {
    if citation.is_unusable() {
        warn!("Citation has no usable title");
        return Ok(Outcome::UnusableInput);
    }

    let Some(search_title) = normalize_title(citation.title.as_deref()) else {
        warn!("Citation has no usable title");
        return Ok(Outcome::UnusableInput);
    };

    let identifiers = match retriever.search(&search_title, config.cap).await {
        Ok(SearchOutcome::Empty) => {
            info!("Catalog search returned no results");
            return Ok(Outcome::NoCandidates);
        }
        Ok(SearchOutcome::OverCap { count }) => {
            warn!(count, cap = config.cap, "Candidate count reached the cap");
            return Ok(Outcome::CapExceeded { count });
        }
        Ok(SearchOutcome::Found(identifiers)) => identifiers,
        Err(RetrieveError::QueryFailed { .. }) => {
            // Conflated with the zero-result category for reporting; the
            // distinct log line is the only place the difference survives.
            warn!(title = %search_title, "Catalog query was malformed; treating as no candidates");
            return Ok(Outcome::NoCandidates);
        }
        Err(error) => {
            warn!(error = %error, "Catalog search failed; treating as no candidates");
            return Ok(Outcome::NoCandidates);
        }
    };

    debug!(candidates = identifiers.len(), "Fetching candidate metadata");

    let mut candidates = Vec::with_capacity(identifiers.len());
    for identifier in &identifiers {
        match retriever.fetch_metadata(identifier).await {
            Ok(candidate) => candidates.push(candidate),
            Err(error) => {
                // One unreadable item abandons the citation, not the batch.
                warn!(identifier = %identifier, error = %error, "Candidate metadata fetch failed; treating as no candidates");
                return Ok(Outcome::NoCandidates);
            }
        }
    }

    let mut scored = Vec::with_capacity(candidates.len());
    for mut row in assemble(citation, candidates) {
        row.normalize();
        let features = build_features(&row);
        let is_match = classifier.predict(&features);
        scored.push(ScoredRow {
            row,
            features,
            is_match,
        });
    }

    let matches = scored.iter().filter(|s| s.is_match).count();
    info!(
        rows = scored.len(),
        matches, "Citation classified against candidates"
    );
    Ok(Outcome::Success(scored))
}

/// Looks up one raw citation string and returns its qualifying matches.
///
/// Returns `Ok(None)` when the citation is unusable, the search hit the
/// cap or found nothing, or no candidate classified as a match (unless
/// `config.all_rows` keeps every row). The returned map is keyed
/// `match1..matchN` in candidate order.
///
/// # Errors
///
/// Returns [`PipelineError`] for faults outside the recoverable outcome
/// categories, such as an unparseable citation template.
#[tracing::instrument(skip_all)]
pub async fn get_match(
    retriever: &dyn CatalogRetriever,
    classifier: &dyn Classifier,
    cite_string: &str,
    config: &PipelineConfig,
) -> Result<Option<BTreeMap<String, MatchResult>>, PipelineError> {
    let start = Instant::now();

    let fields = parse_cite_book(cite_string)?;
    let citation = CitationRecord::from_fields(cite_string, &fields);

    let outcome = run_citation(retriever, classifier, &citation, config).await?;
    let scored = match outcome {
        Outcome::UnusableInput => {
            info!("No usable title; returning no result");
            return Ok(None);
        }
        Outcome::CapExceeded { count } => {
            info!(count, "Too many candidates; returning no result");
            return Ok(None);
        }
        Outcome::NoCandidates => {
            info!("No candidates; returning no result");
            return Ok(None);
        }
        Outcome::Success(scored) => scored,
    };

    let matches = scored.iter().filter(|s| s.is_match).count();
    if matches == 0 && !config.all_rows {
        info!("There were no matches present");
        return Ok(None);
    }

    let results: BTreeMap<String, MatchResult> = scored
        .iter()
        .filter(|s| s.is_match || config.all_rows)
        .enumerate()
        .map(|(i, s)| (format!("match{}", i + 1), MatchResult::from_scored(s)))
        .collect();

    info!(
        matches,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Success; returning results"
    );
    Ok(Some(results))
}
