//! Partitioned batch processing with outcome tallying.
//!
//! A batch run walks one contiguous index range of the citation table
//! strictly in order, one citation at a time, and accumulates match rows
//! and an outcome tally. One bad citation never aborts the partition: a
//! per-citation panic or error is caught, counted in its own tally
//! category, and the run continues. Only the tally and the accumulating
//! output collection cross citation boundaries, and both are owned here.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::batch_io::{BatchError, Partition, TrainingRow};
use crate::classifier::Classifier;
use crate::config::PipelineConfig;
use crate::record::CitationRecord;
use crate::retriever::CatalogRetriever;

use super::{MatchResult, Outcome, run_citation};

/// Progress heartbeat interval for long partitions, in citations.
const PROGRESS_LOG_INTERVAL: usize = 500;

/// Per-category outcome counts for one partition run.
///
/// The four base categories mirror the single-citation outcomes;
/// `failed` counts citations whose processing errored or panicked and
/// were skipped. Failed citations are deliberately excluded from the base
/// categories so their sum equals the number of citations that completed
/// the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Citations with no usable title (category 0).
    pub unusable: usize,
    /// Citations whose search hit the cap (category 1).
    pub cap_exceeded: usize,
    /// Citations with zero or failed retrievals (category 2).
    pub no_candidates: usize,
    /// Citations that ran to classification (category 3).
    pub success: usize,
    /// Citations skipped on an unexpected error or panic.
    pub failed: usize,
}

impl Tally {
    /// Records one citation's terminal outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::UnusableInput => self.unusable += 1,
            Outcome::CapExceeded { .. } => self.cap_exceeded += 1,
            Outcome::NoCandidates => self.no_candidates += 1,
            Outcome::Success(_) => self.success += 1,
        }
    }

    /// Total citations recorded, including skipped ones.
    #[must_use]
    pub fn total(&self) -> usize {
        self.unusable + self.cap_exceeded + self.no_candidates + self.success + self.failed
    }

    /// Sum of the four base categories (completed citations only).
    #[must_use]
    pub fn completed(&self) -> usize {
        self.unusable + self.cap_exceeded + self.no_candidates + self.success
    }

    /// Human-readable per-category summary with percentages.
    #[must_use]
    pub fn summary(&self) -> String {
        let total = self.total();
        let line = |name: &str, count: usize| {
            let percent = if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64) * 100.0
            };
            format!("{name}: {count} ({percent:.0}%)")
        };
        [
            line("no usable title", self.unusable),
            line("candidate count over cap", self.cap_exceeded),
            line("no results found", self.no_candidates),
            line("success", self.success),
            line("unexpected failure", self.failed),
        ]
        .join("\n")
    }
}

/// Everything a partition run produces.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Per-category outcome counts.
    pub tally: Tally,
    /// Match rows across the whole partition, in citation order.
    pub matches: Vec<MatchResult>,
    /// Full training rows (populated only on the all-rows path).
    pub training: Vec<TrainingRow>,
}

/// Runs one partition of the citation table through the pipeline.
///
/// Citations are processed strictly in order with no concurrency. Match
/// rows accumulate into one output collection; with `config.all_rows` the
/// unfiltered training rows accumulate as well.
///
/// # Errors
///
/// Returns [`BatchError::BadRange`] when the partition does not fit the
/// table. Per-citation faults never surface here; they land in
/// [`Tally::failed`].
#[tracing::instrument(skip_all, fields(start = partition.start, end = partition.end))]
pub async fn run_batch(
    retriever: &dyn CatalogRetriever,
    classifier: &dyn Classifier,
    records: &[CitationRecord],
    partition: Partition,
    config: &PipelineConfig,
    progress: Option<&ProgressBar>,
) -> Result<BatchOutcome, BatchError> {
    let rows = partition.slice(records)?;

    let mut outcome = BatchOutcome::default();

    for (offset, citation) in rows.iter().enumerate() {
        if offset > 0 && offset % PROGRESS_LOG_INTERVAL == 0 {
            debug!(processed = offset, of = rows.len(), "Partition progress");
        }

        let run = AssertUnwindSafe(run_citation(retriever, classifier, citation, config))
            .catch_unwind()
            .await;

        match run {
            Ok(Ok(citation_outcome)) => {
                outcome.tally.record(&citation_outcome);
                if let Outcome::Success(scored) = citation_outcome {
                    for row in &scored {
                        if row.is_match || config.all_rows {
                            outcome.matches.push(MatchResult::from_scored(row));
                        }
                        if config.all_rows {
                            outcome.training.push(TrainingRow::from_scored(row));
                        }
                    }
                }
            }
            Ok(Err(error)) => {
                warn!(
                    index = partition.start + offset,
                    error = %error,
                    "Citation processing failed; skipping"
                );
                outcome.tally.failed += 1;
            }
            Err(_panic) => {
                warn!(
                    index = partition.start + offset,
                    "Citation processing panicked; skipping"
                );
                outcome.tally.failed += 1;
            }
        }

        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    Ok(outcome)
}
