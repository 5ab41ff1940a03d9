//! Tabular input/output for batch runs.
//!
//! Batch input is a CSV of citation source rows (one citation's fields per
//! row); output is a CSV of match results, or of full training rows on the
//! unfiltered path. Partition outputs with disjoint index ranges are
//! concatenable into one final table by plain row union.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::pipeline::{MatchResult, ScoredRow};
use crate::record::CitationRecord;

/// Errors from batch table input/output.
#[derive(Debug, Error)]
pub enum BatchError {
    /// CSV read/write failed
    #[error("csv error on '{path}': {source}")]
    Csv {
        /// File being read or written
        path: String,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },

    /// Requested index range does not fit the input table
    #[error(
        "invalid partition range {start}..{end} for {total} rows\n  Suggestion: Check the partition arguments against the input table size"
    )]
    BadRange {
        /// Range start (inclusive)
        start: usize,
        /// Range end (exclusive)
        end: usize,
        /// Rows available
        total: usize,
    },
}

impl BatchError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

/// A contiguous index range of the input table, end-exclusive.
///
/// Partitions are computed ahead of time so independent partitions can run
/// as separate sequential processes; there is no dynamic work distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// First row index (inclusive).
    pub start: usize,
    /// Past-the-end row index.
    pub end: usize,
}

impl Partition {
    /// Splits `total` rows into `parts` near-equal contiguous ranges.
    ///
    /// The last partition absorbs the remainder. `parts` of zero yields no
    /// partitions.
    #[must_use]
    pub fn split(total: usize, parts: usize) -> Vec<Self> {
        if parts == 0 {
            return Vec::new();
        }
        let size = total / parts;
        (0..parts)
            .map(|i| Self {
                start: i * size,
                end: if i == parts - 1 { total } else { (i + 1) * size },
            })
            .collect()
    }

    /// Number of rows in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true for an empty range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the partition's rows out of the full table.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::BadRange`] when the range does not fit.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> Result<&'a [T], BatchError> {
        rows.get(self.start..self.end).ok_or(BatchError::BadRange {
            start: self.start,
            end: self.end,
            total: rows.len(),
        })
    }
}

/// One citation source row of the batch input table.
///
/// Column names mirror the citation template's field names; `citation`
/// optionally carries the raw reference string into the output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationRow {
    /// Cited title.
    pub title: Option<String>,
    /// Family name of the first author.
    pub last: Option<String>,
    /// Given name of the first author.
    pub first: Option<String>,
    /// Family name of the first numbered author.
    pub last1: Option<String>,
    /// Given name of the first numbered author.
    pub first1: Option<String>,
    /// Family name of the second numbered author.
    pub last2: Option<String>,
    /// Given name of the second numbered author.
    pub first2: Option<String>,
    /// Cited date.
    pub date: Option<String>,
    /// Cited publisher.
    pub publisher: Option<String>,
    /// Cited source link.
    pub url: Option<String>,
    /// Raw reference string, carried into the output.
    pub citation: Option<String>,
}

impl CitationRow {
    /// Converts a source row into a citation record.
    ///
    /// The author is combined from the first/last pairs in field order,
    /// skipping absent components, mirroring the template parser.
    #[must_use]
    pub fn into_record(self) -> CitationRecord {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let author_parts: Vec<String> = [
            non_empty(self.first),
            non_empty(self.last),
            non_empty(self.first1),
            non_empty(self.last1),
            non_empty(self.first2),
            non_empty(self.last2),
        ]
        .into_iter()
        .flatten()
        .collect();
        let author = if author_parts.is_empty() {
            None
        } else {
            Some(author_parts.join(" ").trim().to_string())
        };

        CitationRecord {
            citation: self.citation.unwrap_or_default(),
            title: non_empty(self.title),
            author,
            date: non_empty(self.date),
            publisher: non_empty(self.publisher),
            url: non_empty(self.url),
        }
    }
}

/// One row of the unfiltered training output: both sides' fields, the full
/// feature vector, and the decision.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingRow {
    /// Candidate title.
    pub title_ia: Option<String>,
    /// Candidate creator.
    pub author_ia: Option<String>,
    /// Candidate publisher.
    pub publisher_ia: Option<String>,
    /// Candidate date.
    pub date_ia: Option<String>,
    /// Candidate access link.
    pub url_ia: Option<String>,
    /// Cited title.
    pub title_wiki: Option<String>,
    /// Cited author.
    pub author_wiki: Option<String>,
    /// Cited date.
    pub date_wiki: Option<String>,
    /// Cited publisher.
    pub publisher_wiki: Option<String>,
    /// Raw input citation.
    pub input_citation: String,
    /// Whole-string title similarity.
    pub title_match: Option<f64>,
    /// Whole-string author similarity.
    pub author_match: Option<f64>,
    /// Whole-string publisher similarity.
    pub publisher_match: Option<f64>,
    /// Strict year equality.
    pub year_match: Option<bool>,
    /// Year missingness indicator.
    pub year_na: u8,
    /// Author missingness indicator.
    pub author_na: u8,
    /// Publisher missingness indicator.
    pub publisher_na: u8,
    /// Partial token-sorted title similarity.
    pub title_match_partial: Option<f64>,
    /// Partial publisher similarity.
    pub publisher_match_partial: Option<f64>,
    /// Token-order-insensitive author similarity.
    pub author_sort: Option<f64>,
    /// The classifier's decision.
    pub r#match: bool,
}

impl TrainingRow {
    /// Flattens a scored row into its training columns.
    #[must_use]
    pub fn from_scored(scored: &ScoredRow) -> Self {
        Self {
            title_ia: scored.row.title_ia.clone(),
            author_ia: scored.row.author_ia.clone(),
            publisher_ia: scored.row.publisher_ia.clone(),
            date_ia: scored.row.date_ia.clone(),
            url_ia: scored.row.url_ia.clone(),
            title_wiki: scored.row.title_wiki.clone(),
            author_wiki: scored.row.author_wiki.clone(),
            date_wiki: scored.row.date_wiki.clone(),
            publisher_wiki: scored.row.publisher_wiki.clone(),
            input_citation: scored.row.input_citation.clone(),
            title_match: scored.features.title_match,
            author_match: scored.features.author_match,
            publisher_match: scored.features.publisher_match,
            year_match: scored.features.year_match,
            year_na: scored.features.year_na,
            author_na: scored.features.author_na,
            publisher_na: scored.features.publisher_na,
            title_match_partial: scored.features.title_match_partial,
            publisher_match_partial: scored.features.publisher_match_partial,
            author_sort: scored.features.author_sort,
            r#match: scored.is_match,
        }
    }
}

/// Reads the batch input table into citation records.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] when the file cannot be read or a row does
/// not deserialize.
pub fn read_citations(path: &Path) -> Result<Vec<CitationRecord>, BatchError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| BatchError::csv(path, e))?;
    let mut records = Vec::new();
    for row in reader.deserialize::<CitationRow>() {
        let row = row.map_err(|e| BatchError::csv(path, e))?;
        records.push(row.into_record());
    }
    info!(rows = records.len(), path = %path.display(), "Read citation input table");
    Ok(records)
}

/// Writes match results to a CSV output table.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] on any write failure.
pub fn write_matches(path: &Path, rows: &[MatchResult]) -> Result<(), BatchError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| BatchError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| BatchError::csv(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| BatchError::csv(path, csv::Error::from(e)))?;
    info!(rows = rows.len(), path = %path.display(), "Wrote match output table");
    Ok(())
}

/// Writes unfiltered training rows to a CSV output table.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] on any write failure.
pub fn write_training_rows(path: &Path, rows: &[TrainingRow]) -> Result<(), BatchError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| BatchError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| BatchError::csv(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| BatchError::csv(path, csv::Error::from(e)))?;
    info!(rows = rows.len(), path = %path.display(), "Wrote training output table");
    Ok(())
}

/// Reads a match output table back into rows.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] when the file cannot be read or a row does
/// not deserialize.
pub fn read_matches(path: &Path) -> Result<Vec<MatchResult>, BatchError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| BatchError::csv(path, e))?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<MatchResult>() {
        rows.push(row.map_err(|e| BatchError::csv(path, e))?);
    }
    Ok(rows)
}

/// Concatenates partition output tables into one final table by row union.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] when any input cannot be read or the output
/// cannot be written.
pub fn concat_outputs(inputs: &[impl AsRef<Path>], dest: &Path) -> Result<usize, BatchError> {
    let mut combined = Vec::new();
    for input in inputs {
        combined.extend(read_matches(input.as_ref())?);
    }
    write_matches(dest, &combined)?;
    Ok(combined.len())
}
