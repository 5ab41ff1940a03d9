//! Citation Matching Library
//!
//! This library links encyclopedia book citations to digital-library
//! catalog records: parse a citation template, search the catalog for
//! candidate items, normalize both sides into a comparable shape, score
//! a similarity feature vector per candidate, and classify each pair as
//! a match or not.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Citation template parsing into keyed fields
//! - [`record`] - Citation and candidate record shapes, row assembly
//! - [`normalize`] - Field normalization for titles, authors, publishers, dates
//! - [`retriever`] - Catalog search and metadata retrieval over HTTP
//! - [`matching`] - String similarity modes and feature vector construction
//! - [`classifier`] - Pretrained linear match classifier
//! - [`pipeline`] - Single-citation orchestration and partitioned batch runs
//! - [`batch_io`] - Tabular input/output and index partitioning

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch_io;
pub mod classifier;
pub mod config;
pub mod matching;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod retriever;

// Re-export commonly used types
pub use batch_io::{BatchError, Partition, read_citations, write_matches};
pub use classifier::{Classifier, ClassifierError, LinearModel};
pub use config::{CatalogCredentials, DEFAULT_BATCH_CAP, DEFAULT_CAP, PipelineConfig};
pub use matching::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, SimilarityMode, build_features};
pub use parser::{ParseError, parse_cite_book, parse_citation};
pub use pipeline::batch::{BatchOutcome, Tally, run_batch};
pub use pipeline::{MatchResult, Outcome, PipelineError, ScoredRow, get_match, run_citation};
pub use record::{CandidateRecord, CitationRecord, MergedRow, assemble};
pub use retriever::{ArchiveRetriever, CatalogRetriever, RetrieveError, SearchOutcome};
