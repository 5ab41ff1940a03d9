//! Catalog retrieval boundary.
//!
//! The core pipeline talks to the digital-library catalog through the
//! [`CatalogRetriever`] trait: search items by normalized title, fetch one
//! item's metadata. The search contract distinguishes three non-success
//! outcomes the orchestrator reports separately: a clean zero-result search,
//! a result count at or above the caller's cap (backpressure against
//! unbounded result pulls), and a malformed remote query.
//!
//! [`ArchiveRetriever`] is the production implementation; tests substitute
//! their own trait impls.

mod archive;
mod error;

pub use archive::ArchiveRetriever;
pub use error::RetrieveError;

use async_trait::async_trait;

use crate::record::CandidateRecord;

/// Result of a capped title search against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query matched nothing.
    Empty,
    /// The query matched at or above the cap; too ambiguous to resolve.
    OverCap {
        /// The reported result count.
        count: u64,
    },
    /// Candidate item identifiers, in the order the catalog returned them.
    Found(Vec<String>),
}

/// Searches the catalog and fetches per-item metadata.
///
/// Object-safe via `async_trait` so the orchestrator can hold a
/// `dyn CatalogRetriever` and tests can inject deterministic fakes.
#[async_trait]
pub trait CatalogRetriever: Send + Sync {
    /// Searches the catalog for items matching a normalized title.
    ///
    /// `cap` bounds the acceptable result count; at or above it the search
    /// reports [`SearchOutcome::OverCap`] without pulling identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::QueryFailed`] when the remote reports an
    /// unusable result shape (typically a special character breaking the
    /// query), or [`RetrieveError::RequestFailed`] for transport failures.
    async fn search(&self, title: &str, cap: u64) -> Result<SearchOutcome, RetrieveError>;

    /// Fetches one catalog item's raw metadata.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::RequestFailed`] when the item metadata
    /// cannot be fetched or decoded.
    async fn fetch_metadata(&self, identifier: &str) -> Result<CandidateRecord, RetrieveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_outcome_over_cap_carries_count() {
        let outcome = SearchOutcome::OverCap { count: 512 };
        assert_eq!(outcome, SearchOutcome::OverCap { count: 512 });
        assert_ne!(outcome, SearchOutcome::Empty);
    }

    #[test]
    fn test_search_outcome_found_preserves_order() {
        let outcome = SearchOutcome::Found(vec!["b".to_string(), "a".to_string()]);
        let SearchOutcome::Found(ids) = outcome else {
            panic!("expected Found");
        };
        assert_eq!(ids, vec!["b", "a"]);
    }
}
