//! Error types for catalog retrieval operations.

use thiserror::Error;

/// Errors that can occur while querying the remote catalog.
#[derive(Debug, Clone, Error)]
pub enum RetrieveError {
    /// The remote rejected or mangled the query itself.
    ///
    /// Distinct from a clean zero-result search: titles with special
    /// characters can make the remote query malformed, and the remote then
    /// reports an unusable result shape instead of an empty one.
    #[error("catalog query failed for title '{title}': {reason}\n  Suggestion: {suggestion}")]
    QueryFailed {
        /// The search title that triggered the failure
        title: String,
        /// Why the query failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The HTTP request itself failed (network, status, or body shape)
    #[error("catalog request failed for '{context}': {reason}\n  Suggestion: Check your network connection and catalog credentials")]
    RequestFailed {
        /// What was being fetched
        context: String,
        /// Why it failed
        reason: String,
    },

    /// HTTP client construction failed
    #[error("catalog client construction failed: {reason}")]
    ClientBuild {
        /// Why construction failed
        reason: String,
    },
}

impl RetrieveError {
    /// Creates a `QueryFailed` error for a malformed remote query.
    #[must_use]
    pub fn query_failed(title: &str, reason: &str) -> Self {
        Self::QueryFailed {
            title: title.to_string(),
            reason: reason.to_string(),
            suggestion: "Check the title for special characters the remote query cannot carry"
                .to_string(),
        }
    }

    /// Creates a `RequestFailed` error.
    #[must_use]
    pub fn request_failed(context: &str, reason: &str) -> Self {
        Self::RequestFailed {
            context: context.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(reason: &str) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
        }
    }
}
