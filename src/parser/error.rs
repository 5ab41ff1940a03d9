//! Error types for citation template parsing.

use thiserror::Error;

/// Errors that can occur while parsing a templated citation string.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A template fragment had no `key=value` separator
    #[error("citation fragment '{fragment}' has no '=' separator\n  Suggestion: {suggestion}")]
    MissingSeparator {
        /// The fragment that could not be split
        fragment: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The input had no template fragments at all
    #[error(
        "citation string '{preview}' contains no '|'-delimited fields\n  Suggestion: Pass a templated citation such as '{{{{cite book |title=... }}}}'"
    )]
    NoFields {
        /// Truncated input for display
        preview: String,
    },
}

impl ParseError {
    /// Creates a `MissingSeparator` error for a fragment without `=`.
    #[must_use]
    pub fn missing_separator(fragment: &str) -> Self {
        Self::MissingSeparator {
            fragment: fragment.to_string(),
            suggestion: "Check the citation for stray '|' delimiters".to_string(),
        }
    }

    /// Creates a `NoFields` error for input without any delimiter.
    #[must_use]
    pub fn no_fields(input: &str) -> Self {
        Self::NoFields {
            preview: input.chars().take(60).collect(),
        }
    }
}
