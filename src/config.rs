//! Run configuration: catalog credentials and pipeline settings.

use std::env;

/// Environment variable carrying the catalog access key.
pub const ACCESS_KEY_VAR: &str = "CITEMATCH_ACCESS_KEY";

/// Environment variable carrying the catalog secret key.
pub const SECRET_KEY_VAR: &str = "CITEMATCH_SECRET_KEY";

/// Default candidate cap for single-citation lookups.
pub const DEFAULT_CAP: u64 = 500;

/// Default candidate cap for batch runs; tighter because a batch pulls
/// metadata for every candidate of every citation.
pub const DEFAULT_BATCH_CAP: u64 = 150;

/// S3-style key pair for the catalog API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCredentials {
    /// Access key half of the pair.
    pub access_key: String,
    /// Secret key half of the pair.
    pub secret_key: String,
}

impl CatalogCredentials {
    /// Reads credentials from the process environment.
    ///
    /// Returns `None` unless both keys are present and non-empty; the
    /// catalog accepts anonymous search, so missing credentials are a
    /// degraded mode rather than an error.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let access_key = env::var(ACCESS_KEY_VAR).ok().filter(|v| !v.is_empty())?;
        let secret_key = env::var(SECRET_KEY_VAR).ok().filter(|v| !v.is_empty())?;
        Some(Self {
            access_key,
            secret_key,
        })
    }
}

/// Settings threaded through a pipeline run.
///
/// Built once at process start; there is no per-call reconfiguration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidate count at or above which a search is treated as too
    /// ambiguous to resolve.
    pub cap: u64,
    /// Keep non-matching rows in the output (the training-data path).
    pub all_rows: bool,
}

impl PipelineConfig {
    /// Single-citation defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cap: DEFAULT_CAP,
            all_rows: false,
        }
    }

    /// Batch-run defaults.
    #[must_use]
    pub fn for_batch() -> Self {
        Self {
            cap: DEFAULT_BATCH_CAP,
            all_rows: false,
        }
    }

    /// Overrides the candidate cap.
    #[must_use]
    pub fn with_cap(mut self, cap: u64) -> Self {
        self.cap = cap;
        self
    }

    /// Keeps all rows instead of filtering to matches.
    #[must_use]
    pub fn with_all_rows(mut self, all_rows: bool) -> Self {
        self.all_rows = all_rows;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
