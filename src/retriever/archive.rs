//! Catalog retriever backed by an Internet Archive style search API.
//!
//! Two endpoints: an advanced-search endpoint returning matching item
//! identifiers for a scoped title query, and a per-item metadata endpoint.
//! The base URL is injectable so integration tests can point the retriever
//! at a wiremock server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CatalogCredentials;
use crate::record::CandidateRecord;

use super::{CatalogRetriever, RetrieveError, SearchOutcome};

/// Default catalog API base URL.
const DEFAULT_BASE_URL: &str = "https://archive.org";

/// Collection the title search is scoped to.
const SEARCH_COLLECTION: &str = "internetarchivebooks";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

// ==================== Catalog API response types ====================

/// Top-level advanced-search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

/// The `response` body of an advanced-search result.
///
/// `num_found` is kept as a raw JSON value: when a special character breaks
/// the remote query the count comes back as an object instead of a number,
/// and that shape is the only malformed-query signal the API gives.
#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "numFound")]
    num_found: Value,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

/// One search hit; only the identifier is requested.
#[derive(Debug, Deserialize)]
struct SearchDoc {
    identifier: String,
}

/// Top-level item metadata response.
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    metadata: serde_json::Map<String, Value>,
}

/// Pulls a metadata field that may be a string or a list of strings.
///
/// List values are comma-joined; anything else is absent.
fn pull_field(metadata: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match metadata.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(","))
            }
        }
        _ => None,
    }
}

// ==================== ArchiveRetriever ====================

/// Queries the catalog's advanced-search and metadata endpoints.
///
/// Credentials are S3-style key pairs sent as a `LOW access:secret`
/// authorization header; the client is built once and reused for every
/// request in the process.
pub struct ArchiveRetriever {
    client: Client,
    base_url: String,
}

impl ArchiveRetriever {
    /// Creates a retriever against the production catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::ClientBuild`] if HTTP client construction
    /// fails or the credentials contain header-invalid characters.
    pub fn new(credentials: Option<&CatalogCredentials>) -> Result<Self, RetrieveError> {
        Self::build(credentials, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a retriever with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_url(
        credentials: Option<&CatalogCredentials>,
        base_url: impl Into<String>,
    ) -> Result<Self, RetrieveError> {
        Self::build(credentials, base_url.into())
    }

    fn build(
        credentials: Option<&CatalogCredentials>,
        base_url: String,
    ) -> Result<Self, RetrieveError> {
        let mut headers = HeaderMap::new();
        if let Some(creds) = credentials {
            let value = format!("LOW {}:{}", creds.access_key, creds.secret_key);
            let mut value = HeaderValue::from_str(&value).map_err(|_| {
                RetrieveError::client_build("credentials contain invalid header characters")
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(concat!("citematch/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .default_headers(headers)
            .build()
            .map_err(|e| RetrieveError::client_build(&e.to_string()))?;

        Ok(Self { client, base_url })
    }
}

impl std::fmt::Debug for ArchiveRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveRetriever")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CatalogRetriever for ArchiveRetriever {
    #[tracing::instrument(skip(self), fields(title = %title, cap))]
    async fn search(&self, title: &str, cap: u64) -> Result<SearchOutcome, RetrieveError> {
        let query = format!("collection:{SEARCH_COLLECTION} AND title:{title}");
        let url = format!(
            "{}/advancedsearch.php?q={}&fl%5B%5D=identifier&rows={}&page=1&output=json",
            self.base_url,
            urlencoding::encode(&query),
            cap
        );

        debug!(api_url = %url, "Calling catalog search API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RetrieveError::request_failed(&format!("search '{title}'"), &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrieveError::request_failed(
                &format!("search '{title}'"),
                &format!("catalog returned HTTP {}", status.as_u16()),
            ));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            RetrieveError::request_failed(&format!("search '{title}'"), &e.to_string())
        })?;

        let Some(count) = body.response.num_found.as_u64() else {
            warn!(num_found = %body.response.num_found, "Catalog reported a non-numeric result count");
            return Err(RetrieveError::query_failed(
                title,
                "result count was not numeric; the query was likely malformed",
            ));
        };

        debug!(count, "Catalog search returned");

        // Cap first: with a cap of zero every count is over it, including
        // an empty result
        if count >= cap {
            return Ok(SearchOutcome::OverCap { count });
        }
        if count == 0 {
            return Ok(SearchOutcome::Empty);
        }

        let identifiers = body
            .response
            .docs
            .into_iter()
            .map(|doc| doc.identifier)
            .collect();
        Ok(SearchOutcome::Found(identifiers))
    }

    #[tracing::instrument(skip(self), fields(identifier = %identifier))]
    async fn fetch_metadata(&self, identifier: &str) -> Result<CandidateRecord, RetrieveError> {
        let url = format!(
            "{}/metadata/{}",
            self.base_url,
            urlencoding::encode(identifier)
        );

        debug!(api_url = %url, "Calling catalog metadata API");

        let response = self.client.get(&url).send().await.map_err(|e| {
            RetrieveError::request_failed(&format!("metadata/{identifier}"), &e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrieveError::request_failed(
                &format!("metadata/{identifier}"),
                &format!("catalog returned HTTP {}", status.as_u16()),
            ));
        }

        let body: MetadataResponse = response.json().await.map_err(|e| {
            RetrieveError::request_failed(&format!("metadata/{identifier}"), &e.to_string())
        })?;

        let metadata = &body.metadata;
        Ok(CandidateRecord {
            identifier: identifier.to_string(),
            url: pull_field(metadata, "identifier-access"),
            title: pull_field(metadata, "title"),
            author: pull_field(metadata, "creator"),
            publisher: pull_field(metadata, "publisher"),
            date: pull_field(metadata, "date"),
            year: pull_field(metadata, "year"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_field_string_value() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("title".to_string(), Value::String("The Eighth Land".into()));
        assert_eq!(
            pull_field(&metadata, "title").as_deref(),
            Some("The Eighth Land")
        );
    }

    #[test]
    fn test_pull_field_list_value_comma_joined() {
        let metadata: serde_json::Map<String, Value> =
            serde_json::from_str(r#"{"creator": ["Barthel, Thomas", "Martin, Anneliese"]}"#)
                .unwrap();
        assert_eq!(
            pull_field(&metadata, "creator").as_deref(),
            Some("Barthel, Thomas,Martin, Anneliese")
        );
    }

    #[test]
    fn test_pull_field_missing_or_non_string() {
        let metadata: serde_json::Map<String, Value> =
            serde_json::from_str(r#"{"pages": 400}"#).unwrap();
        assert_eq!(pull_field(&metadata, "pages"), None);
        assert_eq!(pull_field(&metadata, "absent"), None);
    }

    #[test]
    fn test_retriever_debug_hides_credentials() {
        let creds = CatalogCredentials {
            access_key: "AKIA".to_string(),
            secret_key: "sekrit".to_string(),
        };
        let retriever = ArchiveRetriever::new(Some(&creds)).unwrap();
        let debug = format!("{retriever:?}");
        assert!(!debug.contains("sekrit"), "secret must not leak via Debug");
    }
}
