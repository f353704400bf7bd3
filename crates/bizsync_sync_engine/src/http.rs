//! HTTP remote store.
//!
//! Speaks a PostgREST-style REST dialect:
//!
//! ```text
//! GET  {base}/rest/v1/{table}?select=*&user_id=eq.{owner}&updated_at=gt.{cursor}
//! POST {base}/rest/v1/{table}?on_conflict=id
//!      Prefer: resolution=merge-duplicates
//! ```
//!
//! The actual HTTP client is abstracted via a trait to allow different
//! implementations (reqwest, ureq, a test double, etc.).

use crate::error::{SyncError, SyncResult};
use crate::remote::{Filter, RemoteQuery, RemoteStore};
use bizsync_model::Record;
use parking_lot::RwLock;
use tracing::debug;

/// An HTTP response as seen by [`HttpRemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implementations return `Err` only when no response was received
/// (connection refused, timeout, TLS failure).
pub trait HttpClient: Send + Sync {
    /// Sends a GET request.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, String>;

    /// Sends a POST request with a body.
    fn post(&self, url: &str, headers: &[(&str, &str)], body: Vec<u8>)
        -> Result<HttpResponse, String>;
}

/// Remote store over HTTP.
pub struct HttpRemoteStore<C: HttpClient> {
    /// Base URL of the service (e.g., "https://project.example.co").
    base_url: String,
    /// API key sent as `apikey`.
    api_key: String,
    /// Bearer token for the signed-in user.
    access_token: RwLock<Option<String>>,
    /// HTTP client implementation.
    client: C,
}

impl<C: HttpClient> HttpRemoteStore<C> {
    /// Creates a new HTTP remote store.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, client: C) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: RwLock::new(None),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets or clears the user's bearer token.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Builds the select URL for a query.
    pub fn query_url(&self, table: &str, query: &RemoteQuery) -> String {
        let mut url = format!("{}?select=*", self.table_url(table));
        for filter in &query.filters {
            let (column, op, value) = match filter {
                Filter::Eq { column, value } => (column, "eq", value),
                Filter::Gt { column, value } => (column, "gt", value),
            };
            url.push('&');
            url.push_str(&urlencoding::encode(column));
            url.push('=');
            url.push_str(op);
            url.push('.');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn send(
        &self,
        url: &str,
        extra: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> SyncResult<HttpResponse> {
        let bearer = self
            .access_token
            .read()
            .clone()
            .map(|token| format!("Bearer {token}"));

        let mut headers: Vec<(&str, &str)> = vec![("apikey", self.api_key.as_str())];
        if let Some(bearer) = bearer.as_deref() {
            headers.push(("Authorization", bearer));
        }
        headers.extend_from_slice(extra);

        let response = match body {
            Some(body) => self.client.post(url, &headers, body),
            None => self.client.get(url, &headers),
        }
        .map_err(SyncError::transport_retryable)?;

        if response.is_success() {
            return Ok(response);
        }

        let message = format!(
            "{} from {}: {}",
            response.status,
            url,
            String::from_utf8_lossy(&response.body)
        );
        Err(match response.status {
            408 | 429 | 500..=599 => SyncError::transport_retryable(message),
            _ => SyncError::Remote(message),
        })
    }
}

impl<C: HttpClient> RemoteStore for HttpRemoteStore<C> {
    fn query(&self, table: &str, query: &RemoteQuery) -> SyncResult<Vec<Record>> {
        let url = self.query_url(table, query);
        let response = self.send(&url, &[("Accept", "application/json")], None)?;
        let rows: Vec<Record> = serde_json::from_slice(&response.body)?;
        debug!(table, rows = rows.len(), "queried");
        Ok(rows)
    }

    fn upsert(&self, table: &str, rows: &[Record]) -> SyncResult<()> {
        let url = format!("{}?on_conflict=id", self.table_url(table));
        let body = serde_json::to_vec(rows)?;
        self.send(
            &url,
            &[
                ("Content-Type", "application/json"),
                ("Prefer", "resolution=merge-duplicates,return=minimal"),
            ],
            Some(body),
        )?;
        debug!(table, rows = rows.len(), "upserted");
        Ok(())
    }
}
