//! Data provider trait, request/result types, and fetch error types.
//!
//! The DataProvider trait abstracts over kline sources so the CLI can be
//! pointed at a different implementation and tests can stub the network.

use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters of a single klines request.
///
/// Nothing is validated locally. Values go into the query string verbatim and
/// the remote service rejects what it does not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KlineRequest {
    /// Exchange instrument identifier, e.g. `PEPEUSDT`.
    pub symbol: String,
    /// Bucket width, e.g. `1d`.
    pub interval: String,
    /// Number of buckets requested.
    pub limit: u32,
}

impl KlineRequest {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>, limit: u32) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            limit,
        }
    }
}

/// Structured error types for fetch operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("API returned HTTP {status}{}: {msg}", .code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    Api {
        status: u16,
        code: Option<i64>,
        msg: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("table construction failed: {0}")]
    Table(#[from] polars::prelude::PolarsError),
}

/// Result of a successful klines fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub request: KlineRequest,
    /// Raw 12-column table, one row per kline, in response order.
    pub frame: DataFrame,
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    pub fn row_count(&self) -> usize {
        self.frame.height()
    }
}

/// Trait for kline providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch one bounded batch of klines.
    fn fetch(&self, request: &KlineRequest) -> Result<FetchResult, DataError>;
}
