//! Binance spot klines provider.
//!
//! Issues one blocking GET against `/api/v3/klines` and turns the
//! array-of-arrays response into a 12-column table. No retry, no pagination,
//! no timeout unless one is configured.

use super::provider::{DataError, DataProvider, FetchResult, KlineRequest};
use super::schema::KlineSchema;
use crate::config::FetchConfig;
use polars::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Binance error body, e.g. `{"code":-1121,"msg":"Invalid symbol."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// Binance REST provider.
pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceProvider {
    /// Provider against the public endpoint with no request timeout.
    pub fn new() -> Result<Self, DataError> {
        Self::from_config(&FetchConfig::default())
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, DataError> {
        // The blocking client defaults to a 30s timeout; `None` disables it.
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the klines URL. Parameters are interpolated without encoding.
    pub fn klines_url(&self, request: &KlineRequest) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, request.symbol, request.interval, request.limit
        )
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> DataError {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) => DataError::Api {
                status: status.as_u16(),
                code: Some(err.code),
                msg: err.msg,
            },
            Err(_) => DataError::Api {
                status: status.as_u16(),
                code: None,
                msg: match body.trim() {
                    "" => status.canonical_reason().unwrap_or("no body").to_string(),
                    text => text.to_string(),
                },
            },
        }
    }
}

impl DataProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance_spot"
    }

    fn fetch(&self, request: &KlineRequest) -> Result<FetchResult, DataError> {
        let url = self.klines_url(request);
        debug!(%url, "requesting klines");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::Network(format!("reading body: {e}")))?;

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| DataError::MalformedResponse(format!("body is not JSON: {e}")))?;
        let frame = parse_klines(value)?;

        info!(
            symbol = %request.symbol,
            interval = %request.interval,
            limit = request.limit,
            rows = frame.height(),
            "klines fetched"
        );

        Ok(FetchResult {
            request: request.clone(),
            frame,
            fetched_at: chrono::Utc::now(),
        })
    }
}

/// Physical type chosen for a raw column. Ordered by how much it can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CellKind {
    Int,
    Float,
    Text,
}

fn cell_kind(value: &Value) -> Option<CellKind> {
    match value {
        Value::Null => None,
        Value::Number(n) if n.is_i64() => Some(CellKind::Int),
        Value::Number(_) => Some(CellKind::Float),
        _ => Some(CellKind::Text),
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Build one raw column from the cells at the same position in every row.
fn build_column(name: &str, cells: &[&Value]) -> Column {
    let kind = cells.iter().filter_map(|v| cell_kind(v)).max();

    match kind {
        Some(CellKind::Int) => {
            let values: Vec<Option<i64>> = cells.iter().map(|v| v.as_i64()).collect();
            Column::new(name.into(), values)
        }
        Some(CellKind::Float) => {
            let values: Vec<Option<f64>> = cells.iter().map(|v| v.as_f64()).collect();
            Column::new(name.into(), values)
        }
        // Empty and all-null columns are kept as text, like any untyped cell.
        Some(CellKind::Text) | None => {
            let values: Vec<Option<String>> = cells.iter().map(|v| cell_text(v)).collect();
            Column::new(name.into(), values)
        }
    }
}

/// Convert a klines response body into the raw 12-column table.
///
/// The top-level value must be an array, and every element an array of
/// exactly 12 scalars. Row order is kept as returned.
pub fn parse_klines(value: Value) -> Result<DataFrame, DataError> {
    let rows = match value {
        Value::Array(rows) => rows,
        other => {
            return Err(DataError::MalformedResponse(format!(
                "expected an array of klines, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut table: Vec<Vec<Value>> = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let fields = match row {
            Value::Array(fields) => fields,
            other => {
                return Err(DataError::MalformedResponse(format!(
                    "kline {i} is {}, expected an array",
                    json_kind(&other)
                )))
            }
        };
        if fields.len() != KlineSchema::WIDTH {
            return Err(DataError::MalformedResponse(format!(
                "kline {i} has {} fields, expected {}",
                fields.len(),
                KlineSchema::WIDTH
            )));
        }
        if let Some(pos) = fields
            .iter()
            .position(|f| matches!(f, Value::Array(_) | Value::Object(_)))
        {
            return Err(DataError::MalformedResponse(format!(
                "kline {i} field {pos} is not a scalar"
            )));
        }
        table.push(fields);
    }

    let columns: Vec<Column> = KlineSchema::RAW_HEADERS
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let cells: Vec<&Value> = table.iter().map(|row| &row[j]).collect();
            build_column(name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
