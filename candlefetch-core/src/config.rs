//! Serializable fetch configuration.

use crate::data::binance::DEFAULT_BASE_URL;
use crate::data::KlineRequest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Everything needed to issue one klines request.
///
/// Loaded from TOML. Missing keys take the defaults below, which are the
/// values the tool runs with when nothing is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub symbol: String,
    pub interval: String,
    pub limit: u32,
    pub base_url: String,
    /// Request timeout in seconds. Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            symbol: "PEPEUSDT".into(),
            interval: "1d".into(),
            limit: 500,
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: None,
        }
    }
}

impl FetchConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn request(&self) -> KlineRequest {
        KlineRequest::new(self.symbol.clone(), self.interval.clone(), self.limit)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_builtin_request() {
        let config = FetchConfig::default();
        assert_eq!(config.request(), KlineRequest::new("PEPEUSDT", "1d", 500));
        assert_eq!(config.base_url, "https://api.binance.com");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = FetchConfig::from_toml(
            r#"
symbol = "BTCUSDT"
timeout_secs = 10
"#,
        )
        .unwrap();
        assert_eq!(config.symbol, "BTCUSDT");
        assert_eq!(config.interval, "1d");
        assert_eq!(config.limit, 500);
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = FetchConfig::from_toml("symbl = \"BTCUSDT\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "interval = \"4h\"\nlimit = 20").unwrap();

        let config = FetchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.request(), KlineRequest::new("PEPEUSDT", "4h", 20));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = FetchConfig::from_file(Path::new("/nonexistent/candlefetch.toml")).unwrap_err();
        match err {
            ConfigError::Io { ref path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/candlefetch.toml"));
                assert!(err.to_string().contains("/nonexistent/candlefetch.toml"));
            }
            other => panic!("expected Io error, got: {other:?}"),
        }
    }
}
