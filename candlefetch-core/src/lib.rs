//! candlefetch core: Binance kline fetcher, kline table schema, column normalizers.
//!
//! This crate contains the whole data path:
//! - Request and result types for a single klines call
//! - A blocking Binance REST provider that builds a 12-column `polars` table
//! - Three stateless normalizers (header renaming, epoch-ms datetimes, numerics)
//! - TOML-backed fetch configuration

pub mod config;
pub mod data;

pub use config::{ConfigError, FetchConfig};
pub use data::{
    convert_to_datetime, convert_to_numeric, normalize_klines, rename_columns, BinanceProvider,
    DataError, DataProvider, FetchResult, KlineRequest, KlineSchema, NormalizeError,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<KlineRequest>();
        require_sync::<KlineRequest>();
        require_send::<FetchResult>();
        require_sync::<FetchResult>();
        require_send::<FetchConfig>();
        require_sync::<FetchConfig>();
        require_send::<BinanceProvider>();
        require_sync::<BinanceProvider>();
        require_send::<DataError>();
        require_sync::<DataError>();
        require_send::<NormalizeError>();
        require_sync::<NormalizeError>();
    }
}
