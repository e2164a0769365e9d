//! Kline fetching and normalization

pub mod binance;
pub mod normalize;
pub mod provider;
pub mod schema;

pub use binance::{parse_klines, BinanceProvider};
pub use normalize::{
    convert_to_datetime, convert_to_numeric, normalize_header, normalize_klines, rename_columns,
    NormalizeError,
};
pub use provider::{DataError, DataProvider, FetchResult, KlineRequest};
pub use schema::KlineSchema;
