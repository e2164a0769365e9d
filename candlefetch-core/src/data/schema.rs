use polars::prelude::DataFrame;

/// Fixed 12-column layout of a Binance kline row.
pub struct KlineSchema;

impl KlineSchema {
    /// Column headers in response order, as the fetcher names them.
    pub const RAW_HEADERS: [&'static str; 12] = [
        "Open time",
        "Open",
        "High",
        "Low",
        "Close",
        "Volume",
        "Close time",
        "Quote asset volume",
        "Number of trades",
        "Taker buy base asset volume",
        "Taker buy quote asset volume",
        "Ignore",
    ];

    /// Epoch-millisecond columns, by normalized name.
    pub const DATETIME_COLUMNS: [&'static str; 2] = ["open_time", "close_time"];

    /// Price, volume, and count columns, by normalized name.
    pub const NUMERIC_COLUMNS: [&'static str; 9] = [
        "open",
        "high",
        "low",
        "close",
        "volume",
        "quote_asset_volume",
        "number_of_trades",
        "taker_buy_base_asset_volume",
        "taker_buy_quote_asset_volume",
    ];

    pub const WIDTH: usize = Self::RAW_HEADERS.len();

    /// Headers after `rename_columns`.
    pub fn normalized_headers() -> Vec<String> {
        Self::RAW_HEADERS
            .iter()
            .map(|h| super::normalize::normalize_header(h))
            .collect()
    }

    /// True if the table has the kline width and the raw header order.
    pub fn has_raw_headers(df: &DataFrame) -> bool {
        df.width() == Self::WIDTH
            && df
                .get_column_names()
                .iter()
                .zip(Self::RAW_HEADERS)
                .all(|(actual, expected)| actual.as_str() == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_headers_cover_typed_column_sets() {
        let headers = KlineSchema::normalized_headers();
        for name in KlineSchema::DATETIME_COLUMNS
            .iter()
            .chain(KlineSchema::NUMERIC_COLUMNS.iter())
        {
            assert!(headers.iter().any(|h| h == name), "missing {name}");
        }
        // Everything except `ignore` is typed by the pipeline.
        assert_eq!(
            KlineSchema::DATETIME_COLUMNS.len() + KlineSchema::NUMERIC_COLUMNS.len(),
            KlineSchema::WIDTH - 1
        );
    }

    #[test]
    fn test_normalized_headers_order() {
        let headers = KlineSchema::normalized_headers();
        assert_eq!(headers[0], "open_time");
        assert_eq!(headers[6], "close_time");
        assert_eq!(headers[9], "taker_buy_base_asset_volume");
        assert_eq!(headers[11], "ignore");
    }
}
