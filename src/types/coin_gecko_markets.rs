use serde_json::{Map, Value};

/// One listing row as returned by the markets endpoint. Kept untyped: the
/// API returns far more fields than survive the transform, and deciding
/// which ones matter is the transformer's job, not the fetcher's.
pub type CoinGeckoMarketRecord = Map<String, Value>;
