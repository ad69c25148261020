use serde::{Deserialize, Serialize};
use sqlx::{types::BigDecimal, FromRow};

/// Load-ready market snapshot row. `last_updated` stays the encoded text
/// produced by the transform; the loader never interprets it.
#[derive(Debug, Clone, PartialEq, FromRow, Deserialize, Serialize)]
pub struct DailyCryptoMetric {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: BigDecimal,
    pub market_cap: i64,
    pub total_volume: i64,
    pub price_change_24h: BigDecimal,
    pub last_updated: String,
}
