use std::collections::HashSet;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::DailyCryptoMetric,
    provider::{DatabasePool, HTTP},
    types::CoinGeckoMarketRecord,
};

/// One full extract-transform-load pass. The steps run strictly in
/// sequence; any error aborts the run before the next step starts.
pub async fn run(app_state: AppState<State>) -> Result<u64, Error> {
    let records = fetch_listings(&app_state.http).await?;
    info!("fetched {} market records", records.len());

    let timestamp = Utc::now();
    let metrics = transform(&records, timestamp)?;

    let loaded = load(&app_state.database, &metrics).await?;
    info!("successfully loaded {} records", loaded);

    Ok(loaded)
}

pub async fn fetch_listings(
    http: &HTTP,
) -> Result<Vec<CoinGeckoMarketRecord>, Error> {
    http.get_coingecko_markets().await
}

/// Projects every raw record onto the metric shape and stamps the whole
/// batch with one shared timestamp. A record missing a required field or
/// repeating an id fails the batch.
pub fn transform(
    records: &[CoinGeckoMarketRecord],
    timestamp: DateTime<Utc>,
) -> Result<Vec<DailyCryptoMetric>, Error> {
    let last_updated = timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);

    let mut seen = HashSet::new();
    let mut metrics = Vec::with_capacity(records.len());

    for record in records {
        let metric = transform_record(record, &last_updated)?;

        if !seen.insert(metric.id.to_owned()) {
            return Err(Error::DuplicateField(format!("id {}", metric.id)));
        }

        metrics.push(metric);
    }

    Ok(metrics)
}

/// Loads the batch into `daily_crypto_metrics`, fully replacing the
/// previous one. An empty batch short-circuits without touching the
/// table, so an empty extract never wipes existing data. The three
/// statements run without a surrounding transaction.
pub async fn load(
    database: &DatabasePool,
    records: &Vec<DailyCryptoMetric>,
) -> Result<u64, Error> {
    if records.is_empty() {
        info!("no records to load");
        return Ok(0);
    }

    let table = &database.daily_crypto_metrics;

    table.create_table().await?;
    table.truncate().await?;
    info!("table daily_crypto_metrics truncated");

    table.insert_many(records).await?;

    Ok(records.len() as u64)
}

fn transform_record(
    record: &CoinGeckoMarketRecord,
    last_updated: &str,
) -> Result<DailyCryptoMetric, Error> {
    Ok(DailyCryptoMetric {
        id: text_field(record, "id")?,
        symbol: text_field(record, "symbol")?,
        name: text_field(record, "name")?,
        current_price: decimal_field(record, "current_price")?,
        market_cap: integer_field(record, "market_cap")?,
        total_volume: integer_field(record, "total_volume")?,
        price_change_24h: decimal_field(record, "price_change_percentage_24h")?,
        last_updated: last_updated.to_owned(),
    })
}

fn raw_field<'a>(
    record: &'a CoinGeckoMarketRecord,
    field: &str,
) -> Result<&'a Value, Error> {
    record
        .get(field)
        .ok_or_else(|| Error::FieldNotExist(field.to_owned()))
}

fn text_field(
    record: &CoinGeckoMarketRecord,
    field: &str,
) -> Result<String, Error> {
    match raw_field(record, field)? {
        Value::String(value) => Ok(value.to_owned()),
        value => Err(Error::InvalidField(format!("{}: {}", field, value))),
    }
}

// Null numeric values collapse to zero. Text fields never do.
fn decimal_field(
    record: &CoinGeckoMarketRecord,
    field: &str,
) -> Result<BigDecimal, Error> {
    match raw_field(record, field)? {
        Value::Null => Ok(BigDecimal::from(0)),
        Value::Number(value) => Ok(BigDecimal::from_str(&value.to_string())?),
        value => Err(Error::InvalidField(format!("{}: {}", field, value))),
    }
}

// The fill has to happen before the cast, and the cast truncates toward
// zero rather than rounding.
fn integer_field(
    record: &CoinGeckoMarketRecord,
    field: &str,
) -> Result<i64, Error> {
    let value = decimal_field(record, field)?;

    value
        .with_scale_round(0, RoundingMode::Down)
        .to_i64()
        .ok_or_else(|| Error::InvalidField(format!("{}: {}", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Config;
    use serde_json::json;

    const REQUIRED_FIELDS: [&str; 7] = [
        "id",
        "symbol",
        "name",
        "current_price",
        "market_cap",
        "total_volume",
        "price_change_percentage_24h",
    ];

    fn record(value: Value) -> CoinGeckoMarketRecord {
        value
            .as_object()
            .expect("test record must be a JSON object")
            .to_owned()
    }

    fn bitcoin() -> CoinGeckoMarketRecord {
        record(json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": 65000.5,
            "market_cap": 1280000000000.7,
            "total_volume": null,
            "price_change_percentage_24h": null,
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "market_cap_rank": 1
        }))
    }

    #[test]
    fn transform_empty_input_yields_empty_output() {
        let metrics = transform(&[], Utc::now()).unwrap();
        assert!(metrics.is_empty());
    }

    #[test]
    fn transform_projects_renames_and_stamps() {
        let timestamp = Utc::now();
        let metrics = transform(&[bitcoin()], timestamp).unwrap();

        assert_eq!(metrics.len(), 1);

        let metric = &metrics[0];
        assert_eq!(metric.id, "bitcoin");
        assert_eq!(metric.symbol, "btc");
        assert_eq!(metric.name, "Bitcoin");
        assert_eq!(
            metric.current_price,
            BigDecimal::from_str("65000.5").unwrap()
        );
        assert_eq!(metric.market_cap, 1280000000000);
        assert_eq!(metric.total_volume, 0);
        assert_eq!(metric.price_change_24h, BigDecimal::from(0));
        assert_eq!(
            metric.last_updated,
            timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
        );
    }

    #[test]
    fn transform_missing_required_field_fails_the_run() {
        for field in REQUIRED_FIELDS {
            let mut raw = bitcoin();
            raw.remove(field);

            let result = transform(&[raw], Utc::now());
            assert!(
                matches!(result, Err(Error::FieldNotExist(ref f)) if f == field),
                "expected FieldNotExist for {}",
                field
            );
        }
    }

    #[test]
    fn transform_defaults_null_numeric_fields_to_zero() {
        let mut raw = bitcoin();
        raw.insert("current_price".into(), json!(null));
        raw.insert("market_cap".into(), json!(null));

        let metrics = transform(&[raw], Utc::now()).unwrap();

        let metric = &metrics[0];
        assert_eq!(metric.current_price, BigDecimal::from(0));
        assert_eq!(metric.market_cap, 0);
        assert_eq!(metric.total_volume, 0);
        assert_eq!(metric.price_change_24h, BigDecimal::from(0));
    }

    #[test]
    fn transform_truncates_integer_casts() {
        let mut raw = bitcoin();
        raw.insert("market_cap".into(), json!(1234.9));
        raw.insert("total_volume".into(), json!(-1234.9));

        let metrics = transform(&[raw], Utc::now()).unwrap();

        assert_eq!(metrics[0].market_cap, 1234);
        assert_eq!(metrics[0].total_volume, -1234);
    }

    #[test]
    fn transform_never_defaults_text_fields() {
        let mut raw = bitcoin();
        raw.insert("name".into(), json!(null));

        let result = transform(&[raw], Utc::now());
        assert!(matches!(result, Err(Error::InvalidField(_))));
    }

    #[test]
    fn transform_rejects_wrong_typed_fields() {
        let mut raw = bitcoin();
        raw.insert("market_cap".into(), json!("a lot"));

        let result = transform(&[raw], Utc::now());
        assert!(matches!(result, Err(Error::InvalidField(_))));
    }

    #[test]
    fn transform_rejects_duplicate_ids() {
        let result = transform(&[bitcoin(), bitcoin()], Utc::now());
        assert!(matches!(result, Err(Error::DuplicateField(_))));
    }

    #[test]
    fn transform_stamps_one_timestamp_per_batch() {
        let mut ethereum = bitcoin();
        ethereum.insert("id".into(), json!("ethereum"));

        let metrics = transform(&[bitcoin(), ethereum], Utc::now()).unwrap();

        assert_eq!(metrics[0].last_updated, metrics[1].last_updated);
    }

    async fn test_database() -> DatabasePool {
        let config = Config {
            database_url: std::env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            coingecko_host: String::from("https://api.coingecko.com"),
            timeout: 30,
        };

        DatabasePool::new(&config)
            .await
            .expect("database connection failed")
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres pointed at by DATABASE_URL"]
    async fn load_round_trips_a_batch() {
        let database = test_database().await;
        let metrics = transform(&[bitcoin()], Utc::now()).unwrap();

        let loaded = load(&database, &metrics).await.unwrap();
        assert_eq!(loaded, 1);

        let rows = database.daily_crypto_metrics.get_all().await.unwrap();
        assert_eq!(rows, metrics);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres pointed at by DATABASE_URL"]
    async fn load_twice_replaces_instead_of_duplicating() {
        let database = test_database().await;
        let metrics = transform(&[bitcoin()], Utc::now()).unwrap();

        load(&database, &metrics).await.unwrap();
        load(&database, &metrics).await.unwrap();

        let (count,) = database.daily_crypto_metrics.count().await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres pointed at by DATABASE_URL"]
    async fn load_empty_batch_mutates_nothing() {
        let database = test_database().await;
        let metrics = transform(&[bitcoin()], Utc::now()).unwrap();
        load(&database, &metrics).await.unwrap();

        let loaded = load(&database, &vec![]).await.unwrap();
        assert_eq!(loaded, 0);

        let (count,) = database.daily_crypto_metrics.count().await.unwrap();
        assert_eq!(count, 1);
    }
}
