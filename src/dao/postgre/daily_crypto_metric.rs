use super::{DataBase, QueryResult};
use crate::model::{DailyCryptoMetric, Table};
use sqlx::{error::Error, QueryBuilder};

impl Table<DailyCryptoMetric> {
    pub async fn create_table(&self) -> Result<QueryResult, Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_crypto_metrics (
                id VARCHAR(255) PRIMARY KEY,
                symbol VARCHAR(50),
                name VARCHAR(255),
                current_price NUMERIC(20, 10),
                market_cap BIGINT,
                total_volume BIGINT,
                price_change_24h NUMERIC(10, 4),
                last_updated TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
    }

    pub async fn truncate(&self) -> Result<QueryResult, Error> {
        sqlx::query("TRUNCATE TABLE daily_crypto_metrics")
            .execute(&self.pool)
            .await
    }

    pub async fn insert_many(
        &self,
        data: &Vec<DailyCryptoMetric>,
    ) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }

        let mut query_builder: QueryBuilder<DataBase> = QueryBuilder::new(
            r#"
            INSERT INTO daily_crypto_metrics (
                id,
                symbol,
                name,
                current_price,
                market_cap,
                total_volume,
                price_change_24h,
                last_updated
            )"#,
        );

        query_builder.push_values(data, |mut b, metric| {
            b.push_bind(&metric.id)
                .push_bind(&metric.symbol)
                .push_bind(&metric.name)
                .push_bind(&metric.current_price)
                .push_bind(metric.market_cap)
                .push_bind(metric.total_volume)
                .push_bind(&metric.price_change_24h)
                .push_bind(&metric.last_updated);
        });

        let query = query_builder.build();
        query.execute(&self.pool).await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<(i64,), Error> {
        sqlx::query_as("SELECT COUNT(*) FROM daily_crypto_metrics")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn get_all(&self) -> Result<Vec<DailyCryptoMetric>, Error> {
        sqlx::query_as(
            r#"
            SELECT *
            FROM daily_crypto_metrics
            ORDER BY market_cap DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
