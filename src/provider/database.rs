use std::time::Duration;

use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{DailyCryptoMetric, Table},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub daily_crypto_metrics: Table<DailyCryptoMetric>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect(config.database_url.as_str())
            .await?;

        Ok(DatabasePool {
            daily_crypto_metrics: Table::new(pool.clone()),
            pool,
        })
    }

    pub fn get_pool(&self) -> &PoolType {
        &self.pool
    }
}
