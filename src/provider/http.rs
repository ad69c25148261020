use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::{
    configuration::Config, error::Error, types::CoinGeckoMarketRecord,
};

#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    pub http: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(HTTP { config, http })
    }

    pub async fn get_coingecko_markets(
        &self,
    ) -> Result<Vec<CoinGeckoMarketRecord>, Error> {
        let url = self.config.get_coingecko_markets_url()?;
        info!("{}", &url);

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::FetchError(format!(
                "markets request failed with status {}",
                status
            )));
        }

        let json = response.json::<Vec<CoinGeckoMarketRecord>>().await?;
        Ok(json)
    }
}
