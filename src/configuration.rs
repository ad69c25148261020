use std::{env, fs, ops::Deref, sync::Arc};

use url::Url;

use crate::{
    error::Error,
    provider::{DatabasePool, HTTP},
};

const COINGECKO_MARKETS_PATH: &str = "/api/v3/coins/markets";

// The listing request is pinned: first page of the market-cap ranking in USD.
const VS_CURRENCY: &str = "usd";
const ORDER: &str = "market_cap_desc";
const PER_PAGE: &str = "250";
const PAGE: &str = "1";

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub http: HTTP,
}

impl State {
    pub fn new(config: Config, database: DatabasePool, http: HTTP) -> State {
        State {
            config,
            database,
            http,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub coingecko_host: String,
    pub timeout: u64,
}

impl Config {
    pub fn get_coingecko_markets_url(&self) -> Result<String, Error> {
        let mut url =
            Url::parse(&self.coingecko_host)?.join(COINGECKO_MARKETS_PATH)?;

        url.query_pairs_mut()
            .append_pair("vs_currency", VS_CURRENCY)
            .append_pair("order", ORDER)
            .append_pair("per_page", PER_PAGE)
            .append_pair("page", PAGE);

        Ok(url.into())
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let coingecko_host = env::var("COINGECKO_HOST")?;
    let timeout = env::var("TIMEOUT")?.parse()?;

    let config = Config {
        database_url,
        coingecko_host,
        timeout,
    };

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);

    let config_string = fs::read_to_string(path)?;
    parse_config_string(config_string);

    Ok(())
}

fn parse_config_string(config: String) {
    let params: Vec<Option<(&str, &str)>> = config
        .split('\n')
        .map(|s| s.find('=').map(|e| s.split_at(e)))
        .map(|value| value.map(|(k, v)| (k, &v[1..])))
        .collect();

    for (key, value) in params.into_iter().flatten() {
        env::set_var(key, value);
    }
}
