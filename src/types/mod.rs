pub use self::coin_gecko_markets::CoinGeckoMarketRecord;

mod coin_gecko_markets;
