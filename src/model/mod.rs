pub use self::{daily_crypto_metric::DailyCryptoMetric, table::Table};

mod daily_crypto_metric;
mod table;
