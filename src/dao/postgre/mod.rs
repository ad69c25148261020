pub use self::types::{DataBase, PoolOption, PoolType, QueryResult};

mod daily_crypto_metric;
mod types;
