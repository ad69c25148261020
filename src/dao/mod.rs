pub use self::postgre::{DataBase, PoolOption, PoolType, QueryResult};

mod postgre;
