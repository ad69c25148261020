use sqlx::{
    postgres::{PgPoolOptions, PgQueryResult},
    PgPool, Postgres,
};

pub type PoolType = PgPool;
pub type PoolOption = PgPoolOptions;
pub type QueryResult = PgQueryResult;
pub type DataBase = Postgres;
