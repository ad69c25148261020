use std::marker::PhantomData;

use crate::dao::PoolType;

/// Handle on one database table, parameterized by its row type. The
/// queries themselves live in the matching dao module.
#[derive(Debug)]
pub struct Table<T> {
    pub pool: PoolType,
    _phantomdata: PhantomData<T>,
}

impl<T> Table<T> {
    pub fn new(pool: PoolType) -> Self {
        Table {
            pool,
            _phantomdata: PhantomData,
        }
    }
}
