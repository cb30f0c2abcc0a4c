use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use crate::store::StoreError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

pub fn establish_pool(database_url: &str, max_size: u32) -> Result<PgPool, StoreError> {
    log::info!("Opening database pool (max {} connections)", max_size);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    match Pool::builder().max_size(max_size).build(manager) {
        Ok(pool) => {
            log::info!("Database connection established successfully");
            Ok(pool)
        }
        Err(e) => {
            log::error!("Failed to establish database connection: {}", e);
            Err(StoreError::Pool(e))
        }
    }
}
