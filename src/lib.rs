/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod period;
pub mod query;
pub mod query_parser;
pub mod schema;
pub mod store;

pub use error::{ConfigError, DataStoreError, InvalidPeriodError};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Applied to every pooled connection: this service never writes.
#[derive(Debug, Clone, Copy)]
struct ReadOnlyPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ReadOnlyPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA query_only = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build a thread-safe, read-only SQLite connection pool.
pub fn establish_connection(db_path: &str, max_size: u32) -> Result<DbPool, DataStoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ReadOnlyPragmas))
        .build(manager)?;
    Ok(pool)
}
