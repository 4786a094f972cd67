/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use thiserror::Error;

/// A period token outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period '{token}'; expected one of: {}", .accepted.join(", "))]
pub struct InvalidPeriodError {
    pub token: String,
    pub accepted: Vec<&'static str>,
}

/// Anything that went wrong while talking to the backing store.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("database file not found: {0}")]
    MissingDatabase(String),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("column {table}.{column} does not exist")]
    UnknownColumn { table: &'static str, column: String },

    #[error("unknown procedure '{0}'")]
    UnknownProcedure(String),

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("store task failed: {0}")]
    Task(String),
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no data store configured: pass --db <file> or SUPABASE_URL and SUPABASE_KEY")]
    NoBackend,

    #[error("invalid http address '{0}'")]
    InvalidAddr(String),

    #[error(transparent)]
    Store(#[from] DataStoreError),
}
