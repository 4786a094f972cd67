/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::store::{DataStore, PostgrestStore, SqliteStore};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Read-only query service over company filings")]
pub struct ServerConfig {
    /// HTTP address to bind
    #[arg(long, env = "HTTP_ADDR", default_value = "127.0.0.1:7070")]
    pub http_addr: String,

    /// SQLite database file; takes precedence over Supabase settings
    #[arg(long, env = "DATABASE_PATH")]
    pub db: Option<String>,

    /// Connections kept in the SQLite pool
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 8)]
    pub pool_size: u32,

    /// Supabase project URL (PostgREST backend)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Per-request timeout against the PostgREST backend
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

/// Which store the service will talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Sqlite { path: String, pool_size: u32 },
    Postgrest { url: String, key: String, timeout: Duration },
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.http_addr.clone()))
    }

    pub fn backend(&self) -> Result<Backend, ConfigError> {
        if let Some(path) = &self.db {
            return Ok(Backend::Sqlite {
                path: path.clone(),
                pool_size: self.pool_size.max(1),
            });
        }
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Ok(Backend::Postgrest {
                url: url.clone(),
                key: key.clone(),
                timeout: Duration::from_secs(self.request_timeout_secs),
            }),
            _ => Err(ConfigError::NoBackend),
        }
    }
}

impl Backend {
    /// Build the store. Call before entering the async runtime.
    pub fn connect(&self) -> Result<Arc<dyn DataStore>, ConfigError> {
        Ok(match self {
            Backend::Sqlite { path, pool_size } => Arc::new(SqliteStore::open(path, *pool_size)?),
            Backend::Postgrest { url, key, timeout } => {
                Arc::new(PostgrestStore::new(url, key, *timeout)?)
            }
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Sqlite { path, .. } => format!("sqlite:{path}"),
            Backend::Postgrest { url, .. } => format!("postgrest:{url}"),
        }
    }
}
