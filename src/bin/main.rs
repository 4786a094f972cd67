/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use companies_query::config::ServerConfig;
use companies_query::http::{AppState, serve};
use companies_query::period::UtcClock;

fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cfg = ServerConfig::parse();
    let addr = cfg.socket_addr()?;
    let backend = cfg.backend()?;

    // blocking clients must be built outside the runtime
    let store = backend
        .connect()
        .with_context(|| format!("connecting to {}", backend.describe()))?;
    info!("Starting server (HTTP={}, STORE={})", addr, backend.describe());

    let state = AppState::new(Arc::clone(&store), Arc::new(UtcClock));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let served = rt.block_on(serve(addr, state));
    // release the runtime before the store's last handle goes away
    drop(rt);
    drop(store);
    served.context("http server")
}
