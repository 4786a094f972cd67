/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

pub mod handlers;
pub mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use http::{HeaderValue, header::CACHE_CONTROL};
use log::info;
use tower_http::{compression::CompressionLayer, set_header::SetResponseHeaderLayer};

use crate::period::Clock;
use crate::store::DataStore;
use handlers::{
    http_address_top5, http_company_count, http_company_list, http_director_count,
    http_directors_top5, http_health, http_sic_top5,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, clock: Arc<dyn Clock>) -> Self {
        AppState { store, clock }
    }
}

pub fn router(state: AppState) -> Router {
    // results are computed per request and must not be reused
    let no_store: SetResponseHeaderLayer<HeaderValue> =
        SetResponseHeaderLayer::overriding(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Router::new()
        .route("/health", get(http_health))
        .route("/companies/count", get(http_company_count))
        .route("/directors/count", get(http_director_count))
        .route("/company/:period", get(http_company_list))
        .route("/company/:period/address_top5", get(http_address_top5))
        .route("/company/:period/sic_top5", get(http_sic_top5))
        .route("/directors/:period/directors_top5", get(http_directors_top5))
        .layer(no_store)
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for Ctrl-C: {e}");
            }
            info!("shutting down");
        })
        .await
}
