/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use log::info;
use serde_json::{Map, Value, json};

use super::AppState;
use super::response::ApiError;
use crate::error::DataStoreError;
use crate::period::{PeriodToken, resolve_period};
use crate::query::{QueryDescriptor, build_query};
use crate::query_parser::ListParams;
use crate::store::{Aggregate, QueryOutcome, RankedList, Table};

/// GET /health
pub async fn http_health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET /companies/count
pub async fn http_company_count(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    info!("GET /companies/count");
    let count = count_all(&state, Table::Company).await?;
    Ok(Json(json!({ "company_count": count })))
}

/// GET /directors/count
pub async fn http_director_count(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    info!("GET /directors/count");
    let count = count_all(&state, Table::Directors).await?;
    Ok(Json(json!({ "director_count": count })))
}

/// GET /company/{period}?cname=..&count_only=..&sort_by=..&sort_order=..
///
/// `all` lists without a period bound, so `incorporated_from`/`incorporated_to`
/// apply; any other period replaces them.
pub async fn http_company_list(
    State(state): State<AppState>,
    Path(period): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let token: PeriodToken = period.parse()?;
    let Query(params) = params.map_err(|e| ApiError::InvalidParams(e.body_text()))?;
    info!("GET /company/{token} count_only={}", params.count_only);

    let period_range = Some(token.resolve(state.clock.today())).filter(|r| !r.is_unbounded());
    let descriptor = build_query(&params.into_request(period_range));
    let outcome = execute(&state, Table::Company, descriptor).await?;
    Ok(Json(json!({ "result": outcome })))
}

/// GET /company/{period}/address_top5
pub async fn http_address_top5(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Value>, ApiError> {
    top5(&state, &period, Aggregate::Addresses).await
}

/// GET /directors/{period}/directors_top5
pub async fn http_directors_top5(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Value>, ApiError> {
    top5(&state, &period, Aggregate::Directors).await
}

/// GET /company/{period}/sic_top5
pub async fn http_sic_top5(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Value>, ApiError> {
    top5(&state, &period, Aggregate::SicCodes).await
}

async fn top5(state: &AppState, period: &str, aggregate: Aggregate) -> Result<Json<Value>, ApiError> {
    let range = resolve_period(period, state.clock.today())?;
    info!("top5 {} for period {}", aggregate.procedure(), period);

    let store = Arc::clone(&state.store);
    let list: RankedList = tokio::task::spawn_blocking(move || {
        store.call_remote_aggregate(aggregate.procedure(), &range)
    })
    .await
    .map_err(|e| DataStoreError::Task(e.to_string()))??;

    let mut body = Map::new();
    body.insert(aggregate.response_key().to_string(), Value::Array(list));
    Ok(Json(Value::Object(body)))
}

async fn count_all(state: &AppState, table: Table) -> Result<i64, ApiError> {
    let outcome = execute(state, table, QueryDescriptor::count_all()).await?;
    outcome
        .count()
        .ok_or_else(|| DataStoreError::Shape(format!("rows returned for a count of {}", table.name())).into())
}

async fn execute(
    state: &AppState,
    table: Table,
    descriptor: QueryDescriptor,
) -> Result<QueryOutcome, DataStoreError> {
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || store.execute(table, &descriptor))
        .await
        .map_err(|e| DataStoreError::Task(e.to_string()))?
}
