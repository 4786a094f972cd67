mod common;

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{Fixture, today};
use companies_query::DataStoreError;
use companies_query::http::{AppState, router};
use companies_query::period::{DateRange, FixedClock};
use companies_query::query::{Projection, QueryDescriptor};
use companies_query::store::{DataStore, QueryOutcome, RankedList, SqliteStore, Table};

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let resp = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn sqlite_state(fx: &Fixture) -> AppState {
    let store = SqliteStore::open(&fx.path, 2).unwrap();
    AppState::new(Arc::new(store), Arc::new(FixedClock(today())))
}

fn ids(body: &Value) -> Vec<i64> {
    body["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

/// Remembers what it was asked and answers with canned data.
#[derive(Default)]
struct RecordingStore {
    queries: Mutex<Vec<(Table, QueryDescriptor)>>,
    aggregates: Mutex<Vec<(String, DateRange)>>,
}

impl DataStore for RecordingStore {
    fn execute(&self, table: Table, query: &QueryDescriptor) -> Result<QueryOutcome, DataStoreError> {
        self.queries.lock().unwrap().push((table, query.clone()));
        Ok(match query.projection {
            Projection::CountOnly => QueryOutcome::Count { count: 42 },
            Projection::FullRow => QueryOutcome::Rows(vec![json!({ "id": 1 })]),
        })
    }

    fn call_remote_aggregate(&self, name: &str, range: &DateRange) -> Result<RankedList, DataStoreError> {
        self.aggregates.lock().unwrap().push((name.to_string(), *range));
        Ok(vec![json!({ "value": "x", "count": 1 })])
    }
}

struct BrokenStore;

impl DataStore for BrokenStore {
    fn execute(&self, _: Table, _: &QueryDescriptor) -> Result<QueryOutcome, DataStoreError> {
        Err(DataStoreError::Status {
            status: 503,
            body: "connection refused".into(),
        })
    }

    fn call_remote_aggregate(&self, name: &str, _: &DateRange) -> Result<RankedList, DataStoreError> {
        Err(DataStoreError::UnknownProcedure(name.to_string()))
    }
}

#[tokio::test]
async fn health_is_static() {
    let state = AppState::new(Arc::new(BrokenStore), Arc::new(FixedClock(today())));
    let (status, body) = get(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn count_endpoints() {
    let fx = Fixture::seeded();
    let (status, body) = get(sqlite_state(&fx), "/companies/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "company_count": 6 }));

    let (_, body) = get(sqlite_state(&fx), "/directors/count").await;
    assert_eq!(body, json!({ "director_count": 7 }));
}

#[tokio::test]
async fn list_all_with_filters() {
    let fx = Fixture::seeded();
    let (status, body) = get(sqlite_state(&fx), "/company/all?cname=acme&sort_by=id&sort_order=asc&colour=red").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2]);

    let (_, body) = get(sqlite_state(&fx), "/company/all?incorporated_to=2020-01-01").await;
    assert_eq!(ids(&body), vec![5]);
}

#[tokio::test]
async fn count_only_shape() {
    let fx = Fixture::seeded();
    let (_, body) = get(sqlite_state(&fx), "/company/all?count_only=true").await;
    assert_eq!(body, json!({ "result": { "count": 6 } }));
}

#[tokio::test]
async fn period_variants() {
    let fx = Fixture::seeded();
    let (_, body) = get(sqlite_state(&fx), "/company/today").await;
    assert_eq!(ids(&body), vec![1]);

    let (_, body) = get(sqlite_state(&fx), "/company/week?sort_by=id&sort_order=asc").await;
    assert_eq!(ids(&body), vec![1, 2]);

    for (period, expected) in [("month", 3), ("year", 4), ("all", 6)] {
        let (_, body) = get(sqlite_state(&fx), &format!("/company/{period}?count_only=1")).await;
        assert_eq!(body["result"]["count"], json!(expected), "{period}");
    }
}

#[tokio::test]
async fn period_replaces_explicit_bounds() {
    let fx = Fixture::seeded();
    let (_, body) = get(sqlite_state(&fx), "/company/today?incorporated_from=2019-01-01").await;
    assert_eq!(ids(&body), vec![1]);
}

#[tokio::test]
async fn today_descriptor_end_to_end() {
    let store = Arc::new(RecordingStore::default());
    let state = AppState::new(store.clone(), Arc::new(FixedClock(today())));
    let (status, body) = get(state, "/company/today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": [{ "id": 1 }] }));

    let queries = store.queries.lock().unwrap();
    assert_eq!(
        queries.as_slice(),
        &[(
            Table::Company,
            QueryDescriptor {
                filters: vec![],
                date_range: Some(DateRange::between(today(), today())),
                sort: None,
                projection: Projection::FullRow,
            }
        )]
    );
}

#[tokio::test]
async fn invalid_period_is_a_client_error() {
    let fx = Fixture::seeded();
    for uri in ["/company/decade", "/company/decade/sic_top5", "/directors/Week/directors_top5"] {
        let (status, body) = get(sqlite_state(&fx), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], json!("invalid_period"));
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("today, week, month, year, all"), "{detail}");
    }
}

#[tokio::test]
async fn malformed_parameters_are_a_client_error() {
    let fx = Fixture::seeded();
    let (status, body) = get(sqlite_state(&fx), "/company/all?incorporated_from=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_params"));
}

#[tokio::test]
async fn unknown_sort_column_is_a_server_error() {
    let fx = Fixture::seeded();
    let (status, body) = get(sqlite_state(&fx), "/company/all?sort_by=turnover").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!("datastore_error"));
    assert!(body["detail"].as_str().unwrap().contains("turnover"));
}

#[tokio::test]
async fn store_failures_surface_as_500() {
    let state = AppState::new(Arc::new(BrokenStore), Arc::new(FixedClock(today())));
    let (status, body) = get(state.clone(), "/companies/count").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("connection refused"));

    let (status, _) = get(state, "/company/year/address_top5").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn top5_endpoints_over_sqlite() {
    let fx = Fixture::seeded();
    let (status, body) = get(sqlite_state(&fx), "/company/year/address_top5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "top_addresses": [
            { "address": "1 High Street", "count": 2 },
            { "address": "22 Mill Lane", "count": 2 },
        ]})
    );

    let (_, body) = get(sqlite_state(&fx), "/company/month/sic_top5").await;
    assert_eq!(
        body,
        json!({ "top_sic_codes": [
            { "siccode": "62012", "count": 2 },
            { "siccode": "25620", "count": 1 },
        ]})
    );

    let (_, body) = get(sqlite_state(&fx), "/directors/year/directors_top5").await;
    assert_eq!(
        body,
        json!({ "top_directors": [
            { "director": "Jane Smith", "count": 3 },
            { "director": "John Doe", "count": 1 },
        ]})
    );
}

#[tokio::test]
async fn top5_passes_procedure_and_range() {
    let store = Arc::new(RecordingStore::default());
    let state = AppState::new(store.clone(), Arc::new(FixedClock(today())));
    get(state.clone(), "/company/week/sic_top5").await;
    get(state, "/directors/all/directors_top5").await;

    let calls = store.aggregates.lock().unwrap();
    assert_eq!(calls[0].0, "get_top_sic_codes");
    assert_eq!(calls[0].1.start, chrono::NaiveDate::from_ymd_opt(2024, 3, 11));
    assert_eq!(calls[0].1.end, chrono::NaiveDate::from_ymd_opt(2024, 3, 17));
    assert_eq!(calls[1], ("get_top_directors".to_string(), DateRange::unbounded()));
}

#[tokio::test]
async fn responses_are_not_cacheable() {
    let fx = Fixture::seeded();
    let resp = router(sqlite_state(&fx))
        .oneshot(Request::builder().uri("/companies/count").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
}
