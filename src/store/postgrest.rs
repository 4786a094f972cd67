/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_RANGE;
use serde_json::{Value, json};

use super::{DataStore, QueryOutcome, RankedList, Table, escape_like};
use crate::error::DataStoreError;
use crate::period::DateRange;
use crate::query::{DATE_COLUMN, MatchMode, Projection, QueryDescriptor};

/// Store backed by a Supabase / PostgREST endpoint.
pub struct PostgrestStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PostgrestStore {
    /// Must be called outside an async context; the blocking client owns a
    /// runtime of its own.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, DataStoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(PostgrestStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.rest_url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

impl DataStore for PostgrestStore {
    fn execute(
        &self,
        table: Table,
        query: &QueryDescriptor,
    ) -> Result<QueryOutcome, DataStoreError> {
        let params = descriptor_params(query);
        log::debug!("postgrest {} {:?}", table.name(), params);

        match query.projection {
            Projection::CountOnly => {
                let resp = self
                    .request(Method::HEAD, table.name())
                    .query(&params)
                    .header("Prefer", "count=exact")
                    .send()?;
                let resp = ensure_success(resp)?;
                let status = resp.status().as_u16();
                let count = resp
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_content_range)
                    .ok_or_else(|| DataStoreError::Status {
                        status,
                        body: "missing or malformed Content-Range".to_string(),
                    })?;
                Ok(QueryOutcome::Count { count })
            }
            Projection::FullRow => {
                let resp = self
                    .request(Method::GET, table.name())
                    .query(&params)
                    .send()?;
                let rows: Vec<Value> = ensure_success(resp)?.json()?;
                Ok(QueryOutcome::Rows(rows))
            }
        }
    }

    fn call_remote_aggregate(
        &self,
        name: &str,
        range: &DateRange,
    ) -> Result<RankedList, DataStoreError> {
        log::debug!("postgrest rpc {} over {:?}", name, range);
        let resp = self
            .request(Method::POST, &format!("rpc/{name}"))
            .json(&rpc_body(range))
            .send()?;
        Ok(ensure_success(resp)?.json()?)
    }
}

fn ensure_success(resp: Response) -> Result<Response, DataStoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(DataStoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// PostgREST query parameters for a descriptor, in a stable order.
pub fn descriptor_params(query: &QueryDescriptor) -> Vec<(String, String)> {
    let select = match query.projection {
        Projection::FullRow => "*",
        Projection::CountOnly => "id",
    };
    let mut params = vec![("select".to_string(), select.to_string())];

    for p in &query.filters {
        let op = match p.mode {
            MatchMode::PartialCaseInsensitive => format!("ilike.*{}*", escape_like(&p.value)),
            MatchMode::Exact => format!("eq.{}", p.value),
        };
        params.push((p.field.column().to_string(), op));
    }

    if let Some(range) = &query.date_range {
        if let Some(start) = range.start {
            params.push((DATE_COLUMN.to_string(), format!("gte.{start}")));
        }
        if let Some(end) = range.end {
            params.push((DATE_COLUMN.to_string(), format!("lte.{end}")));
        }
    }

    if let (Projection::FullRow, Some(sort)) = (query.projection, &query.sort) {
        params.push((
            "order".to_string(),
            format!("{}.{}", sort.field, sort.direction.as_str()),
        ));
    }

    params
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range(header: &str) -> Option<i64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

fn rpc_body(range: &DateRange) -> Value {
    json!({
        "start_date": range.start,
        "end_date": range.end,
    })
}
