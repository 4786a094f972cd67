/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use serde::Serialize;
use serde_json::Value;

use crate::error::DataStoreError;
use crate::period::DateRange;
use crate::query::QueryDescriptor;

pub mod postgrest;
pub mod sqlite;

pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;

/// Backslash-escape `\`, `%` and `_` so a LIKE pattern treats them literally.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Ranked rows exactly as the aggregate procedure returned them.
pub type RankedList = Vec<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Company,
    Directors,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Company => "company",
            Table::Directors => "directors",
        }
    }
}

/// Either every matching row or a count, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Rows(Vec<Value>),
    Count { count: i64 },
}

impl QueryOutcome {
    pub fn count(&self) -> Option<i64> {
        match self {
            QueryOutcome::Count { count } => Some(*count),
            QueryOutcome::Rows(_) => None,
        }
    }
}

/// Server-side top-5 aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Addresses,
    Directors,
    SicCodes,
}

impl Aggregate {
    pub fn procedure(&self) -> &'static str {
        match self {
            Aggregate::Addresses => "get_top_addresses",
            Aggregate::Directors => "get_top_directors",
            Aggregate::SicCodes => "get_top_sic_codes",
        }
    }

    /// Key the ranked list is returned under.
    pub fn response_key(&self) -> &'static str {
        match self {
            Aggregate::Addresses => "top_addresses",
            Aggregate::Directors => "top_directors",
            Aggregate::SicCodes => "top_sic_codes",
        }
    }
}

/// The relational store behind the service. Calls block; run them off the
/// async executor.
pub trait DataStore: Send + Sync {
    fn execute(&self, table: Table, query: &QueryDescriptor)
    -> Result<QueryOutcome, DataStoreError>;

    fn call_remote_aggregate(
        &self,
        name: &str,
        range: &DateRange,
    ) -> Result<RankedList, DataStoreError>;
}
