/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable)]
#[diesel(table_name = crate::schema::company)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i32,
    pub cnumber: Option<String>,
    pub cname: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub address_locality: Option<String>,
    pub address_region: Option<String>,
    pub address_country: Option<String>,
    pub address_postal_code: Option<String>,
    pub siccodes: Option<String>,
    pub capital_amount: Option<f64>,
    pub capital_currency: Option<String>,
    pub incorporated: Option<NaiveDate>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = crate::schema::directors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    pub id: i32,
    pub cnumber: Option<String>,
    pub name: Option<String>,
    pub appointed_on: Option<NaiveDate>,
}

/// One row of a ranked aggregate.
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq)]
pub struct RankedRow {
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub value: Option<String>,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total: i64,
}
