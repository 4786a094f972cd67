/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de};

use crate::period::DateRange;
use crate::query::{FilterSet, QueryRequest};

/// Query-string parameters accepted by the company listing routes.
///
/// Keys outside this set are ignored. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub cnumber: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub cname: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address_line_1: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address_line_2: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address_locality: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address_region: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address_country: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address_postal_code: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub siccodes: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub capital_amount: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub capital_currency: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub incorporated_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub incorporated_to: Option<NaiveDate>,

    #[serde(default, deserialize_with = "flag")]
    pub count_only: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_order: Option<String>,
}

impl ListParams {
    pub fn filter_set(&self) -> FilterSet {
        FilterSet {
            cnumber: self.cnumber.clone(),
            cname: self.cname.clone(),
            address_line_1: self.address_line_1.clone(),
            address_line_2: self.address_line_2.clone(),
            address_locality: self.address_locality.clone(),
            address_region: self.address_region.clone(),
            address_country: self.address_country.clone(),
            address_postal_code: self.address_postal_code.clone(),
            siccodes: self.siccodes.clone(),
            capital_amount: self.capital_amount.clone(),
            capital_currency: self.capital_currency.clone(),
            incorporated_from: self.incorporated_from,
            incorporated_to: self.incorporated_to,
        }
    }

    /// `period_range` replaces `incorporated_from`/`incorporated_to` when given.
    pub fn into_request(self, period_range: Option<DateRange>) -> QueryRequest {
        QueryRequest {
            filters: self.filter_set(),
            date_range: period_range,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            count_only: self.count_only,
        }
    }
}

fn blank_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw {
        Some(s) if !s.trim().is_empty() => s.parse::<T>().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn flag<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    let Some(raw) = raw else { return Ok(false) };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "off" => Ok(false),
        "true" | "1" | "yes" | "on" => Ok(true),
        other => Err(de::Error::custom(format!(
            "invalid boolean `{other}` (expected true/false)"
        ))),
    }
}
