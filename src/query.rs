/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::DateRange;

/// Column every date bound applies to.
pub const DATE_COLUMN: &str = "incorporated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// `%value%`, ignoring case
    PartialCaseInsensitive,
    Exact,
}

/// Company columns a filter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Cnumber,
    Cname,
    AddressLine1,
    AddressLine2,
    AddressLocality,
    AddressRegion,
    AddressCountry,
    AddressPostalCode,
    Siccodes,
    CapitalAmount,
    CapitalCurrency,
}

pub struct FieldSpec {
    pub field: Field,
    pub column: &'static str,
    pub mode: MatchMode,
}

/// Indexed by `Field as usize`; predicate order follows this table.
pub static FIELDS: [FieldSpec; 11] = [
    FieldSpec { field: Field::Cnumber, column: "cnumber", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::Cname, column: "cname", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::AddressLine1, column: "address_line_1", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::AddressLine2, column: "address_line_2", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::AddressLocality, column: "address_locality", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::AddressRegion, column: "address_region", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::AddressCountry, column: "address_country", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::AddressPostalCode, column: "address_postal_code", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::Siccodes, column: "siccodes", mode: MatchMode::PartialCaseInsensitive },
    FieldSpec { field: Field::CapitalAmount, column: "capital_amount", mode: MatchMode::Exact },
    FieldSpec { field: Field::CapitalCurrency, column: "capital_currency", mode: MatchMode::PartialCaseInsensitive },
];

impl Field {
    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self as usize]
    }

    pub fn column(self) -> &'static str {
        self.spec().column
    }

    pub fn match_mode(self) -> MatchMode {
        self.spec().mode
    }
}

/// Optional company filters. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub cnumber: Option<String>,
    pub cname: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub address_locality: Option<String>,
    pub address_region: Option<String>,
    pub address_country: Option<String>,
    pub address_postal_code: Option<String>,
    pub siccodes: Option<String>,
    pub capital_amount: Option<String>,
    pub capital_currency: Option<String>,
    pub incorporated_from: Option<NaiveDate>,
    pub incorporated_to: Option<NaiveDate>,
}

impl FilterSet {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Cnumber => &self.cnumber,
            Field::Cname => &self.cname,
            Field::AddressLine1 => &self.address_line_1,
            Field::AddressLine2 => &self.address_line_2,
            Field::AddressLocality => &self.address_locality,
            Field::AddressRegion => &self.address_region,
            Field::AddressCountry => &self.address_country,
            Field::AddressPostalCode => &self.address_postal_code,
            Field::Siccodes => &self.siccodes,
            Field::CapitalAmount => &self.capital_amount,
            Field::CapitalCurrency => &self.capital_currency,
        };
        value.as_deref()
    }

    /// Range formed by `incorporated_from`/`incorporated_to`, if either is set.
    pub fn incorporated_range(&self) -> Option<DateRange> {
        let range = DateRange::from_bounds(self.incorporated_from, self.incorporated_to);
        (!range.is_unbounded()).then_some(range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: Field,
    pub mode: MatchMode,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Only `asc` (any case) sorts ascending; everything else falls back to `desc`.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    FullRow,
    CountOnly,
}

/// Unexecuted query handed to a data store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub filters: Vec<Predicate>,
    pub date_range: Option<DateRange>,
    pub sort: Option<SortSpec>,
    pub projection: Projection,
}

impl QueryDescriptor {
    /// No filters, no bounds, just a count.
    pub fn count_all() -> Self {
        QueryDescriptor {
            projection: Projection::CountOnly,
            ..Default::default()
        }
    }
}

/// Everything the builder needs for one descriptor.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub filters: FilterSet,
    /// Wins over `incorporated_from`/`incorporated_to` when present.
    pub date_range: Option<DateRange>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub count_only: bool,
}

pub fn build_query(req: &QueryRequest) -> QueryDescriptor {
    let filters = FIELDS
        .iter()
        .filter_map(|spec| {
            req.filters.get(spec.field).map(|value| Predicate {
                field: spec.field,
                mode: spec.field.match_mode(),
                value: value.to_string(),
            })
        })
        .collect();

    let date_range = req
        .date_range
        .or_else(|| req.filters.incorporated_range())
        .filter(|r| !r.is_unbounded());

    let sort = req
        .sort_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|field| SortSpec {
            field: field.to_string(),
            direction: SortDirection::coerce(req.sort_order.as_deref()),
        });

    let projection = if req.count_only {
        Projection::CountOnly
    } else {
        Projection::FullRow
    };

    QueryDescriptor {
        filters,
        date_range,
        sort,
        projection,
    }
}
