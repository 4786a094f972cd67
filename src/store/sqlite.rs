/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::path::Path;

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{Date, Nullable};
use diesel::sqlite::{Sqlite, SqliteConnection};
use serde_json::{Map, Value};

use super::{DataStore, QueryOutcome, RankedList, Table, escape_like};
use crate::error::DataStoreError;
use crate::models::{Company, Director, RankedRow};
use crate::period::DateRange;
use crate::query::{Field, MatchMode, Projection, QueryDescriptor, SortDirection, SortSpec};
use crate::schema::{company, directors};
use crate::{DbPool, establish_connection};

/// A named aggregate this backend knows how to run.
struct Procedure {
    name: &'static str,
    label: &'static str,
    sql: &'static str,
}

// ?1 = start, ?2 = end; NULL leaves that side open
const PROCEDURES: [Procedure; 3] = [
    Procedure {
        name: "get_top_addresses",
        label: "address",
        sql: "SELECT address_line_1 AS value, COUNT(*) AS total \
              FROM company \
              WHERE address_line_1 IS NOT NULL AND address_line_1 <> '' \
                AND (?1 IS NULL OR incorporated >= ?1) \
                AND (?2 IS NULL OR incorporated <= ?2) \
              GROUP BY address_line_1 \
              ORDER BY total DESC, value ASC \
              LIMIT 5",
    },
    Procedure {
        name: "get_top_directors",
        label: "director",
        sql: "SELECT d.name AS value, COUNT(*) AS total \
              FROM directors d JOIN company c ON c.cnumber = d.cnumber \
              WHERE d.name IS NOT NULL AND d.name <> '' \
                AND (?1 IS NULL OR c.incorporated >= ?1) \
                AND (?2 IS NULL OR c.incorporated <= ?2) \
              GROUP BY d.name \
              ORDER BY total DESC, value ASC \
              LIMIT 5",
    },
    Procedure {
        name: "get_top_sic_codes",
        label: "siccode",
        sql: "SELECT siccodes AS value, COUNT(*) AS total \
              FROM company \
              WHERE siccodes IS NOT NULL AND siccodes <> '' \
                AND (?1 IS NULL OR incorporated >= ?1) \
                AND (?2 IS NULL OR incorporated <= ?2) \
              GROUP BY siccodes \
              ORDER BY total DESC, value ASC \
              LIMIT 5",
    },
];

macro_rules! text_filter {
    ($q:expr, $col:expr, $mode:expr, $value:expr) => {
        match $mode {
            MatchMode::PartialCaseInsensitive => {
                let pattern = format!("%{}%", escape_like(&$value));
                $q.filter($col.like(pattern).escape('\\'))
            }
            MatchMode::Exact => $q.filter($col.eq($value)),
        }
    };
}

macro_rules! order_by {
    ($q:expr, $col:expr, $dir:expr) => {
        match $dir {
            SortDirection::Asc => $q.order($col.asc()),
            SortDirection::Desc => $q.order($col.desc()),
        }
    };
}

/// Read-only store over a SQLite file holding the `company` and `directors`
/// relations.
///
/// SQLite's LIKE ignores case for ASCII only, which is what partial matches
/// rely on here.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteStore { pool }
    }

    /// Open an existing database file. Missing files are an error rather than
    /// silently created empty.
    pub fn open(db_path: &str, pool_size: u32) -> Result<Self, DataStoreError> {
        if !Path::new(db_path).is_file() {
            return Err(DataStoreError::MissingDatabase(db_path.to_string()));
        }
        Ok(SqliteStore::new(establish_connection(db_path, pool_size)?))
    }

    #[inline]
    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, DataStoreError> {
        Ok(self.pool.get()?)
    }

    fn execute_company(
        &self,
        query: &QueryDescriptor,
    ) -> Result<QueryOutcome, DataStoreError> {
        use crate::schema::company::dsl as c;
        let mut conn = self.conn()?;

        match query.projection {
            Projection::CountOnly => {
                let q = company_filters(c::company.select(count_star()).into_boxed(), query)?;
                let count = q.get_result::<i64>(&mut conn)?;
                Ok(QueryOutcome::Count { count })
            }
            Projection::FullRow => {
                let q = company_filters(c::company.select(Company::as_select()).into_boxed(), query)?;
                let q = company_order(q, query.sort.as_ref())?;
                let rows = q.load::<Company>(&mut conn)?;
                Ok(QueryOutcome::Rows(to_json_rows(rows)?))
            }
        }
    }

    fn execute_directors(
        &self,
        query: &QueryDescriptor,
    ) -> Result<QueryOutcome, DataStoreError> {
        use crate::schema::directors::dsl as d;
        let mut conn = self.conn()?;

        match query.projection {
            Projection::CountOnly => {
                let q = director_filters(d::directors.select(count_star()).into_boxed(), query)?;
                let count = q.get_result::<i64>(&mut conn)?;
                Ok(QueryOutcome::Count { count })
            }
            Projection::FullRow => {
                let q = director_filters(d::directors.select(Director::as_select()).into_boxed(), query)?;
                let q = director_order(q, query.sort.as_ref())?;
                let rows = q.load::<Director>(&mut conn)?;
                Ok(QueryOutcome::Rows(to_json_rows(rows)?))
            }
        }
    }
}

impl DataStore for SqliteStore {
    fn execute(
        &self,
        table: Table,
        query: &QueryDescriptor,
    ) -> Result<QueryOutcome, DataStoreError> {
        log::debug!("sqlite execute on {}: {:?}", table.name(), query);
        match table {
            Table::Company => self.execute_company(query),
            Table::Directors => self.execute_directors(query),
        }
    }

    fn call_remote_aggregate(
        &self,
        name: &str,
        range: &DateRange,
    ) -> Result<RankedList, DataStoreError> {
        let procedure = PROCEDURES
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| DataStoreError::UnknownProcedure(name.to_string()))?;
        log::debug!("sqlite procedure {} over {:?}", procedure.name, range);

        let mut conn = self.conn()?;
        let rows = diesel::sql_query(procedure.sql)
            .bind::<Nullable<Date>, _>(range.start)
            .bind::<Nullable<Date>, _>(range.end)
            .load::<RankedRow>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut entry = Map::new();
                entry.insert(procedure.label.to_string(), row.value.map_or(Value::Null, Value::from));
                entry.insert("count".to_string(), Value::from(row.total));
                Value::Object(entry)
            })
            .collect())
    }
}

fn company_filters<'a, ST>(
    mut q: company::BoxedQuery<'a, Sqlite, ST>,
    query: &QueryDescriptor,
) -> Result<company::BoxedQuery<'a, Sqlite, ST>, DataStoreError> {
    use crate::schema::company::dsl as c;

    for p in &query.filters {
        let value = p.value.clone();
        q = match p.field {
            Field::Cnumber => text_filter!(q, c::cnumber, p.mode, value),
            Field::Cname => text_filter!(q, c::cname, p.mode, value),
            Field::AddressLine1 => text_filter!(q, c::address_line_1, p.mode, value),
            Field::AddressLine2 => text_filter!(q, c::address_line_2, p.mode, value),
            Field::AddressLocality => text_filter!(q, c::address_locality, p.mode, value),
            Field::AddressRegion => text_filter!(q, c::address_region, p.mode, value),
            Field::AddressCountry => text_filter!(q, c::address_country, p.mode, value),
            Field::AddressPostalCode => text_filter!(q, c::address_postal_code, p.mode, value),
            Field::Siccodes => text_filter!(q, c::siccodes, p.mode, value),
            Field::CapitalCurrency => text_filter!(q, c::capital_currency, p.mode, value),
            // numeric column: equality whatever the mode
            Field::CapitalAmount => {
                let amount = value.trim().parse::<f64>().map_err(|_| {
                    DataStoreError::InvalidValue {
                        field: "capital_amount",
                        value: value.clone(),
                    }
                })?;
                q.filter(c::capital_amount.eq(amount))
            }
        };
    }

    if let Some(range) = &query.date_range {
        if let Some(start) = range.start {
            q = q.filter(c::incorporated.ge(start));
        }
        if let Some(end) = range.end {
            q = q.filter(c::incorporated.le(end));
        }
    }

    Ok(q)
}

fn company_order<'a, ST>(
    q: company::BoxedQuery<'a, Sqlite, ST>,
    sort: Option<&SortSpec>,
) -> Result<company::BoxedQuery<'a, Sqlite, ST>, DataStoreError> {
    use crate::schema::company::dsl as c;

    let Some(sort) = sort else { return Ok(q) };
    let dir = sort.direction;
    Ok(match sort.field.as_str() {
        "id" => order_by!(q, c::id, dir),
        "cnumber" => order_by!(q, c::cnumber, dir),
        "cname" => order_by!(q, c::cname, dir),
        "address_line_1" => order_by!(q, c::address_line_1, dir),
        "address_line_2" => order_by!(q, c::address_line_2, dir),
        "address_locality" => order_by!(q, c::address_locality, dir),
        "address_region" => order_by!(q, c::address_region, dir),
        "address_country" => order_by!(q, c::address_country, dir),
        "address_postal_code" => order_by!(q, c::address_postal_code, dir),
        "siccodes" => order_by!(q, c::siccodes, dir),
        "capital_amount" => order_by!(q, c::capital_amount, dir),
        "capital_currency" => order_by!(q, c::capital_currency, dir),
        "incorporated" => order_by!(q, c::incorporated, dir),
        other => {
            return Err(DataStoreError::UnknownColumn {
                table: "company",
                column: other.to_string(),
            });
        }
    })
}

fn director_filters<'a, ST>(
    mut q: directors::BoxedQuery<'a, Sqlite, ST>,
    query: &QueryDescriptor,
) -> Result<directors::BoxedQuery<'a, Sqlite, ST>, DataStoreError> {
    use crate::schema::directors::dsl as d;

    for p in &query.filters {
        let value = p.value.clone();
        q = match p.field {
            Field::Cnumber => text_filter!(q, d::cnumber, p.mode, value),
            other => {
                return Err(DataStoreError::UnknownColumn {
                    table: "directors",
                    column: other.column().to_string(),
                });
            }
        };
    }

    if query.date_range.is_some() {
        return Err(DataStoreError::UnknownColumn {
            table: "directors",
            column: crate::query::DATE_COLUMN.to_string(),
        });
    }

    Ok(q)
}

fn director_order<'a, ST>(
    q: directors::BoxedQuery<'a, Sqlite, ST>,
    sort: Option<&SortSpec>,
) -> Result<directors::BoxedQuery<'a, Sqlite, ST>, DataStoreError> {
    use crate::schema::directors::dsl as d;

    let Some(sort) = sort else { return Ok(q) };
    let dir = sort.direction;
    Ok(match sort.field.as_str() {
        "id" => order_by!(q, d::id, dir),
        "cnumber" => order_by!(q, d::cnumber, dir),
        "name" => order_by!(q, d::name, dir),
        "appointed_on" => order_by!(q, d::appointed_on, dir),
        other => {
            return Err(DataStoreError::UnknownColumn {
                table: "directors",
                column: other.to_string(),
            });
        }
    })
}

fn to_json_rows<T: serde::Serialize>(rows: Vec<T>) -> Result<Vec<Value>, DataStoreError> {
    rows.into_iter()
        .map(|r| serde_json::to_value(r).map_err(DataStoreError::from))
        .collect()
}
