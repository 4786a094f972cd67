/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidPeriodError;

/// Calendar period a request can be scoped to, anchored at "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodToken {
    Today,
    Week,
    Month,
    Year,
    All,
}

impl PeriodToken {
    pub const ACCEPTED: [&'static str; 5] = ["today", "week", "month", "year", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodToken::Today => "today",
            PeriodToken::Week => "week",
            PeriodToken::Month => "month",
            PeriodToken::Year => "year",
            PeriodToken::All => "all",
        }
    }

    /// Inclusive range covered by this period on `today`.
    ///
    /// `All` is the only token that yields an unbounded range; every other
    /// token produces both bounds with `start <= end`.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        match self {
            PeriodToken::Today => DateRange::between(today, today),
            PeriodToken::Week => {
                let offset = u64::from(today.weekday().num_days_from_monday());
                let start = today - Days::new(offset);
                DateRange::between(start, start + Days::new(6))
            }
            PeriodToken::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let next_first = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                };
                // only None past chrono's max year
                let last = next_first
                    .and_then(|d| d.pred_opt())
                    .unwrap_or(NaiveDate::MAX);
                DateRange::between(first, last)
            }
            PeriodToken::Year => {
                let first = today.with_ordinal(1).unwrap_or(today);
                let last = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
                DateRange::between(first, last)
            }
            PeriodToken::All => DateRange::unbounded(),
        }
    }
}

impl FromStr for PeriodToken {
    type Err = InvalidPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(PeriodToken::Today),
            "week" => Ok(PeriodToken::Week),
            "month" => Ok(PeriodToken::Month),
            "year" => Ok(PeriodToken::Year),
            "all" => Ok(PeriodToken::All),
            other => Err(InvalidPeriodError {
                token: other.to_string(),
                accepted: PeriodToken::ACCEPTED.to_vec(),
            }),
        }
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a raw token and resolve it against `today` in one step.
pub fn resolve_period(token: &str, today: NaiveDate) -> Result<DateRange, InvalidPeriodError> {
    Ok(token.parse::<PeriodToken>()?.resolve(today))
}

/// Inclusive date bounds on the `incorporated` column. A missing side is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    pub fn unbounded() -> Self {
        DateRange::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Source of "today". Only the period resolution path reads it.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Calendar date in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always answers the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
