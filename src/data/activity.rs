//! Year filtering: which features were in service in a given year, and the
//! station/rail-line join.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::data::feature::Feature;

/// Year a request filters by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterYear {
    /// No `date` given: everything, unchanged.
    Unfiltered,
    Year(i32),
}

impl FilterYear {
    pub fn year(self) -> Option<i32> {
        match self {
            Self::Unfiltered => None,
            Self::Year(year) => Some(year),
        }
    }

    /// Year 0 is the unfiltered sentinel, so a date in year 0 filters nothing.
    pub fn from_year(year: i32) -> FilterYear {
        if year == 0 {
            Self::Unfiltered
        } else {
            Self::Year(year)
        }
    }

    /// Derive the filter year from a `date` query value.
    /// Blank is unfiltered; `None` means the value is not a date.
    pub fn from_date_param(raw: &str) -> Option<FilterYear> {
        let value = raw.trim();
        if value.is_empty() {
            return Some(Self::Unfiltered);
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::from_year(timestamp.with_timezone(&Utc).year()));
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(Self::from_year(date.year()));
        }
        lenient_calendar_year(value).map(Self::from_year)
    }
}

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` with day overflow tolerated
/// (`2020-02-30` rolls into March of the same year).
fn lenient_calendar_year(value: &str) -> Option<i32> {
    let mut parts = value.split('-');
    let year = parts.next().filter(|part| part.len() == 4)?;
    let year = digits(year)?;

    if let Some(month) = parts.next() {
        let month = digits(month).filter(|_| month.len() <= 2)?;
        if !(1..=12).contains(&month) {
            return None;
        }
    }
    if let Some(day) = parts.next() {
        let day = digits(day).filter(|_| day.len() <= 2)?;
        if !(1..=31).contains(&day) {
            return None;
        }
    }
    if parts.next().is_some() {
        return None;
    }
    Some(year)
}

fn digits(part: &str) -> Option<i32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Whether `feature` was in service during `year`. Missing bounds are open.
pub fn is_active(feature: &Feature, year: FilterYear) -> bool {
    let FilterYear::Year(year) = year else {
        return true;
    };

    if feature.start_year().is_some_and(|start| year < start) {
        return false;
    }
    if feature.end_year().is_some_and(|end| year > end) {
        return false;
    }
    true
}

/// Stable filter: survivors keep their relative order.
pub fn filter_by_year<'a, I>(features: I, year: FilterYear) -> Vec<&'a Feature>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .filter(|feature| is_active(feature, year))
        .collect()
}

/// Distinct non-empty line names across `rail`.
pub fn active_line_names<'a, I>(rail: I) -> HashSet<&'a str>
where
    I: IntoIterator<Item = &'a Feature>,
{
    rail.into_iter()
        .map(Feature::line_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Keep stations whose line is in `lines`. Stations without a line name never match.
pub fn restrict_to_lines<'a>(stations: Vec<&'a Feature>, lines: &HashSet<&str>) -> Vec<&'a Feature> {
    stations
        .into_iter()
        .filter(|station| {
            let name = station.line_name();
            !name.is_empty() && lines.contains(name)
        })
        .collect()
}
