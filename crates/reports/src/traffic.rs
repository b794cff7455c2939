//! Cafe traffic page: clients per day for a selected year and month.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use geodash_core::{Cell, Table};
use serde::Serialize;

pub const DATE_COLUMN: &str = "fechaEntrada";
pub const TIME_COLUMN: &str = "horaEntrada";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    /// `"<Weekday> - <YYYY-MM-DD>"`.
    pub label: String,
    pub clients: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrafficReport {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub days: Vec<DayCount>,
    pub warnings: Vec<String>,
}

/// Date of an entry: a timestamp cell, or `YYYY-MM-DD[ HH:MM:SS]` text from CSV.
fn entry_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

/// Distinct years and months present in the date column, each sorted.
pub fn available_periods(table: &Table) -> (Vec<i32>, Vec<u32>) {
    let mut years = BTreeSet::new();
    let mut months = BTreeSet::new();
    for date in table.column_values(DATE_COLUMN).into_iter().filter_map(entry_date) {
        years.insert(date.year());
        months.insert(date.month());
    }
    (years.into_iter().collect(), months.into_iter().collect())
}

/// Clients per calendar day in the selected month. Without a selection the
/// first available year and month are used.
pub fn traffic(table: &Table, year: Option<i32>, month: Option<u32>) -> TrafficReport {
    let mut warnings = Vec::new();
    if !table.has_column(DATE_COLUMN) {
        warnings.push(format!("Column '{}' not found.", DATE_COLUMN));
    }

    let (years, months) = available_periods(table);
    let year = year.or_else(|| years.first().copied());
    let month = month.or_else(|| months.first().copied());

    let days = match (year, month) {
        (Some(y), Some(m)) => daily_counts(table, y, m),
        _ => Vec::new(),
    };
    if days.is_empty() && table.has_column(DATE_COLUMN) {
        warnings.push("No visits in the selected month.".to_string());
    }

    TrafficReport { years, months, year, month, days, warnings }
}

fn daily_counts(table: &Table, year: i32, month: u32) -> Vec<DayCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for row in &table.rows {
        let Some(date) = table.cell(row, DATE_COLUMN).and_then(entry_date) else {
            continue;
        };
        if date.year() != year || date.month() != month {
            continue;
        }
        let visit = table.cell(row, TIME_COLUMN).is_some_and(|c| !c.is_empty());
        *counts.entry(date).or_insert(0) += usize::from(visit);
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut days = Vec::new();
    let mut date = first;
    while date <= last {
        days.push(DayCount {
            date,
            label: format!("{} - {}", date.format("%A"), date.format("%Y-%m-%d")),
            clients: counts.get(&date).copied().unwrap_or(0),
        });
        date += Duration::days(1);
    }
    days
}
