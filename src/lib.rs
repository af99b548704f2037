//! Descriptive queries over the JHU CSSE time series of confirmed COVID-19
//! cases per country/region.
//!
//! The table is loaded once per process (see [`state`]) and every query is a
//! read against it. Queries are also available on [`CaseTable`] directly for
//! callers that manage their own table.

pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use config::{CONFIRMED_CASES_URL, DataSource, SourceConfig};
pub use data::model::{CaseDate, CaseTable, DEFAULT_TOP_N, DEFAULT_YEAR, RegionRow};
pub use error::{QueryError, Result};

/// [`data::query::cases_by_country_and_date`] against the shared table.
pub fn cases_by_country_and_date(
    country: &str,
    day: i64,
    month: i64,
    year: i64,
) -> anyhow::Result<u64> {
    let table = state::confirmed_cases()?;
    Ok(data::query::cases_by_country_and_date(table, country, day, month, year)?)
}

/// [`data::query::top_n_countries_by_date`] against the shared table.
pub fn top_n_countries_by_date(
    day: i64,
    month: i64,
    year: i64,
    n: usize,
) -> anyhow::Result<Vec<String>> {
    let table = state::confirmed_cases()?;
    Ok(data::query::top_n_countries_by_date(table, day, month, year, n)?)
}

/// Top [`DEFAULT_TOP_N`] countries on the given date.
pub fn top5_countries_by_date(day: i64, month: i64, year: i64) -> anyhow::Result<Vec<String>> {
    top_n_countries_by_date(day, month, year, DEFAULT_TOP_N)
}

/// [`data::query::unchanged_case_country_count`] against the shared table.
pub fn unchanged_case_country_count(day: i64, month: i64, year: i64) -> anyhow::Result<usize> {
    let table = state::confirmed_cases()?;
    Ok(data::query::unchanged_case_country_count(table, day, month, year)?)
}
