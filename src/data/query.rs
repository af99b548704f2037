use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{CaseDate, CaseTable, column_label_for};
use crate::error::{QueryError, Result};

// ---------------------------------------------------------------------------
// Per-country grouping
// ---------------------------------------------------------------------------

/// Fold the counts of one column into one value per country.
///
/// Groups come out in ascending country-name order, so two groupings of the
/// same table always line up position by position.
fn group_by_country<F>(table: &CaseTable, column: usize, fold: F) -> Vec<(&str, u64)>
where
    F: Fn(u64, u64) -> u64,
{
    let mut groups: BTreeMap<&str, u64> = BTreeMap::new();
    for row in table.rows() {
        let value = row.counts[column];
        groups
            .entry(row.country_region.as_str())
            .and_modify(|acc| *acc = fold(*acc, value))
            .or_insert(value);
    }
    groups.into_iter().collect()
}

fn require_column(table: &CaseTable, date: &CaseDate) -> Result<usize> {
    let label = date.column_label();
    table
        .column_of(&label)
        .ok_or_else(|| QueryError::NotFound(format!("no date column '{label}'")))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Confirmed cases for `country` on the given date.
///
/// When the country is split into sub-regions the first matching row is
/// used; this is not a national total.
pub fn cases_by_country_and_date(
    table: &CaseTable,
    country: &str,
    day: i64,
    month: i64,
    year: i64,
) -> Result<u64> {
    log::debug!("cases_by_country_and_date country={country} date={day}/{month}/{year}");
    if country.is_empty() {
        return Err(QueryError::InvalidArgument("country must not be empty".into()));
    }
    let date = CaseDate::new(day, month, year)?;
    let column = require_column(table, &date)?;

    table
        .rows()
        .iter()
        .find(|r| r.country_region == country)
        .map(|r| r.counts[column])
        .ok_or_else(|| QueryError::NotFound(format!("no country '{country}'")))
}

/// The `n` countries with the highest summed case count on the given date.
///
/// Sub-regions are summed into one national total. Ties keep ascending
/// country-name order.
pub fn top_n_countries_by_date(
    table: &CaseTable,
    day: i64,
    month: i64,
    year: i64,
    n: usize,
) -> Result<Vec<String>> {
    log::debug!("top_n_countries_by_date n={n} date={day}/{month}/{year}");
    let date = CaseDate::new(day, month, year)?;
    let column = require_column(table, &date)?;

    let mut totals = group_by_country(table, column, |acc, v| acc.saturating_add(v));
    // Stable: equal totals stay in group order.
    totals.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(totals
        .into_iter()
        .take(n)
        .map(|(country, _)| country.to_string())
        .collect())
}

/// Number of countries whose count on the given date equals the previous day's.
///
/// Each country is represented by the maximum over its sub-regions on each
/// day. The two per-country sequences are compared by position.
pub fn unchanged_case_country_count(
    table: &CaseTable,
    day: i64,
    month: i64,
    year: i64,
) -> Result<usize> {
    log::debug!("unchanged_case_country_count date={day}/{month}/{year}");
    let current = calendar_date(day, month, year)?;
    let previous = current.pred_opt().ok_or_else(|| {
        QueryError::InvalidArgument(format!("no day before {current}"))
    })?;

    let current_col = calendar_column(table, current)?;
    let previous_col = calendar_column(table, previous)?;

    let today = group_by_country(table, current_col, u64::max);
    let yesterday = group_by_country(table, previous_col, u64::max);
    if today.len() != yesterday.len() {
        log::warn!(
            "per-country groupings differ in length ({} vs {}); comparing overlap only",
            today.len(),
            yesterday.len()
        );
    }

    Ok(today
        .iter()
        .zip(yesterday.iter())
        .filter(|(a, b)| a.1 == b.1)
        .count())
}

fn calendar_date(day: i64, month: i64, year: i64) -> Result<NaiveDate> {
    let invalid = || {
        QueryError::InvalidArgument(format!("{day}/{month}/{year} is not a calendar date"))
    };
    let day = u32::try_from(day).map_err(|_| invalid())?;
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let year = i32::try_from(year).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn calendar_column(table: &CaseTable, date: NaiveDate) -> Result<usize> {
    let label = column_label_for(date);
    table
        .column_of(&label)
        .ok_or_else(|| QueryError::InvalidArgument(format!("no date column '{label}'")))
}

// ---------------------------------------------------------------------------
// Method-style access
// ---------------------------------------------------------------------------

impl CaseTable {
    pub fn cases_by_country_and_date(&self, country: &str, date: CaseDate) -> Result<u64> {
        cases_by_country_and_date(
            self,
            country,
            date.day().into(),
            date.month().into(),
            date.year().into(),
        )
    }

    pub fn top_n_countries_by_date(&self, date: CaseDate, n: usize) -> Result<Vec<String>> {
        top_n_countries_by_date(self, date.day().into(), date.month().into(), date.year().into(), n)
    }

    pub fn unchanged_case_country_count(&self, date: CaseDate) -> Result<usize> {
        unchanged_case_country_count(
            self,
            date.day().into(),
            date.month().into(),
            date.year().into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_reader;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Province/State,Country/Region,Lat,Long,12/31/20,1/1/21,1/2/21
Hubei,China,30.9,112.2,100,100,130
Beijing,China,40.1,116.4,40,45,45
,Italy,43.0,12.0,80,90,90
,Peru,-9.1,-75.0,80,80,80
New South Wales,Australia,-33.8,151.2,5,5,7
Victoria,Australia,-37.8,144.9,9,9,9
";

    fn sample() -> CaseTable {
        load_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn cases_use_first_matching_row() {
        let table = sample();
        assert_eq!(cases_by_country_and_date(&table, "China", 1, 1, 2021), Ok(100));
        assert_eq!(cases_by_country_and_date(&table, "Australia", 2, 1, 2021), Ok(7));
    }

    #[test]
    fn cases_report_missing_country_and_column() {
        let table = sample();
        assert!(matches!(
            cases_by_country_and_date(&table, "Atlantis", 1, 1, 2021),
            Err(QueryError::NotFound(_))
        ));
        assert!(matches!(
            cases_by_country_and_date(&table, "China", 3, 1, 2021),
            Err(QueryError::NotFound(_))
        ));
        assert!(matches!(
            cases_by_country_and_date(&table, "", 1, 1, 2021),
            Err(QueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn top_n_sums_sub_regions_and_keeps_tie_order() {
        let table = sample();
        // China 140, Italy 80, Peru 80, Australia 14
        assert_eq!(
            top_n_countries_by_date(&table, 31, 12, 2020, 5).unwrap(),
            vec!["China", "Italy", "Peru", "Australia"]
        );
        assert_eq!(
            top_n_countries_by_date(&table, 31, 12, 2020, 2).unwrap(),
            vec!["China", "Italy"]
        );
        assert!(top_n_countries_by_date(&table, 31, 12, 2020, 0).unwrap().is_empty());
    }

    #[test]
    fn top_n_validates_dates() {
        let table = sample();
        assert!(matches!(
            top_n_countries_by_date(&table, 0, 12, 2020, 5),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            top_n_countries_by_date(&table, 30, 12, 2020, 5),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn unchanged_count_crosses_year_boundary() {
        let table = sample();
        // max per country 12/31 -> 1/1: Australia 9=9, China 100=100, Italy 80!=90, Peru 80=80
        assert_eq!(unchanged_case_country_count(&table, 1, 1, 2021), Ok(3));
        // Australia 9=9, China 130!=100, Italy 90=90, Peru 80=80
        assert_eq!(unchanged_case_country_count(&table, 2, 1, 2021), Ok(3));
    }

    #[test]
    fn unchanged_count_needs_both_columns_and_a_real_date() {
        let table = sample();
        assert!(matches!(
            unchanged_case_country_count(&table, 31, 12, 2020),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            unchanged_case_country_count(&table, 30, 2, 2020),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            unchanged_case_country_count(&table, 0, 1, 2021),
            Err(QueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn methods_match_free_functions() {
        let table = sample();
        let date = CaseDate::new(1, 1, 2021).unwrap();
        assert_eq!(table.cases_by_country_and_date("Italy", date), Ok(90));
        assert_eq!(
            table.top_n_countries_by_date(date, 1).unwrap(),
            vec!["China".to_string()]
        );
        assert_eq!(table.unchanged_case_country_count(date), Ok(3));
    }
}
