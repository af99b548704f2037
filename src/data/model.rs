use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{QueryError, Result};

/// Year assumed when a caller does not name one.
pub const DEFAULT_YEAR: i64 = 2020;

/// Number of countries returned by the top-N query when `n` is not given.
pub const DEFAULT_TOP_N: usize = 5;

/// First year covered by the source data.
const FIRST_YEAR: i64 = 2020;

// ---------------------------------------------------------------------------
// CaseDate – a validated query date
// ---------------------------------------------------------------------------

/// A day/month/year triple that passed the range checks every query applies.
///
/// The parts are not required to form a real calendar date: `31/2/2020` is
/// accepted here and simply has no column in the table. Call
/// [`CaseDate::to_calendar`] when calendar arithmetic is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaseDate {
    day: u32,
    month: u32,
    year: i32,
}

impl CaseDate {
    /// Validate raw integer parts: `day >= 1`, `month >= 1`, `year >= 2020`.
    pub fn new(day: i64, month: i64, year: i64) -> Result<Self> {
        if day < 1 {
            return Err(QueryError::InvalidArgument(format!("day must be >= 1, got {day}")));
        }
        if month < 1 {
            return Err(QueryError::InvalidArgument(format!(
                "month must be >= 1, got {month}"
            )));
        }
        if year < FIRST_YEAR {
            return Err(QueryError::InvalidArgument(format!(
                "no data before {FIRST_YEAR}, got year {year}"
            )));
        }

        let day = u32::try_from(day)
            .map_err(|_| QueryError::InvalidArgument(format!("day {day} is out of range")))?;
        let month = u32::try_from(month)
            .map_err(|_| QueryError::InvalidArgument(format!("month {month} is out of range")))?;
        let year = i32::try_from(year)
            .map_err(|_| QueryError::InvalidArgument(format!("year {year} is out of range")))?;

        Ok(CaseDate { day, month, year })
    }

    /// Same as [`CaseDate::new`] with the year set to [`DEFAULT_YEAR`].
    pub fn in_default_year(day: i64, month: i64) -> Result<Self> {
        Self::new(day, month, DEFAULT_YEAR)
    }

    /// Parse textual parts, rejecting anything that is not an integer.
    pub fn parse_parts(day: &str, month: &str, year: &str) -> Result<Self> {
        Self::new(
            parse_integer("day", day)?,
            parse_integer("month", month)?,
            parse_integer("year", year)?,
        )
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The table column holding counts for this date, e.g. `3/7/20`.
    pub fn column_label(&self) -> String {
        format!("{}/{}/{}", self.month, self.day, self.year - 2000)
    }

    /// Convert to a calendar date, failing when the parts do not name one.
    pub fn to_calendar(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            QueryError::InvalidArgument(format!(
                "{}/{}/{} is not a calendar date",
                self.day, self.month, self.year
            ))
        })
    }
}

impl fmt::Display for CaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn parse_integer(part: &str, text: &str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| {
        QueryError::InvalidArgument(format!("{part} must be an integer, got '{text}'"))
    })
}

/// Unpadded `M/D/YY` label for a calendar date.
pub fn column_label_for(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year() % 100)
}

/// Parse an unpadded `M/D/YY` header into a calendar date.
pub fn parse_column_label(label: &str) -> Option<NaiveDate> {
    let mut parts = label.trim().split('/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let short_year = parts.next()?;
    if parts.next().is_some() || short_year.len() != 2 {
        return None;
    }
    let year: i32 = short_year.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

// ---------------------------------------------------------------------------
// RegionRow – one row of the source table
// ---------------------------------------------------------------------------

/// One country or sub-region with its cumulative confirmed counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRow {
    pub province_state: Option<String>,
    pub country_region: String,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    /// One count per date column, in [`CaseTable::date_labels`] order.
    pub counts: Vec<u64>,
}

// ---------------------------------------------------------------------------
// CaseTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded time series. Immutable once built.
#[derive(Debug, Clone)]
pub struct CaseTable {
    rows: Vec<RegionRow>,
    date_labels: Vec<String>,
    dates: Vec<NaiveDate>,
    label_index: HashMap<String, usize>,
}

impl CaseTable {
    /// Build the column index. Every row must carry one count per label.
    pub fn from_rows(date_labels: Vec<String>, rows: Vec<RegionRow>) -> anyhow::Result<Self> {
        let mut label_index = HashMap::with_capacity(date_labels.len());
        let mut dates = Vec::with_capacity(date_labels.len());

        for (idx, label) in date_labels.iter().enumerate() {
            let date = parse_column_label(label)
                .ok_or_else(|| anyhow::anyhow!("'{label}' is not an M/D/YY date column"))?;
            if label_index.insert(label.clone(), idx).is_some() {
                anyhow::bail!("duplicate date column '{label}'");
            }
            dates.push(date);
        }

        for (i, row) in rows.iter().enumerate() {
            if row.counts.len() != date_labels.len() {
                anyhow::bail!(
                    "row {i} ({}) has {} counts but the table has {} date columns",
                    row.country_region,
                    row.counts.len(),
                    date_labels.len()
                );
            }
        }

        Ok(CaseTable {
            rows,
            date_labels,
            dates,
            label_index,
        })
    }

    pub fn rows(&self) -> &[RegionRow] {
        &self.rows
    }

    /// Date column labels in source order.
    pub fn date_labels(&self) -> &[String] {
        &self.date_labels
    }

    /// Date columns as calendar dates, aligned with [`CaseTable::date_labels`].
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.iter().min().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.iter().max().copied()
    }

    /// Index into [`RegionRow::counts`] for a date column label.
    pub fn column_of(&self, label: &str) -> Option<usize> {
        self.label_index.get(label).copied()
    }

    /// Distinct country names in ascending order.
    pub fn countries(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.country_region.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn country_count(&self) -> usize {
        self.countries().len()
    }

    /// Number of rows (countries and sub-regions).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
