use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::{CaseTable, RegionRow, parse_column_label};
use crate::config::DataSource;

const PROVINCE_COLUMN: &str = "Province/State";
const COUNTRY_COLUMN: &str = "Country/Region";
const LAT_COLUMN: &str = "Lat";
const LONG_COLUMN: &str = "Long";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the table from the configured source. Dispatch by source kind.
pub fn load_source(source: &DataSource) -> Result<CaseTable> {
    log::info!("loading confirmed cases from {source}");
    let table = match source {
        DataSource::Url(url) => load_url(url),
        DataSource::Path(path) => load_path(path),
    }
    .with_context(|| format!("loading confirmed cases from {source}"))?;

    log::info!(
        "loaded {} rows, {} countries, {} date columns",
        table.len(),
        table.country_count(),
        table.date_labels().len()
    );
    Ok(table)
}

/// Fetch the CSV over HTTP(S) with a blocking request.
pub fn load_url(url: &str) -> Result<CaseTable> {
    let body = reqwest::blocking::get(url)
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?
        .text()
        .with_context(|| format!("reading body from {url}"))?;
    load_reader(body.as_bytes())
}

pub fn load_path(path: &Path) -> Result<CaseTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    load_reader(file)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// CSV layout: `Province/State, Country/Region, Lat, Long, <M/D/YY>...`.
///
/// Identifier columns are found by name. Headers that are neither identifiers
/// nor dates are skipped. Rows with more fields than the header are skipped
/// with a warning. Short rows are kept and their missing trailing cells read
/// as empty.
pub fn load_reader<R: Read>(input: R) -> Result<CaseTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let country_idx = headers
        .iter()
        .position(|h| h == COUNTRY_COLUMN)
        .with_context(|| format!("CSV missing '{COUNTRY_COLUMN}' column"))?;
    let province_idx = headers.iter().position(|h| h == PROVINCE_COLUMN);
    let lat_idx = headers.iter().position(|h| h == LAT_COLUMN);
    let long_idx = headers.iter().position(|h| h == LONG_COLUMN);

    let mut date_columns: Vec<usize> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == country_idx
            || Some(idx) == province_idx
            || Some(idx) == lat_idx
            || Some(idx) == long_idx
        {
            continue;
        }
        if parse_column_label(header).is_some() {
            date_columns.push(idx);
        } else {
            log::warn!("skipping column '{header}': not an M/D/YY date");
        }
    }
    let date_labels: Vec<String> = date_columns.iter().map(|&i| headers[i].clone()).collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            log::warn!(
                "skipping CSV row {row_no}: expected at most {} fields, found {}",
                headers.len(),
                record.len()
            );
            continue;
        }

        let country_region = record.get(country_idx).unwrap_or("").trim().to_string();
        let province_state = province_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let lat = parse_coordinate(lat_idx.and_then(|i| record.get(i)), row_no, LAT_COLUMN)?;
        let long = parse_coordinate(long_idx.and_then(|i| record.get(i)), row_no, LONG_COLUMN)?;

        let counts = date_columns
            .iter()
            .map(|&col| parse_count(record.get(col).unwrap_or(""), row_no, &headers[col]))
            .collect::<Result<Vec<u64>>>()?;

        rows.push(RegionRow {
            province_state,
            country_region,
            lat,
            long,
            counts,
        });
    }

    CaseTable::from_rows(date_labels, rows)
}

/// Empty cells read as 0. A source reading them as NaN would never see two
/// empty days as equal, while here a country whose rows are empty on both
/// days compares as unchanged.
fn parse_count(s: &str, row: usize, col: &str) -> Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        log::debug!("row {row}, column {col}: empty count read as 0");
        return Ok(0);
    }
    match s.parse::<u64>() {
        Ok(v) => Ok(v),
        Err(_) => bail!("Row {row}, column {col}: '{s}' is not a case count"),
    }
}

fn parse_coordinate(s: Option<&str>, row: usize, col: &str) -> Result<Option<f64>> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(tok) => tok
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = "\
Province/State,Country/Region,Lat,Long,3/10/20,3/11/20
Hubei,China,30.9756,112.2707,67760,67773
,\"Korea, South\",36.0,128.0,7513,7755
,Poland,51.9194,19.1451,17,31
";

    #[test]
    fn reads_identifiers_and_counts() {
        let table = load_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.date_labels(), ["3/10/20", "3/11/20"]);
        assert_eq!(table.len(), 3);

        let korea = &table.rows()[1];
        assert_eq!(korea.country_region, "Korea, South");
        assert_eq!(korea.province_state, None);
        assert_eq!(korea.counts, vec![7513, 7755]);

        let hubei = &table.rows()[0];
        assert_eq!(hubei.province_state.as_deref(), Some("Hubei"));
        assert_eq!(hubei.lat, Some(30.9756));
    }

    #[test]
    fn skips_long_rows_and_keeps_short_ones() {
        let csv = "Province/State,Country/Region,Lat,Long,3/10/20,3/11/20\n\
                   ,Poland,51.9,19.1,17,31\n\
                   ,Italy,43.0,12.0,500\n\
                   ,Spain,40.0,-4.0,1,2,3\n\
                   ,Iran,32.0,53.0,8042,9000\n";
        let table = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.countries(), vec!["Iran", "Italy", "Poland"]);

        let italy = table.rows().iter().find(|r| r.country_region == "Italy").unwrap();
        assert_eq!(italy.counts, vec![500, 0]);
        assert_eq!(
            crate::data::query::top_n_countries_by_date(&table, 10, 3, 2020, 1).unwrap(),
            vec!["Iran"]
        );
        assert_eq!(
            crate::data::query::cases_by_country_and_date(&table, "Italy", 10, 3, 2020),
            Ok(500)
        );
    }

    #[test]
    fn empty_counts_read_as_zero_and_garbage_fails() {
        let csv = "Province/State,Country/Region,Lat,Long,3/11/20\n,Poland,,,\n";
        let table = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].counts, vec![0]);
        assert_eq!(table.rows()[0].lat, None);

        let csv = "Province/State,Country/Region,Lat,Long,3/11/20\n,Poland,,,many\n";
        assert!(load_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn ignores_unknown_columns_and_requires_country() {
        let csv = "Province/State,Country/Region,Lat,Long,Notes,3/11/20\n,Poland,1,2,x,31\n";
        let table = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.date_labels(), ["3/11/20"]);
        assert_eq!(table.rows()[0].counts, vec![31]);

        let csv = "Province/State,Lat,Long,3/11/20\n,1,2,31\n";
        assert!(load_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn loads_from_a_path_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = load_source(&DataSource::Path(file.path().to_path_buf())).unwrap();
        assert_eq!(table.country_count(), 3);
    }

    #[test]
    fn missing_path_is_an_error() {
        let missing = DataSource::Path("definitely/not/here.csv".into());
        let err = load_source(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("definitely/not/here.csv"));
    }
}
