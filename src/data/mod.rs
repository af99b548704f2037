/// Data layer: core types, loading, and queries.
///
/// Architecture:
/// ```text
///  time_series_19-covid-Confirmed.csv  (URL or path)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → CaseTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ CaseTable │  Vec<RegionRow>, date column index
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  per-country grouping → counts, rankings
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod query;
