use std::fmt;
use std::path::PathBuf;

/// Daily time series of confirmed cases published by JHU CSSE.
pub const CONFIRMED_CASES_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_19-covid-Confirmed.csv";

/// Environment variable overriding where the table is read from.
pub const SOURCE_ENV_VAR: &str = "CONFIRMED_CASES_SOURCE";

/// Where the confirmed-cases CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    Path(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` values are URLs; anything else is a path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Url(value.to_string())
        } else {
            DataSource::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub source: DataSource,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Url(CONFIRMED_CASES_URL.to_string()),
        }
    }
}

impl SourceConfig {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DataSource::Path(path.into()),
        }
    }

    /// Read [`SOURCE_ENV_VAR`], falling back to the published URL.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(SOURCE_ENV_VAR).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Self {
                source: DataSource::parse(v),
            },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_blank_uses_published_url() {
        assert_eq!(SourceConfig::from_value(None), SourceConfig::default());
        assert_eq!(SourceConfig::from_value(Some("  ")), SourceConfig::default());
        assert_eq!(
            SourceConfig::default().source,
            DataSource::Url(CONFIRMED_CASES_URL.to_string())
        );
    }

    #[test]
    fn values_split_into_urls_and_paths() {
        assert_eq!(
            SourceConfig::from_value(Some("https://example.org/c.csv")).source,
            DataSource::Url("https://example.org/c.csv".into())
        );
        assert_eq!(
            SourceConfig::from_value(Some("data/c.csv")).source,
            DataSource::Path(PathBuf::from("data/c.csv"))
        );
    }
}
