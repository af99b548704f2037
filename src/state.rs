use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;

use crate::config::SourceConfig;
use crate::data::loader::load_source;
use crate::data::model::CaseTable;

// ---------------------------------------------------------------------------
// Process-wide table
// ---------------------------------------------------------------------------

/// Outcome of the one load attempt per process: the table, or the rendered
/// load error. Never replaced once set.
static CONFIRMED_CASES: OnceCell<std::result::Result<CaseTable, String>> = OnceCell::new();

/// Load the table from `config` unless a load was already attempted.
///
/// A later call returns the outcome of the first attempt, whatever its
/// config: the loaded table, or the same load failure.
pub fn init(config: &SourceConfig) -> Result<&'static CaseTable> {
    if CONFIRMED_CASES.get().is_some() {
        log::info!("confirmed cases load already attempted; ignoring source {}", config.source);
    }
    let outcome = CONFIRMED_CASES.get_or_init(|| {
        load_source(&config.source).map_err(|err| {
            log::error!("failed to load confirmed cases: {err:#}");
            format!("{err:#}")
        })
    });
    match outcome {
        Ok(table) => Ok(table),
        Err(message) => Err(anyhow!("confirmed cases are unavailable: {message}")),
    }
}

/// Shared table, loading it from [`SourceConfig::from_env`] on first use.
pub fn confirmed_cases() -> Result<&'static CaseTable> {
    match CONFIRMED_CASES.get() {
        Some(Ok(table)) => Ok(table),
        Some(Err(message)) => Err(anyhow!("confirmed cases are unavailable: {message}")),
        None => init(&SourceConfig::from_env()),
    }
}

pub fn is_loaded() -> bool {
    matches!(CONFIRMED_CASES.get(), Some(Ok(_)))
}
