use chrono::{DateTime, NaiveDate, Utc};
use reform_readiness::batch::{load_settings, BatchError};
use reform_readiness::readiness::ReadinessSettings;
use std::path::{Path, PathBuf};

/// RFC 3339 instants are taken as-is; a bare date means the last millisecond of that UTC day.
pub(crate) fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD ({err})"))?;
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|end_of_day| end_of_day.and_utc())
        .ok_or_else(|| format!("'{raw}' has no end of day"))
}

pub(crate) fn parse_top(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(format!("'{raw}' is not a positive integer")),
    }
}

pub(crate) fn default_output_path(output_dir: &Path, as_of: DateTime<Utc>) -> PathBuf {
    output_dir.join(format!("scores_{}.csv", as_of.format("%Y%m%d")))
}

pub(crate) fn load_run_settings(path: Option<&Path>) -> Result<ReadinessSettings, BatchError> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(ReadinessSettings::default()),
    }
}
