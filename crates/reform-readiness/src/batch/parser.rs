use super::normalizer::clean_field;
use crate::readiness::domain::{Channel, Event, EventProperties};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

/// Row-level outcome counts for one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: usize,
    pub imported: usize,
    pub skipped: usize,
}

pub(crate) fn parse_events<R: Read>(reader: R) -> Result<(Vec<Event>, ImportStats), csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut events = Vec::new();
    let mut stats = ImportStats::default();

    for (index, record) in csv_reader.deserialize::<EventRow>().enumerate() {
        stats.rows += 1;
        // Header is line 1.
        let line = index + 2;

        let row = match record {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => {
                warn!(line, error = %err, "skipping malformed event row");
                stats.skipped += 1;
                continue;
            }
        };

        match row.into_event() {
            Ok(event) => {
                events.push(event);
                stats.imported += 1;
            }
            Err(reason) => {
                warn!(line, reason, "skipping event row");
                stats.skipped += 1;
            }
        }
    }

    Ok((events, stats))
}

#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    event_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    channel: Option<String>,
    #[serde(alias = "anon_id", default, deserialize_with = "empty_string_as_none")]
    identity: Option<String>,
    #[serde(default)]
    event_name: String,
    #[serde(
        alias = "event_props",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    properties: Option<String>,
}

impl EventRow {
    fn into_event(self) -> Result<Event, &'static str> {
        let event_time = self
            .event_time
            .as_deref()
            .ok_or("missing event_time")
            .and_then(|raw| parse_event_time(raw).ok_or("unparseable event_time"))?;

        let identity = self
            .identity
            .as_deref()
            .map(clean_field)
            .filter(|identity| !identity.is_empty())
            .ok_or("blank identity")?;

        let channel = self
            .channel
            .as_deref()
            .map(|raw| Channel::parse(&clean_field(raw)))
            .unwrap_or(Channel::Unknown);

        let properties = self
            .properties
            .as_deref()
            .map(EventProperties::from_json_str)
            .unwrap_or_default();

        Ok(Event::new(event_time, channel, identity, clean_field(&self.event_name))
            .with_properties(properties))
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Offset-less timestamps and bare dates are read as UTC; bare dates mean midnight.
pub(crate) fn parse_event_time(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = clean_field(value);
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&trimmed, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
