//! CSV and JSON shell around the engine: event import, score/feature export, settings loading.

mod normalizer;
mod parser;
mod writer;

pub use parser::ImportStats;

use crate::readiness::domain::Event;
use crate::readiness::features::FeatureRecord;
use crate::readiness::pipeline::ReadinessSettings;
use crate::readiness::scoring::ScoreRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};
use writer::{FeatureRow, ScoreRow};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to access batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Events read from one CSV export.
#[derive(Debug, Clone)]
pub struct EventImport {
    pub events: Vec<Event>,
    pub stats: ImportStats,
}

pub struct EventImporter;

impl EventImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<EventImport, BatchError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let import = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = import.stats.rows,
            imported = import.stats.imported,
            skipped = import.stats.skipped,
            "imported events"
        );
        Ok(import)
    }

    /// Malformed rows are skipped and counted; only I/O failures abort the import.
    pub fn from_reader<R: Read>(reader: R) -> Result<EventImport, BatchError> {
        let (events, stats) = parser::parse_events(reader)?;
        if stats.skipped > 0 {
            warn!(
                skipped = stats.skipped,
                rows = stats.rows,
                "some event rows were skipped"
            );
        }
        Ok(EventImport { events, stats })
    }
}

pub struct ScoreExporter;

impl ScoreExporter {
    pub fn to_path<P: AsRef<Path>>(path: P, scores: &[ScoreRecord]) -> Result<(), BatchError> {
        let file = create_with_parents(path.as_ref())?;
        Self::to_writer(file, scores)
    }

    pub fn to_writer<W: Write>(writer: W, scores: &[ScoreRecord]) -> Result<(), BatchError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in scores {
            csv_writer.serialize(ScoreRow::from_record(record)?)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

pub struct FeatureExporter;

impl FeatureExporter {
    pub fn to_path<P: AsRef<Path>>(path: P, features: &[FeatureRecord]) -> Result<(), BatchError> {
        let file = create_with_parents(path.as_ref())?;
        Self::to_writer(file, features)
    }

    pub fn to_writer<W: Write>(writer: W, features: &[FeatureRecord]) -> Result<(), BatchError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in features {
            csv_writer.serialize(FeatureRow::from(record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Reads run settings from a JSON document; omitted sections keep their defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ReadinessSettings, BatchError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn create_with_parents(path: &Path) -> Result<File, std::io::Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path)
}
