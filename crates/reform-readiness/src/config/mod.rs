use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_EVENTS_CSV: &str = "data/sample/events_sample.csv";
const DEFAULT_OUTPUT_DIR: &str = "data/processed";
const DEFAULT_TOP_N: usize = 5;

/// Distinguishes runtime behavior for different stages of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the scoring job.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub job: JobConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("READINESS_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let events_csv = env::var("READINESS_EVENTS_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_EVENTS_CSV));
        let output_dir = env::var("READINESS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let settings = env::var("READINESS_SETTINGS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let top_n = match env::var("READINESS_TOP_N") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidTopN { value: raw }),
            },
            Err(_) => DEFAULT_TOP_N,
        };

        let log_level = env::var("READINESS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            job: JobConfig {
                events_csv,
                output_dir,
                settings,
                top_n,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Default inputs and outputs for a batch run; CLI flags override each of them.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub events_csv: PathBuf,
    pub output_dir: PathBuf,
    pub settings: Option<PathBuf>,
    pub top_n: usize,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTopN { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTopN { value } => {
                write!(f, "READINESS_TOP_N must be a positive integer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
