use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque anonymous token correlating events; never a real-world identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Touchpoint an event was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Channel {
    Web,
    App,
    Store,
    Messaging,
    Unknown,
}

impl Channel {
    /// Lenient parse; unrecognised channels become [`Channel::Unknown`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "web" => Self::Web,
            "app" => Self::App,
            "store" => Self::Store,
            "messaging" | "whatsapp" => Self::Messaging,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Channel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// Free-form event metadata. Only read through the typed accessors below, which treat
/// anything of the wrong shape as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventProperties(Map<String, Value>);

impl EventProperties {
    /// Parses a JSON document, falling back to an empty map for invalid JSON or non-objects.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalized product category, if present as a non-blank string.
    pub fn category(&self) -> Option<String> {
        self.0
            .get("category")
            .and_then(Value::as_str)
            .and_then(normalize_token)
    }

    /// Monetary value attached to the event, accepting numbers and numeric strings.
    pub fn value(&self) -> Option<f64> {
        let value = match self.0.get("value")? {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => raw.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }
}

/// A single behavioral event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_time: DateTime<Utc>,
    pub channel: Channel,
    pub identity: Identity,
    pub event_name: String,
    #[serde(default)]
    pub properties: EventProperties,
}

impl Event {
    pub fn new(
        event_time: DateTime<Utc>,
        channel: Channel,
        identity: impl Into<String>,
        event_name: impl Into<String>,
    ) -> Self {
        Self {
            event_time,
            channel,
            identity: Identity::new(identity),
            event_name: event_name.into(),
            properties: EventProperties::default(),
        }
    }

    pub fn with_properties(mut self, properties: EventProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.properties = self.properties.with("category", category);
        self
    }

    pub(crate) fn normalized_name(&self) -> Option<String> {
        normalize_token(&self.event_name)
    }
}

/// Trims and lower-cases a vocabulary token; blank input yields `None`.
pub(crate) fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}
