//! Incoming stats events.
//!
//! The body is loosely typed JSON. It is read as a tagged variant with
//! explicit presence checks; anything unrecognized becomes a no-op rather
//! than a rejection.

use serde_json::Value;

/// One stats update requested by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsEvent {
    /// An install command was copied for a platform.
    Copy { platform: String },
    /// A page was viewed by a (possibly returning) visitor.
    PageView { fingerprint: String, date: String },
    /// Unknown type or missing fields.
    Ignored,
}

impl StatsEvent {
    /// Interpret a raw request body. Bodies that are not JSON are ignored.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::Ignored,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        match field("type") {
            Some("copy") => match field("platform") {
                Some(platform) => Self::Copy {
                    platform: platform.to_string(),
                },
                None => Self::Ignored,
            },
            Some("pageView") => match (field("fingerprint"), field("date")) {
                (Some(fingerprint), Some(date)) => Self::PageView {
                    fingerprint: fingerprint.to_string(),
                    date: date.to_string(),
                },
                _ => Self::Ignored,
            },
            _ => Self::Ignored,
        }
    }

    /// Metric/log label for the event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "copy",
            Self::PageView { .. } => "pageView",
            Self::Ignored => "ignored",
        }
    }
}
