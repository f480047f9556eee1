//! The shared statistics document and its update rules.
//!
//! Maps keep the key order of the stored file, so a rewrite only moves the
//! values it changes. Counters that are `null` or missing read as zero.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::stats::event::StatsEvent;

/// Key of the derived copy counter.
pub const TOTAL_KEY: &str = "total";

/// The only copy counters summed into `total`. Any other platform key is
/// counted on its own but left out of the sum (notably `darwin`).
pub const TOTAL_PLATFORMS: [&str; 3] = ["windows", "linux", "mac"];

/// Usage statistics stored as a single JSON file in a gist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDocument {
    /// Platform → copies, plus the derived `total`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub copy_counts: Map<String, Value>,

    #[serde(default)]
    pub visitors: Visitors,

    #[serde(default)]
    pub page_views: PageViews,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Fields this service does not manage, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Unique visitor registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visitors {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: u64,

    /// Fingerprint → date first seen.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fingerprints: Map<String, Value>,

    /// Date → new visitors that day.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub daily: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Page view counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageViews {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: u64,

    /// Date → views that day.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub daily: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Current value of a counter; anything that is not a number reads as zero.
fn count(counters: &Map<String, Value>, key: &str) -> u64 {
    counters.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn increment(counters: &mut Map<String, Value>, key: &str) {
    let next = count(counters, key) + 1;
    counters.insert(key.to_string(), next.into());
}

/// What an event did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Copied,
    NewVisitor,
    ReturningVisitor,
    Unchanged,
}

impl StatsDocument {
    /// Apply one event in place.
    pub fn apply(&mut self, event: &StatsEvent) -> Outcome {
        match event {
            StatsEvent::Copy { platform } => {
                self.record_copy(platform);
                Outcome::Copied
            }
            StatsEvent::PageView { fingerprint, date } => {
                if self.record_page_view(fingerprint, date) {
                    Outcome::NewVisitor
                } else {
                    Outcome::ReturningVisitor
                }
            }
            StatsEvent::Ignored => Outcome::Unchanged,
        }
    }

    /// Count a copy for `platform` and recompute the total.
    pub fn record_copy(&mut self, platform: &str) {
        increment(&mut self.copy_counts, platform);

        let total: u64 = TOTAL_PLATFORMS
            .iter()
            .map(|key| count(&self.copy_counts, key))
            .sum();
        self.copy_counts.insert(TOTAL_KEY.to_string(), total.into());
    }

    /// Count a page view; returns true when the fingerprint was unseen.
    pub fn record_page_view(&mut self, fingerprint: &str, date: &str) -> bool {
        let is_new = !self.visitors.fingerprints.contains_key(fingerprint);
        if is_new {
            self.visitors.total += 1;
            self.visitors
                .fingerprints
                .insert(fingerprint.to_string(), date.into());
            increment(&mut self.visitors.daily, date);
        }

        self.page_views.total += 1;
        increment(&mut self.page_views.daily, date);
        is_new
    }

    /// Stamp the update time, e.g. `2024-01-01T12:00:00.000Z`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    /// Serialized file content (pretty, two-space indent).
    pub fn to_content(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
