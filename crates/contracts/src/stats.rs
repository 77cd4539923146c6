//! StatsUpdate - counters reported after each generated batch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Total requests pushed to the feed since start
pub const PUSHED_SINCE_START: &str = "pushed_since_start";
/// Total batches generated since start
pub const BATCHES_AFTER_START: &str = "batches_after_start";
/// Size of the most recent batch
pub const LAST_BATCH_SIZE: &str = "last_batch_size";
/// Wall-clock time of the most recent batch
pub const LAST_BATCH_GENERATED: &str = "last_batch_generated";

/// Value stored under a stats name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl StatValue {
    /// Integer value, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<DateTime<Utc>> for StatValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One stats submission
///
/// Increments are added to the stored values, replacements overwrite them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsUpdate {
    pub increments: BTreeMap<String, i64>,
    pub replacements: BTreeMap<String, StatValue>,
}

impl StatsUpdate {
    /// Empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `name`
    pub fn increment(mut self, name: impl Into<String>, delta: i64) -> Self {
        *self.increments.entry(name.into()).or_insert(0) += delta;
        self
    }

    /// Overwrite `name` with `value`
    pub fn replace(mut self, name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.replacements.insert(name.into(), value.into());
        self
    }

    /// True when the update carries nothing
    pub fn is_empty(&self) -> bool {
        self.increments.is_empty() && self.replacements.is_empty()
    }
}

/// Sink for stats updates
///
/// The batch generator only submits; it never reads values back.
pub trait StatsRecorder: Send + Sync {
    /// Apply one update
    fn update(&self, update: StatsUpdate);
}
