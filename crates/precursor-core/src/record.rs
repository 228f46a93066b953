use std::{cmp::Ordering, collections::BTreeMap};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Ordering key of a record within its entity's history.
///
/// Data sources differ in how they express time: wall-clock timestamps,
/// cumulative runtime, or plain row order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TimeKey {
    Timestamp(NaiveDateTime),
    Runtime(f64),
    Ordinal(u64),
}

impl TimeKey {
    /// Numeric projection used when comparing keys of different kinds.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            TimeKey::Timestamp(ts) => {
                let utc = ts.and_utc();
                utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9
            }
            TimeKey::Runtime(hours) => *hours,
            TimeKey::Ordinal(n) => *n as f64,
        }
    }

    /// Total order over time keys.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TimeKey::Timestamp(a), TimeKey::Timestamp(b)) => a.cmp(b),
            (TimeKey::Ordinal(a), TimeKey::Ordinal(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

/// One canonical sensor snapshot with its failure label.
///
/// Loaders normalize every source format into this shape. A sensor that is
/// absent from `sensors` (or holds NaN) is treated as unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub entity_id: String,
    pub time_key: TimeKey,
    pub sensors: BTreeMap<String, f64>,
    pub failure: bool,
}

impl HistoricalRecord {
    #[must_use]
    pub fn new(entity_id: impl Into<String>, time_key: TimeKey, failure: bool) -> Self {
        Self {
            entity_id: entity_id.into(),
            time_key,
            sensors: BTreeMap::new(),
            failure,
        }
    }

    #[must_use]
    pub fn with_sensor(mut self, name: impl Into<String>, value: f64) -> Self {
        self.sensors.insert(name.into(), value);
        self
    }

    /// Returns the numeric reading for `name`, or `None` if missing or NaN.
    #[must_use]
    pub fn sensor(&self, name: &str) -> Option<f64> {
        self.sensors.get(name).copied().filter(|v| !v.is_nan())
    }
}
