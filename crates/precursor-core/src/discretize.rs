//! Mapping raw sensor readings to bin labels.

use std::collections::BTreeMap;

use crate::{config::AdjacencyMode, record::HistoricalRecord};

/// Label assigned to missing or non-numeric readings.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Validated half-open binning for one sensor.
///
/// `cuts` are strictly increasing interior cut-points and there is exactly one
/// more label than cut-points. A value `v` falls into bucket `i` when
/// `cuts[i - 1] <= v < cuts[i]`; the first and last buckets are open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorBins {
    sensor: String,
    cuts: Vec<f64>,
    labels: Vec<String>,
}

impl SensorBins {
    pub(crate) fn new(sensor: &str, cuts: Vec<f64>, labels: Vec<String>) -> Self {
        debug_assert_eq!(cuts.len() + 1, labels.len());
        Self {
            sensor: sensor.to_owned(),
            cuts,
            labels,
        }
    }

    #[must_use]
    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    #[must_use]
    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Bucket index for a numeric value, `None` for NaN.
    #[must_use]
    pub fn bucket(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        Some(self.cuts.partition_point(|&cut| cut <= value))
    }

    /// Label for a reading; missing or NaN readings map to [`UNKNOWN_LABEL`].
    #[must_use]
    pub fn bin(&self, value: Option<f64>) -> &str {
        value
            .and_then(|v| self.bucket(v))
            .map_or(UNKNOWN_LABEL, |i| &self.labels[i])
    }

    /// Position of `label` in this sensor's ordered labels.
    #[must_use]
    pub fn ordinal(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

/// Validated discretization configuration.
///
/// Built by [`GraphConfig::validate`](crate::GraphConfig::validate); holds one
/// [`SensorBins`] per configured sensor plus the ordered list of sensors that
/// make up a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretizer {
    rules: BTreeMap<String, SensorBins>,
    components: Vec<String>,
    adjacency: AdjacencyMode,
}

impl Discretizer {
    pub(crate) fn new(
        rules: BTreeMap<String, SensorBins>,
        components: Vec<String>,
        adjacency: AdjacencyMode,
    ) -> Self {
        debug_assert!(components.iter().all(|c| rules.contains_key(c)));
        Self {
            rules,
            components,
            adjacency,
        }
    }

    #[must_use]
    pub fn rule(&self, sensor: &str) -> Option<&SensorBins> {
        self.rules.get(sensor)
    }

    /// Sensors forming a state, in tuple order.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of labels in every state tuple.
    #[must_use]
    pub fn width(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn adjacency(&self) -> AdjacencyMode {
        self.adjacency
    }

    /// Rule of the `index`-th state component.
    #[must_use]
    pub fn component_rule(&self, index: usize) -> &SensorBins {
        &self.rules[&self.components[index]]
    }

    /// Bins a single reading. Sensors without a rule map to [`UNKNOWN_LABEL`].
    #[must_use]
    pub fn bin(&self, sensor: &str, value: Option<f64>) -> &str {
        self.rules
            .get(sensor)
            .map_or(UNKNOWN_LABEL, |rule| rule.bin(value))
    }

    /// Label tuple of a record, one label per state component.
    #[must_use]
    pub fn labels_for(&self, record: &HistoricalRecord) -> Vec<String> {
        self.components
            .iter()
            .map(|sensor| self.bin(sensor, record.sensor(sensor)).to_owned())
            .collect()
    }
}
