//! Discretization configuration and its validation.
//!
//! The configuration is the JSON document supplied by the caller:
//!
//! ```json
//! {
//!   "discretization": {
//!     "Temperature": { "bins": [0, 30, 50, 70, 100], "labels": ["low", "medium", "high", "very_high"] },
//!     "Pressure": { "bins": [200, 350], "labels": ["low", "medium", "high"] }
//!   },
//!   "state_components": ["Temperature", "Pressure"],
//!   "adjacency": "auto"
//! }
//! ```
//!
//! `bins` may be given either as interior cut-points (`labels.len() == bins.len() + 1`)
//! or as a full edge list including both outer edges (`labels.len() + 1 == bins.len()`).
//! In the second form the outer edges are dropped, so values outside the listed
//! range still fall into the first or last label.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::discretize::{Discretizer, SensorBins};

/// Configuration fault detected before graph construction.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("state component '{sensor}' has no discretization entry")]
    MissingSensor { sensor: String },
    #[display(
        "sensor '{sensor}': {labels} labels do not fit {bins} bins (expected {} or {})",
        bins + 1,
        bins.saturating_sub(1)
    )]
    LabelCountMismatch {
        sensor: String,
        bins: usize,
        labels: usize,
    },
    #[display("sensor '{sensor}': bins must be strictly increasing (bins[{index}] is not)")]
    NonIncreasingBins { sensor: String, index: usize },
    #[display("sensor '{sensor}': bins[{index}] is not a finite number")]
    NonFiniteBin { sensor: String, index: usize },
    #[display("state_components is empty")]
    EmptyStateComponents,
    #[display("state component '{sensor}' is listed more than once")]
    DuplicateStateComponent { sensor: String },
}

/// Binning rule for one sensor, as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscretizationRule {
    pub bins: Vec<f64>,
    pub labels: Vec<String>,
}

/// How edges between states are derived.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyMode {
    /// Temporal when any entity has more than one record, similarity otherwise.
    #[default]
    #[display("auto")]
    Auto,
    /// Successive readings of the same entity.
    #[display("temporal")]
    Temporal,
    /// States whose labels differ in exactly one component.
    #[display("similarity")]
    Similarity,
}

/// Graph construction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub discretization: BTreeMap<String, DiscretizationRule>,
    pub state_components: Vec<String>,
    #[serde(default)]
    pub adjacency: AdjacencyMode,
}

impl DiscretizationRule {
    fn validate(&self, sensor: &str) -> Result<SensorBins, ConfigError> {
        if let Some(index) = self.bins.iter().position(|b| !b.is_finite()) {
            return Err(ConfigError::NonFiniteBin {
                sensor: sensor.to_owned(),
                index,
            });
        }
        if let Some(index) = self
            .bins
            .windows(2)
            .position(|w| w[0] >= w[1])
            .map(|i| i + 1)
        {
            return Err(ConfigError::NonIncreasingBins {
                sensor: sensor.to_owned(),
                index,
            });
        }

        let cuts = if self.labels.len() == self.bins.len() + 1 {
            self.bins.clone()
        } else if self.bins.len() >= 2 && self.labels.len() + 1 == self.bins.len() {
            self.bins[1..self.bins.len() - 1].to_vec()
        } else {
            return Err(ConfigError::LabelCountMismatch {
                sensor: sensor.to_owned(),
                bins: self.bins.len(),
                labels: self.labels.len(),
            });
        };

        Ok(SensorBins::new(sensor, cuts, self.labels.clone()))
    }
}

impl GraphConfig {
    /// Checks every rule and component reference, returning the validated discretizer.
    pub fn validate(&self) -> Result<Discretizer, ConfigError> {
        if self.state_components.is_empty() {
            return Err(ConfigError::EmptyStateComponents);
        }

        let mut seen = BTreeSet::new();
        for sensor in &self.state_components {
            if !seen.insert(sensor.as_str()) {
                return Err(ConfigError::DuplicateStateComponent {
                    sensor: sensor.clone(),
                });
            }
            if !self.discretization.contains_key(sensor) {
                return Err(ConfigError::MissingSensor {
                    sensor: sensor.clone(),
                });
            }
        }

        let rules = self
            .discretization
            .iter()
            .map(|(sensor, rule)| Ok((sensor.clone(), rule.validate(sensor)?)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Ok(Discretizer::new(
            rules,
            self.state_components.clone(),
            self.adjacency,
        ))
    }
}
