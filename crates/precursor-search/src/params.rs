//! Search configuration and resource limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Traversal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[display("bfs")]
    Bfs,
    #[display("dfs")]
    Dfs,
    #[display("a_star")]
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Bfs, Strategy::Dfs, Strategy::AStar];
}

/// Heuristic used by A*.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    /// Estimated steps remaining, from historical steps-to-failure observations.
    #[default]
    TimeToFailure,
    /// Distance in bin space to the nearest failure state.
    SensorDistance,
}

/// Distance over bin-ordinal tuples for [`HeuristicKind::SensorDistance`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Hamming,
    Euclidean,
}

/// Invalid search parameter.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamsError {
    #[display("a_star_weight must be a finite non-negative number, got {value}")]
    InvalidWeight { value: f64 },
    #[display("edge_cost must be a finite positive number, got {value}")]
    InvalidEdgeCost { value: f64 },
    #[display("strategies must name at least one search strategy")]
    NoStrategies,
}

/// Search parameters as read from the search configuration file.
///
/// Every field is optional in the file and falls back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Maximum number of edges in a discovered path.
    pub max_depth: usize,
    /// Steps before a failure within which a transition counts as leading to it.
    pub lookback_window: usize,
    /// Minimum number of states in a retained sequence.
    pub min_pattern_length: usize,
    pub heuristic: HeuristicKind,
    /// Multiplier applied to the heuristic (weighted A*).
    pub a_star_weight: f64,
    pub distance_metric: DistanceMetric,
    /// Cost of traversing one edge.
    pub edge_cost: f64,
    pub strategies: Vec<Strategy>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            lookback_window: 50,
            min_pattern_length: 3,
            heuristic: HeuristicKind::default(),
            a_star_weight: 1.0,
            distance_metric: DistanceMetric::default(),
            edge_cost: 1.0,
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.a_star_weight.is_finite() || self.a_star_weight < 0.0 {
            return Err(ParamsError::InvalidWeight {
                value: self.a_star_weight,
            });
        }
        if !self.edge_cost.is_finite() || self.edge_cost <= 0.0 {
            return Err(ParamsError::InvalidEdgeCost {
                value: self.edge_cost,
            });
        }
        if self.strategies.is_empty() {
            return Err(ParamsError::NoStrategies);
        }
        Ok(())
    }
}

/// Caps that keep a search run bounded.
///
/// Hitting any of them ends the affected search early; what was found so far
/// is returned and the corresponding [`Truncation`](crate::Truncation) flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_paths_per_start: usize,
    pub max_total_paths: usize,
    pub max_expansions_per_start: usize,
    /// Wall-clock budget for one strategy run. Runs are only reproducible without it.
    pub time_budget: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_paths_per_start: 5,
            max_total_paths: 100,
            max_expansions_per_start: 10_000,
            time_budget: None,
        }
    }
}
