//! Remaining-distance estimates for A*.
//!
//! A [`Heuristic`] is prepared once per discovery run from the built graph and
//! then queried per state. Each variant owns the data it needs, so evaluating
//! it during search is a table lookup or a short scan over failure tuples.
//!
//! # Time to failure
//!
//! Every state carries steps-to-failure observations from the entity
//! histories that passed through it (see
//! [`Graph::failure_horizons`](precursor_core::Graph::failure_horizons)).
//! The estimate is the Kaplan-Meier median of those observations, which keeps
//! histories that never failed as censored data instead of discarding them.
//! When the curve never drops to one half, the mean of the uncensored
//! observations is used, and `1.0` when there are none.
//!
//! # Sensor distance
//!
//! Labels are mapped to their ordinal within the sensor's ordered labels, and
//! the estimate is the distance from the state's ordinal tuple to the closest
//! failure state's tuple:
//!
//! - **Hamming**: number of components whose labels differ.
//! - **Euclidean**: square root of the summed squared ordinal differences. A
//!   component that is unknown on exactly one side contributes `1`.

use precursor_core::{Discretizer, Graph, StateId};
use precursor_stats::{descriptive::mean_steps, survival::KaplanMeierCurve};

use crate::params::{DistanceMetric, HeuristicKind};

/// Estimate used when a state has no usable steps-to-failure observation.
const DEFAULT_TIME_TO_FAILURE: f64 = 1.0;

/// Per-component label ordinals; `None` for an unknown label.
type OrdinalTuple = Vec<Option<usize>>;

/// Heuristic estimate of the remaining cost to a failure state.
#[derive(Debug, Clone, PartialEq)]
pub enum Heuristic {
    /// Always `0.0`; turns A* into uniform-cost search.
    Zero,
    TimeToFailure {
        /// Estimate per state, indexed by [`StateId::index`].
        estimates: Vec<f64>,
    },
    SensorDistance {
        metric: DistanceMetric,
        /// Ordinal tuple per state, indexed by [`StateId::index`].
        tuples: Vec<OrdinalTuple>,
        /// Tuples of the failure states.
        targets: Vec<OrdinalTuple>,
    },
}

impl Heuristic {
    /// Precomputes the heuristic of `kind` for `graph`.
    #[must_use]
    pub fn prepare(
        kind: HeuristicKind,
        metric: DistanceMetric,
        graph: &Graph,
        discretizer: &Discretizer,
    ) -> Self {
        match kind {
            HeuristicKind::TimeToFailure => Self::time_to_failure(graph),
            HeuristicKind::SensorDistance => Self::sensor_distance(metric, graph, discretizer),
        }
    }

    #[must_use]
    pub fn time_to_failure(graph: &Graph) -> Self {
        let estimates = graph
            .ids()
            .map(|id| {
                if graph.is_failure(id) {
                    return 0.0;
                }
                estimate_time_to_failure(graph.failure_horizons(id))
            })
            .collect();
        Self::TimeToFailure { estimates }
    }

    #[must_use]
    pub fn sensor_distance(
        metric: DistanceMetric,
        graph: &Graph,
        discretizer: &Discretizer,
    ) -> Self {
        let tuples: Vec<OrdinalTuple> = graph
            .ids()
            .map(|id| {
                graph
                    .state(id)
                    .labels()
                    .iter()
                    .enumerate()
                    .map(|(i, label)| discretizer.component_rule(i).ordinal(label))
                    .collect()
            })
            .collect();
        let targets = graph
            .failure_states()
            .map(|id| tuples[id.index()].clone())
            .collect();
        Self::SensorDistance {
            metric,
            tuples,
            targets,
        }
    }

    /// Estimated remaining cost from `id` to the nearest failure state.
    #[must_use]
    pub fn estimate(&self, id: StateId) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::TimeToFailure { estimates } => estimates[id.index()],
            Self::SensorDistance {
                metric,
                tuples,
                targets,
            } => {
                let tuple = &tuples[id.index()];
                targets
                    .iter()
                    .map(|target| metric.distance(tuple, target))
                    .min_by(f64::total_cmp)
                    .unwrap_or(0.0)
            }
        }
    }
}

fn estimate_time_to_failure(horizons: &[(usize, bool)]) -> f64 {
    if horizons.is_empty() {
        return DEFAULT_TIME_TO_FAILURE;
    }
    KaplanMeierCurve::from_data(horizons.to_vec())
        .median_survival()
        .or_else(|| {
            mean_steps(
                horizons
                    .iter()
                    .filter(|(_, censored)| !censored)
                    .map(|(steps, _)| *steps),
            )
        })
        .unwrap_or(DEFAULT_TIME_TO_FAILURE)
}

impl DistanceMetric {
    #[expect(clippy::cast_precision_loss)]
    fn distance(self, a: &[Option<usize>], b: &[Option<usize>]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => x.abs_diff(*y),
            (None, None) => 0,
            _ => 1,
        });
        match self {
            Self::Hamming => diffs.filter(|d| *d > 0).count() as f64,
            Self::Euclidean => diffs
                .map(|d| (d * d) as f64)
                .sum::<f64>()
                .sqrt(),
        }
    }
}
