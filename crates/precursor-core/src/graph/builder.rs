use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{FailureHorizon, Graph};
use crate::{
    config::AdjacencyMode,
    discretize::Discretizer,
    record::HistoricalRecord,
    sample::sample_records,
    state::{State, StateId},
};

/// Resource bounds for graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLimits {
    /// Records beyond this count are sampled down before building.
    pub max_records: usize,
    /// Maximum similarity edges leaving any node.
    pub max_neighbors: usize,
    /// Seed for record sampling.
    pub sample_seed: u64,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_records: 1000,
            max_neighbors: 20,
            sample_seed: 0,
        }
    }
}

impl Graph {
    /// Builds the state graph from historical records.
    ///
    /// Records are grouped by entity and ordered by time key. Every record
    /// becomes (or joins) a state; a state is a failure state if any record
    /// mapping to it is failure-labeled. Edges are then added according to the
    /// discretizer's adjacency mode.
    ///
    /// Zero records, or zero failure-labeled records, produce a valid graph
    /// with no failure states.
    #[must_use]
    pub fn build(
        records: &[HistoricalRecord],
        discretizer: &Discretizer,
        limits: &GraphLimits,
    ) -> Self {
        let (records, sample) = sample_records(records, limits.max_records, limits.sample_seed);
        if let Some(sample) = &sample {
            tracing::warn!(
                total = sample.total_records,
                kept = sample.kept_records,
                kept_failures = sample.kept_failures,
                "sampled records before graph construction"
            );
        }

        let mut histories: BTreeMap<&str, Vec<&HistoricalRecord>> = BTreeMap::new();
        for record in records {
            histories
                .entry(record.entity_id.as_str())
                .or_default()
                .push(record);
        }
        for history in histories.values_mut() {
            history.sort_by(|a, b| a.time_key.total_cmp(&b.time_key));
        }

        let mode = match discretizer.adjacency() {
            AdjacencyMode::Auto if histories.values().any(|h| h.len() > 1) => {
                AdjacencyMode::Temporal
            }
            AdjacencyMode::Auto => AdjacencyMode::Similarity,
            mode => mode,
        };

        let mut graph = Graph::new(mode);
        graph.sample = sample;

        let mut chains = Vec::with_capacity(histories.len());
        for (entity_id, history) in &histories {
            let chain = history
                .iter()
                .map(|record| {
                    let state = State::new(*entity_id, discretizer.labels_for(record));
                    let id = graph.add_state(state);
                    graph.record_counts[id.index()] += 1;
                    if record.failure {
                        graph.mark_failure(id);
                    }
                    id
                })
                .collect::<Vec<_>>();
            for (id, horizon) in chain.iter().zip(failure_horizons(history)) {
                graph.horizons[id.index()].push(horizon);
            }
            chains.push((chain, history));
        }

        match mode {
            AdjacencyMode::Temporal => {
                for (chain, history) in &chains {
                    graph.add_temporal_edges(chain, history);
                }
            }
            AdjacencyMode::Similarity | AdjacencyMode::Auto => {
                graph.add_similarity_edges(discretizer.width(), limits.max_neighbors);
            }
        }

        let stats = graph.stats();
        tracing::debug!(
            mode = ?stats.mode,
            states = stats.states,
            edges = stats.edges,
            failure_states = stats.failure_states,
            "built state graph"
        );
        if stats.truncated_edges > 0 {
            tracing::warn!(
                truncated_edges = stats.truncated_edges,
                saturated_states = stats.saturated_states,
                max_neighbors = limits.max_neighbors,
                "neighbor cap dropped similarity edges"
            );
        }
        graph
    }

    fn add_temporal_edges(&mut self, chain: &[StateId], history: &[&HistoricalRecord]) {
        for (i, pair) in chain.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            if from != to {
                self.add_edge(from, to, history[i + 1].failure);
            }
        }
    }

    /// Connects states whose label tuples differ in exactly one position.
    ///
    /// Candidate pairs are found by bucketing states on their tuple with one
    /// position masked out, then visited in ascending `(lower, higher)` index
    /// order. Each direction of a pair is added only while its source still has
    /// room under `max_neighbors`, so a saturated node can leave an edge
    /// one-sided.
    fn add_similarity_edges(&mut self, width: usize, max_neighbors: usize) {
        let mut pairs = Vec::new();
        for position in 0..width {
            let mut buckets: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
            for (i, state) in self.states.iter().enumerate() {
                let key = state
                    .labels()
                    .iter()
                    .enumerate()
                    .filter(|(p, _)| *p != position)
                    .map(|(_, label)| label.as_str())
                    .collect();
                buckets.entry(key).or_default().push(i);
            }
            for members in buckets.values() {
                for (k, &a) in members.iter().enumerate() {
                    for &b in &members[k + 1..] {
                        if self.states[a].labels()[position] != self.states[b].labels()[position] {
                            pairs.push((a, b));
                        }
                    }
                }
            }
        }
        pairs.sort_unstable();

        for (a, b) in pairs {
            let (a, b) = (StateId::new(a), StateId::new(b));
            self.add_capped_edge(a, b, max_neighbors);
            self.add_capped_edge(b, a, max_neighbors);
        }
    }

    fn add_capped_edge(&mut self, from: StateId, to: StateId, max_neighbors: usize) {
        if self.adjacency[from.index()].len() < max_neighbors {
            let leads_to_failure = self.is_failure(to);
            self.add_edge(from, to, leads_to_failure);
        } else {
            self.truncated_edges += 1;
            self.saturated[from.index()] = true;
        }
    }
}

/// Steps from each record to the entity's next failure record.
///
/// Records with no later failure are censored at the distance to the last record.
fn failure_horizons(history: &[&HistoricalRecord]) -> Vec<FailureHorizon> {
    let last = history.len().saturating_sub(1);
    let mut next_failure = None;
    let mut horizons = vec![(0, true); history.len()];
    for (i, record) in history.iter().enumerate().rev() {
        if record.failure {
            next_failure = Some(i);
        }
        horizons[i] = match next_failure {
            Some(j) => (j - i, false),
            None => (last - i, true),
        };
    }
    horizons
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::config::GraphConfig;

    fn config(adjacency: &str) -> Discretizer {
        let config: GraphConfig = serde_json::from_value(json!({
            "discretization": {
                "Temperature": { "bins": [0, 30, 50, 70, 100], "labels": ["low", "medium", "high", "very_high"] },
                "Vibration_Level": { "bins": [0, 3.0, 6.0, 10.0], "labels": ["low", "medium", "high"] },
                "Pressure": { "bins": [0, 200, 350, 500], "labels": ["low", "medium", "high"] }
            },
            "state_components": ["Temperature", "Vibration_Level", "Pressure"],
            "adjacency": adjacency
        }))
        .unwrap();
        config.validate().unwrap()
    }

    fn record(
        entity: &str,
        minute: u32,
        t: f64,
        v: f64,
        p: f64,
        failure: bool,
    ) -> HistoricalRecord {
        let time = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, minute, 0)
            .unwrap();
        HistoricalRecord::new(entity, crate::record::TimeKey::Timestamp(time), failure)
            .with_sensor("Temperature", t)
            .with_sensor("Vibration_Level", v)
            .with_sensor("Pressure", p)
    }

    fn one_per_entity() -> Vec<HistoricalRecord> {
        // labels: (t, v, p)
        vec![
            record("M1", 0, 10.0, 1.0, 100.0, false), // low low low
            record("M2", 0, 40.0, 1.0, 100.0, false), // medium low low
            record("M3", 0, 40.0, 4.0, 100.0, false), // medium medium low
            record("M4", 0, 40.0, 4.0, 400.0, true),  // medium medium high
            record("M5", 0, 80.0, 8.0, 400.0, false), // very_high high high
        ]
    }

    mod temporal {
        use super::*;

        #[test]
        fn test_simple_sequence() {
            let records = vec![
                record("M1", 20, 65.0, 7.0, 400.0, true),
                record("M1", 0, 25.0, 1.0, 100.0, false),
                record("M1", 10, 45.0, 4.0, 250.0, false),
            ];
            let graph = Graph::build(&records, &config("auto"), &GraphLimits::default());

            assert_eq!(graph.mode(), AdjacencyMode::Temporal);
            assert_eq!(graph.len(), 3);
            assert_eq!(graph.edge_count(), 2);
            assert_eq!(graph.failure_count(), 1);

            // Ordered by time: low..., medium..., high...
            let first = StateId::new(0);
            assert_eq!(graph.state(first).labels(), &["low", "low", "low"]);
            let second = graph.neighbors(first).next().unwrap();
            let third = graph.neighbors(second).next().unwrap();
            assert!(graph.is_failure(third));
            assert!(graph.edges(second)[0].leads_to_failure);
            assert!(!graph.edges(first)[0].leads_to_failure);
        }

        #[test]
        fn test_edges_do_not_cross_entities() {
            let records = vec![
                record("M1", 0, 10.0, 1.0, 100.0, false),
                record("M1", 10, 40.0, 1.0, 100.0, true),
                record("M2", 0, 10.0, 1.0, 100.0, false),
            ];
            let graph = Graph::build(&records, &config("temporal"), &GraphLimits::default());
            assert_eq!(graph.len(), 3);
            assert_eq!(graph.edge_count(), 1);
            let m2 = graph
                .state_id(&State::new("M2", ["low", "low", "low"]))
                .unwrap();
            assert_eq!(graph.edges(m2).len(), 0);
        }

        #[test]
        fn test_union_failure_policy_and_record_counts() {
            let records = vec![
                record("M1", 0, 10.0, 1.0, 100.0, false),
                record("M1", 10, 40.0, 1.0, 100.0, false),
                record("M1", 20, 10.0, 1.0, 100.0, true),
            ];
            let graph = Graph::build(&records, &config("auto"), &GraphLimits::default());
            let low = graph
                .state_id(&State::new("M1", ["low", "low", "low"]))
                .unwrap();
            assert_eq!(graph.len(), 2);
            assert!(graph.is_failure(low));
            assert_eq!(graph.record_count(low), 2);
            // low -> medium -> low forms a cycle of two distinct edges
            assert_eq!(graph.edge_count(), 2);
        }

        #[test]
        fn test_repeated_state_has_no_self_loop() {
            let records = vec![
                record("M1", 0, 10.0, 1.0, 100.0, false),
                record("M1", 10, 11.0, 1.0, 100.0, false),
            ];
            let graph = Graph::build(&records, &config("temporal"), &GraphLimits::default());
            assert_eq!(graph.len(), 1);
            assert_eq!(graph.edge_count(), 0);
        }

        #[test]
        fn test_failure_horizons() {
            let records = vec![
                record("M1", 0, 10.0, 1.0, 100.0, false),
                record("M1", 10, 40.0, 1.0, 100.0, false),
                record("M1", 20, 40.0, 4.0, 100.0, true),
                record("M1", 30, 80.0, 8.0, 400.0, false),
            ];
            let graph = Graph::build(&records, &config("auto"), &GraphLimits::default());
            let horizons = (0..4)
                .map(|i| graph.failure_horizons(StateId::new(i)).to_vec())
                .collect::<Vec<_>>();
            assert_eq!(
                horizons,
                vec![vec![(2, false)], vec![(1, false)], vec![(0, false)], vec![(0, true)]]
            );
        }
    }

    mod similarity {
        use super::*;

        #[test]
        fn test_one_snapshot_per_entity() {
            let graph = Graph::build(&one_per_entity(), &config("auto"), &GraphLimits::default());
            assert_eq!(graph.mode(), AdjacencyMode::Similarity);
            assert!(graph.len() <= 5);
            assert_eq!(graph.failure_count(), 1);

            for from in graph.ids() {
                for to in graph.neighbors(from) {
                    assert_eq!(graph.state(from).hamming_distance(graph.state(to)), 1);
                }
            }
            // M1-M2, M2-M3, M3-M4 in both directions
            assert_eq!(graph.edge_count(), 6);
        }

        #[test]
        fn test_edges_are_symmetric_without_saturation() {
            let graph = Graph::build(&one_per_entity(), &config("auto"), &GraphLimits::default());
            for from in graph.ids() {
                for to in graph.neighbors(from) {
                    assert!(graph.has_edge(to, from));
                }
            }
            assert_eq!(graph.stats().truncated_edges, 0);
        }

        #[test]
        fn test_edge_to_failure_is_tagged() {
            let graph = Graph::build(&one_per_entity(), &config("auto"), &GraphLimits::default());
            let failure = graph.failure_states().next().unwrap();
            for &pred in graph.predecessors(failure) {
                let edge = graph
                    .edges(pred)
                    .iter()
                    .find(|e| e.target == failure)
                    .unwrap();
                assert!(edge.leads_to_failure);
            }
        }

        #[test]
        fn test_saturated_cap_breaks_symmetry() {
            // Three states that all differ from each other in the first position only.
            let records = vec![
                record("A", 0, 10.0, 1.0, 100.0, false),
                record("B", 0, 40.0, 1.0, 100.0, false),
                record("C", 0, 60.0, 1.0, 100.0, true),
            ];
            let limits = GraphLimits {
                max_neighbors: 1,
                ..GraphLimits::default()
            };
            let graph = Graph::build(&records, &config("similarity"), &limits);
            let [a, b, c] = [0, 1, 2].map(StateId::new);

            assert!(graph.has_edge(a, b));
            assert!(graph.has_edge(b, a));
            // A was saturated by B before C was considered, C was not.
            assert!(graph.has_edge(c, a));
            assert!(!graph.has_edge(a, c));
            assert!(!graph.has_edge(b, c));
            assert!(!graph.has_edge(c, b));

            for id in graph.ids() {
                assert!(graph.edges(id).len() <= 1);
            }
            let stats = graph.stats();
            assert_eq!(stats.truncated_edges, 3);
            assert_eq!(stats.saturated_states, 3);
            assert!(stats.is_partial());
        }

        #[test]
        fn test_identical_labels_across_entities_are_not_connected() {
            let records = vec![
                record("A", 0, 10.0, 1.0, 100.0, false),
                record("B", 0, 10.0, 1.0, 100.0, true),
            ];
            let graph = Graph::build(&records, &config("similarity"), &GraphLimits::default());
            assert_eq!(graph.len(), 2);
            assert_eq!(graph.edge_count(), 0);
        }

        #[test]
        fn test_forced_similarity_on_temporal_data() {
            let records = vec![
                record("M1", 0, 10.0, 1.0, 100.0, false),
                record("M1", 10, 40.0, 1.0, 100.0, true),
            ];
            let graph = Graph::build(&records, &config("similarity"), &GraphLimits::default());
            assert_eq!(graph.mode(), AdjacencyMode::Similarity);
            assert_eq!(graph.edge_count(), 2);
        }
    }

    mod degenerate {
        use super::*;

        #[test]
        fn test_no_records() {
            let graph = Graph::build(&[], &config("auto"), &GraphLimits::default());
            assert!(graph.is_empty());
            assert_eq!(graph.failure_count(), 0);
        }

        #[test]
        fn test_no_failures() {
            let mut records = one_per_entity();
            for r in &mut records {
                r.failure = false;
            }
            let graph = Graph::build(&records, &config("auto"), &GraphLimits::default());
            assert_eq!(graph.len(), 5);
            assert_eq!(graph.failure_count(), 0);
        }

        #[test]
        fn test_missing_sensors_resolve_to_unknown() {
            let records = vec![
                HistoricalRecord::new("M1", crate::record::TimeKey::Ordinal(0), true)
                    .with_sensor("Temperature", 10.0),
            ];
            let graph = Graph::build(&records, &config("auto"), &GraphLimits::default());
            let state = graph.state(StateId::new(0));
            assert_eq!(state.labels().len(), 3);
            assert_eq!(state.labels(), &["low", "unknown", "unknown"]);
        }

        #[test]
        fn test_sampling_is_recorded() {
            let records = (0..50)
                .map(|i| record(&format!("M{i}"), 0, 10.0, 1.0, 100.0, i == 7))
                .collect::<Vec<_>>();
            let limits = GraphLimits {
                max_records: 10,
                ..GraphLimits::default()
            };
            let graph = Graph::build(&records, &config("auto"), &limits);
            assert_eq!(graph.len(), 10);
            assert_eq!(graph.failure_count(), 1);
            let sample = graph.stats().sample.unwrap();
            assert_eq!(sample.total_records, 50);
            assert_eq!(sample.kept_records, 10);
        }
    }
}
