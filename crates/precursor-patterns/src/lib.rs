//! Turning discovered failure paths into ranked patterns.
//!
//! Two views are produced from the same set of paths:
//!
//! - **Failure sequences** ([`sequence`]): distinct state sequences ending in a
//!   failure state, with how often each was found, the mean number of steps
//!   to failure and the entities involved.
//! - **Warning signs** ([`warning`]): single-step transitions, scored by how
//!   often they occur on failure paths and how often the failure follows
//!   within the lookback window.
//!
//! [`report`] wraps both in the documents written by the command line tool,
//! plus a [`RunSummary`](report::RunSummary) that records sampling and
//! truncation so an empty result can be told apart from a capped one.
//!
//! # Example
//!
//! ```
//! use precursor_core::{AdjacencyMode, Graph, State};
//! use precursor_patterns::extract;
//! use precursor_search::{Path, SearchParams};
//!
//! let mut graph = Graph::new(AdjacencyMode::Temporal);
//! let [a, b, f] = ["a", "b", "f"].map(|l| graph.add_state(State::new("M1", [l])));
//! graph.add_edge(a, b, false);
//! graph.add_edge(b, f, true);
//! graph.mark_failure(f);
//!
//! let paths = [Path::new(vec![a, b, f]), Path::new(vec![b, f])];
//! let patterns = extract(&graph, &paths, &SearchParams::default());
//! assert_eq!(patterns.sequences.len(), 1);
//! assert_eq!(patterns.warning_signs[0].pattern, "M1[b] -> M1[f]");
//! ```

use precursor_core::Graph;
use precursor_search::{Path, SearchParams};

use self::{sequence::FailureSequence, warning::WarningSign};

pub mod report;
pub mod sequence;
pub mod warning;

/// Sequences and warning signs extracted from one set of paths.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Patterns {
    pub sequences: Vec<FailureSequence>,
    pub warning_signs: Vec<WarningSign>,
}

/// Aggregates `paths` into sequences and warning signs.
///
/// Sequences shorter than `params.min_pattern_length` states are dropped;
/// warning signs count transitions on every path.
pub fn extract<'a, I>(graph: &Graph, paths: I, params: &SearchParams) -> Patterns
where
    I: IntoIterator<Item = &'a Path>,
    I::IntoIter: Clone,
{
    let paths = paths.into_iter();
    let sequences = sequence::aggregate_sequences(graph, paths.clone(), params.min_pattern_length);
    let warning_signs = warning::rank_warning_signs(graph, paths, params.lookback_window);
    tracing::debug!(
        sequences = sequences.len(),
        warning_signs = warning_signs.len(),
        "extracted patterns"
    );
    Patterns {
        sequences,
        warning_signs,
    }
}

#[cfg(test)]
mod tests {
    use precursor_core::{
        AdjacencyMode, Discretizer, Graph, GraphConfig, GraphLimits, HistoricalRecord, TimeKey,
    };
    use precursor_search::{SearchLimits, Strategy, bfs::breadth_first, discover};
    use serde_json::json;

    use super::*;
    use crate::report::RunSummary;

    fn discretizer() -> Discretizer {
        let bins = json!({ "bins": [30.0, 70.0], "labels": ["low", "medium", "high"] });
        let config: GraphConfig = serde_json::from_value(json!({
            "discretization": { "temperature": bins, "vibration": bins, "pressure": bins },
            "state_components": ["temperature", "vibration", "pressure"]
        }))
        .unwrap();
        config.validate().unwrap()
    }

    fn snapshot(entity: &str, values: [f64; 3], failure: bool) -> HistoricalRecord {
        let [temperature, vibration, pressure] = values;
        HistoricalRecord::new(entity, TimeKey::Ordinal(0), failure)
            .with_sensor("temperature", temperature)
            .with_sensor("vibration", vibration)
            .with_sensor("pressure", pressure)
    }

    /// Five machines with one snapshot each; `M5` failed.
    fn fleet() -> Vec<HistoricalRecord> {
        vec![
            snapshot("M1", [10.0, 10.0, 10.0], false),
            snapshot("M2", [50.0, 10.0, 10.0], false),
            snapshot("M3", [50.0, 50.0, 10.0], false),
            snapshot("M4", [90.0, 90.0, 10.0], false),
            snapshot("M5", [50.0, 50.0, 50.0], true),
        ]
    }

    /// Runs the whole pipeline and returns the serialized output documents.
    fn run(records: &[HistoricalRecord]) -> (String, String, String) {
        let discretizer = discretizer();
        let graph = Graph::build(records, &discretizer, &GraphLimits::default());
        let params = SearchParams {
            min_pattern_length: 2,
            ..SearchParams::default()
        };
        let discovery = discover(&graph, &discretizer, &params, &SearchLimits::default());
        let patterns = extract(&graph, discovery.paths(), &params);
        let summary = RunSummary::new(&graph, &discovery, &patterns);
        (
            serde_json::to_string_pretty(&patterns.sequences_document(&graph)).unwrap(),
            serde_json::to_string_pretty(&patterns.warning_signs_document()).unwrap(),
            serde_json::to_string_pretty(&summary).unwrap(),
        )
    }

    #[test]
    fn test_snapshot_fleet_end_to_end() {
        let discretizer = discretizer();
        let graph = Graph::build(&fleet(), &discretizer, &GraphLimits::default());
        assert_eq!(graph.mode(), AdjacencyMode::Similarity);
        assert!(graph.len() <= 5);
        for from in graph.ids() {
            for to in graph.neighbors(from) {
                assert_eq!(graph.state(from).hamming_distance(graph.state(to)), 1);
            }
        }

        let failure = graph.failure_states().next().unwrap();
        assert_eq!(graph.state(failure).entity_id(), "M5");
        let neighbor = graph.predecessors(failure)[0];
        assert_eq!(graph.state(neighbor).entity_id(), "M3");
        let outcome = breadth_first(&graph, neighbor, 10, &SearchLimits::default());
        assert_eq!(outcome.paths[0].edge_count(), 1);

        let params = SearchParams {
            min_pattern_length: 2,
            ..SearchParams::default()
        };
        let discovery = discover(&graph, &discretizer, &params, &SearchLimits::default());
        assert_eq!(discovery.runs.len(), 3);
        let patterns = extract(&graph, discovery.paths(), &params);
        let document = patterns.sequences_document(&graph);
        assert_eq!(
            document.sequences[0].sequence,
            vec!["M3[medium, medium, low]", "M5[medium, medium, medium]"]
        );
        assert_eq!(document.sequences[0].machines, vec!["M3", "M5"]);
        // bfs, dfs and a_star each find it from M3
        assert_eq!(document.sequences[0].frequency, 3);
        assert_eq!(
            patterns.warning_signs[0].pattern,
            "M3[medium, medium, low] -> M5[medium, medium, medium]"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let records = fleet();
        assert_eq!(run(&records), run(&records));
    }

    #[test]
    fn test_no_failures_yield_empty_outputs() {
        let records: Vec<_> = fleet()
            .into_iter()
            .map(|mut record| {
                record.failure = false;
                record
            })
            .collect();
        let discretizer = discretizer();
        let graph = Graph::build(&records, &discretizer, &GraphLimits::default());
        assert_eq!(graph.failure_count(), 0);
        let discovery = discover(
            &graph,
            &discretizer,
            &SearchParams::default(),
            &SearchLimits::default(),
        );
        assert_eq!(discovery.path_count(), 0);
        let patterns = extract(&graph, discovery.paths(), &SearchParams::default());
        assert_eq!(patterns, Patterns::default());

        let (sequences, warning_signs, _) = run(&records);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&sequences).unwrap(),
            json!({ "sequences": [] })
        );
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&warning_signs).unwrap(),
            json!({ "warning_signs": [] })
        );
    }

    #[test]
    fn test_empty_input() {
        let discretizer = discretizer();
        let graph = Graph::build(&[], &discretizer, &GraphLimits::default());
        assert!(graph.is_empty());
        let discovery = discover(
            &graph,
            &discretizer,
            &SearchParams::default(),
            &SearchLimits::default(),
        );
        let patterns = extract(&graph, discovery.paths(), &SearchParams::default());
        let summary = RunSummary::new(&graph, &discovery, &patterns);
        assert!(!summary.partial);
        assert_eq!(summary.sequences, 0);
    }

    #[test]
    fn test_summary_reports_truncation() {
        let discretizer = discretizer();
        let graph = Graph::build(&fleet(), &discretizer, &GraphLimits::default());
        let params = SearchParams {
            strategies: vec![Strategy::Bfs],
            ..SearchParams::default()
        };
        let limits = SearchLimits {
            max_total_paths: 1,
            ..SearchLimits::default()
        };
        let discovery = discover(&graph, &discretizer, &params, &limits);
        let patterns = extract(&graph, discovery.paths(), &params);
        let summary = RunSummary::new(&graph, &discovery, &patterns);
        assert!(summary.partial);
        assert!(summary.strategies[0].truncation.total_cap_hit);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["strategies"][0]["strategy"], "bfs");
    }
}
