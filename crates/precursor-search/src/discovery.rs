//! Runs every requested strategy from the states around failures.

use precursor_core::{Discretizer, Graph, StateId};
use serde::Serialize;

use crate::{
    astar::{self, AStarCost},
    bfs,
    budget::Budget,
    dfs,
    heuristic::Heuristic,
    params::{SearchLimits, SearchParams, Strategy},
    path::{Path, SearchOutcome},
};

/// Paths found by one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyRun {
    pub strategy: Strategy,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

/// Result of [`discover`]: one run per requested strategy, in request order.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub runs: Vec<StrategyRun>,
}

impl Discovery {
    /// All paths from all runs, in run order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + Clone {
        self.runs.iter().flat_map(|run| &run.outcome.paths)
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.runs.iter().map(|run| run.outcome.paths.len()).sum()
    }

    /// Whether any run was cut short by a resource cap.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.runs.iter().any(|run| run.outcome.truncation.is_partial())
    }
}

/// States searches start from, in ascending id order.
///
/// These are the failure states themselves plus every state joined to one of
/// them by an edge in either direction.
#[must_use]
pub fn start_states(graph: &Graph) -> Vec<StateId> {
    let mut is_start = vec![false; graph.len()];
    for failure in graph.failure_states() {
        is_start[failure.index()] = true;
        for &predecessor in graph.predecessors(failure) {
            is_start[predecessor.index()] = true;
        }
        for successor in graph.neighbors(failure) {
            is_start[successor.index()] = true;
        }
    }
    graph.ids().filter(|id| is_start[id.index()]).collect()
}

/// Searches `graph` with every strategy in `params.strategies`.
///
/// Repeated strategies run once. A graph without failure states yields runs
/// with no paths.
#[must_use]
pub fn discover(
    graph: &Graph,
    discretizer: &Discretizer,
    params: &SearchParams,
    limits: &SearchLimits,
) -> Discovery {
    let starts = start_states(graph);
    let heuristic = if params.strategies.contains(&Strategy::AStar) {
        Heuristic::prepare(params.heuristic, params.distance_metric, graph, discretizer)
    } else {
        Heuristic::Zero
    };
    tracing::debug!(starts = starts.len(), "prepared discovery");

    let mut runs: Vec<StrategyRun> = vec![];
    for &strategy in &params.strategies {
        if runs.iter().any(|run| run.strategy == strategy) {
            continue;
        }
        let outcome = run_strategy(graph, &starts, strategy, &heuristic, params, limits);
        tracing::info!(
            %strategy,
            paths = outcome.paths.len(),
            starts = outcome.starts_searched,
            partial = outcome.truncation.is_partial(),
            "search finished"
        );
        if outcome.truncation.is_partial() {
            tracing::warn!(
                %strategy,
                truncation = ?outcome.truncation,
                "search was cut short by a limit"
            );
        }
        runs.push(StrategyRun { strategy, outcome });
    }
    Discovery { runs }
}

/// Runs one strategy from each of `starts` in order, sharing the total path cap and time budget.
#[must_use]
pub fn run_strategy(
    graph: &Graph,
    starts: &[StateId],
    strategy: Strategy,
    heuristic: &Heuristic,
    params: &SearchParams,
    limits: &SearchLimits,
) -> SearchOutcome {
    let mut budget = Budget::new(limits);
    let mut outcome = SearchOutcome::default();
    let cost = AStarCost {
        weight: params.a_star_weight,
        edge_cost: params.edge_cost,
    };

    for &start in starts {
        if budget.total_exhausted() {
            // start states were left unsearched
            budget.truncation.total_cap_hit = true;
            break;
        }
        if budget.out_of_time() {
            break;
        }
        let paths = match strategy {
            Strategy::Bfs => bfs::search_from(graph, start, params.max_depth, &mut budget),
            Strategy::Dfs => dfs::search_from(graph, start, params.max_depth, &mut budget),
            Strategy::AStar => {
                astar::search_from(graph, start, heuristic, cost, params.max_depth, &mut budget)
            }
        };
        outcome.starts_searched += 1;
        outcome.paths.extend(paths);
    }
    outcome.truncation = budget.truncation;
    outcome
}

#[cfg(test)]
mod tests {
    use precursor_core::{AdjacencyMode, GraphConfig, State};
    use serde_json::json;

    use super::*;
    use crate::params::HeuristicKind;

    fn discretizer() -> Discretizer {
        let config: GraphConfig = serde_json::from_value(json!({
            "discretization": {
                "level": { "bins": [1.0, 2.0, 3.0], "labels": ["a", "b", "c", "f"] }
            },
            "state_components": ["level"]
        }))
        .unwrap();
        config.validate().unwrap()
    }

    /// `x -> a -> b -> c -> f`, with `f` the failure state.
    fn chain() -> Graph {
        let mut graph = Graph::new(AdjacencyMode::Temporal);
        let ids: Vec<_> = ["x", "a", "b", "c", "f"]
            .into_iter()
            .map(|l| graph.add_state(State::new("m", [l])))
            .collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1], pair[1] == ids[4]);
        }
        graph.mark_failure(ids[4]);
        graph
    }

    #[test]
    fn test_start_states() {
        let mut graph = chain();
        assert_eq!(start_states(&graph), vec![StateId::new(3), StateId::new(4)]);

        // an edge out of the failure state adds its target
        let after = graph.add_state(State::new("m", ["after"]));
        graph.add_edge(StateId::new(4), after, false);
        assert_eq!(
            start_states(&graph),
            vec![StateId::new(3), StateId::new(4), after]
        );
    }

    #[test]
    fn test_discover_runs_each_strategy_once() {
        let graph = chain();
        let params = SearchParams {
            strategies: vec![Strategy::Dfs, Strategy::Bfs, Strategy::Dfs],
            ..SearchParams::default()
        };
        let discovery = discover(&graph, &discretizer(), &params, &SearchLimits::default());
        let strategies: Vec<_> = discovery.runs.iter().map(|run| run.strategy).collect();
        assert_eq!(strategies, vec![Strategy::Dfs, Strategy::Bfs]);
        for run in &discovery.runs {
            // from c: [c, f]; from f: [f]
            assert_eq!(run.outcome.paths.len(), 2);
            assert_eq!(run.outcome.starts_searched, 2);
        }
        assert!(discovery.paths().all(|p| p.is_valid_in(&graph)));
        assert!(!discovery.is_partial());
    }

    #[test]
    fn test_all_strategies_agree_on_chain() {
        let graph = chain();
        for heuristic in [HeuristicKind::TimeToFailure, HeuristicKind::SensorDistance] {
            let params = SearchParams {
                heuristic,
                ..SearchParams::default()
            };
            let discovery = discover(&graph, &discretizer(), &params, &SearchLimits::default());
            assert_eq!(discovery.runs.len(), 3);
            let first = &discovery.runs[0].outcome.paths;
            for run in &discovery.runs {
                assert_eq!(&run.outcome.paths, first, "{}", run.strategy);
            }
        }
    }

    #[test]
    fn test_total_cap_spans_starts() {
        let graph = chain();
        let params = SearchParams {
            strategies: vec![Strategy::Bfs],
            ..SearchParams::default()
        };
        let limits = SearchLimits {
            max_total_paths: 1,
            ..SearchLimits::default()
        };
        let discovery = discover(&graph, &discretizer(), &params, &limits);
        let outcome = &discovery.runs[0].outcome;
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(outcome.starts_searched, 1);
        assert!(outcome.truncation.total_cap_hit);
        assert!(discovery.is_partial());
    }

    #[test]
    fn test_no_failures_means_no_paths() {
        let mut graph = Graph::new(AdjacencyMode::Similarity);
        let a = graph.add_state(State::new("m", ["a"]));
        let b = graph.add_state(State::new("m", ["b"]));
        graph.add_edge(a, b, false);
        graph.add_edge(b, a, false);
        let discovery = discover(
            &graph,
            &discretizer(),
            &SearchParams::default(),
            &SearchLimits::default(),
        );
        assert_eq!(discovery.runs.len(), 3);
        assert_eq!(discovery.path_count(), 0);
        assert!(!discovery.is_partial());
    }

    #[test]
    fn test_deterministic() {
        let graph = chain();
        let run = || {
            let discovery = discover(
                &graph,
                &discretizer(),
                &SearchParams::default(),
                &SearchLimits::default(),
            );
            serde_json::to_string(&discovery).unwrap()
        };
        assert_eq!(run(), run());
    }
}
