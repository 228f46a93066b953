//! Best-first (A*) search.
//!
//! The frontier is ordered by `f = g + w * h`, where `g` is the accumulated
//! edge cost, `h` the [`Heuristic`] estimate and `w` the configured weight.
//! Ties on `f` prefer the lower `h`, then the earlier insertion, so the
//! expansion order is fully deterministic.
//!
//! Each state is expanded at most once (closed set). The search does not stop
//! at the first failure state: it keeps popping until the frontier is empty or
//! the per-start path cap is reached, so the collected paths come out in
//! nondecreasing `f` order. With [`Heuristic::Zero`] and unit edge cost this
//! ranks paths exactly like breadth-first search.

use std::{cmp::Ordering, collections::BinaryHeap};

use precursor_core::{Graph, StateId};

use crate::{
    budget::{Budget, SearchTree},
    heuristic::Heuristic,
    params::SearchLimits,
    path::{Path, SearchOutcome},
};

/// Cost model for A*.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AStarCost {
    /// Multiplier applied to the heuristic.
    pub weight: f64,
    /// Cost of one edge.
    pub edge_cost: f64,
}

impl Default for AStarCost {
    fn default() -> Self {
        Self {
            weight: 1.0,
            edge_cost: 1.0,
        }
    }
}

/// Runs A* from `start`, collecting paths that end in a failure state.
#[must_use]
pub fn a_star(
    graph: &Graph,
    start: StateId,
    heuristic: &Heuristic,
    cost: AStarCost,
    max_depth: usize,
    limits: &SearchLimits,
) -> SearchOutcome {
    let mut budget = Budget::new(limits);
    let paths = search_from(graph, start, heuristic, cost, max_depth, &mut budget);
    SearchOutcome {
        paths,
        truncation: budget.truncation,
        starts_searched: 1,
    }
}

#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    f: f64,
    h: f64,
    sequence: usize,
    node: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // reversed: BinaryHeap pops the maximum
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

pub(crate) fn search_from(
    graph: &Graph,
    start: StateId,
    heuristic: &Heuristic,
    cost: AStarCost,
    max_depth: usize,
    budget: &mut Budget,
) -> Vec<Path> {
    let mut found = vec![];
    let mut expansions = 0;
    let mut tree = SearchTree::new(start);
    let mut closed = vec![false; graph.len()];
    let mut best_cost = vec![f64::INFINITY; graph.len()];
    best_cost[start.index()] = 0.0;

    let mut sequence = 0;
    let mut frontier = BinaryHeap::new();
    let mut push =
        |frontier: &mut BinaryHeap<FrontierEntry>, node: usize, state: StateId, g: f64| {
            let h = cost.weight * heuristic.estimate(state);
            frontier.push(FrontierEntry {
                f: g + h,
                h,
                sequence,
                node,
            });
            sequence += 1;
        };
    push(&mut frontier, tree.root(), start, 0.0);

    while let Some(entry) = frontier.pop() {
        if budget.out_of_time() {
            break;
        }
        let node = tree.node(entry.node);
        if closed[node.state.index()] {
            continue;
        }
        closed[node.state.index()] = true;

        if graph.is_failure(node.state) {
            if budget.record(&mut found, tree.path(entry.node), !frontier.is_empty()) {
                break;
            }
            continue;
        }
        if node.depth >= max_depth {
            if graph
                .neighbors(node.state)
                .any(|next| !closed[next.index()])
            {
                budget.truncation.depth_limited = true;
            }
            continue;
        }
        if !budget.try_expand(&mut expansions) {
            break;
        }
        for next in graph.neighbors(node.state) {
            if closed[next.index()] {
                continue;
            }
            let g = node.cost + cost.edge_cost;
            if g < best_cost[next.index()] {
                best_cost[next.index()] = g;
                let child = tree.extend(entry.node, next, cost.edge_cost);
                push(&mut frontier, child, next, g);
            }
        }
    }
    found
}
