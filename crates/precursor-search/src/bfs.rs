//! Breadth-first search.
//!
//! States are visited level by level from the start, so the first failure
//! state found is one with the fewest edges from the start. A state is marked
//! visited when it is enqueued, and the goal test runs when it is dequeued.
//! Paths stop at the first failure state on them; failure states are never
//! expanded.

use std::collections::VecDeque;

use precursor_core::{Graph, StateId};

use crate::{
    budget::{Budget, SearchTree},
    params::SearchLimits,
    path::{Path, SearchOutcome},
};

/// Runs breadth-first search from `start`, collecting paths that end in a failure state.
#[must_use]
pub fn breadth_first(
    graph: &Graph,
    start: StateId,
    max_depth: usize,
    limits: &SearchLimits,
) -> SearchOutcome {
    let mut budget = Budget::new(limits);
    let paths = search_from(graph, start, max_depth, &mut budget);
    SearchOutcome {
        paths,
        truncation: budget.truncation,
        starts_searched: 1,
    }
}

pub(crate) fn search_from(
    graph: &Graph,
    start: StateId,
    max_depth: usize,
    budget: &mut Budget,
) -> Vec<Path> {
    let mut found = vec![];
    let mut expansions = 0;
    let mut tree = SearchTree::new(start);
    let mut visited = vec![false; graph.len()];
    visited[start.index()] = true;
    let mut queue = VecDeque::from([tree.root()]);

    while let Some(index) = queue.pop_front() {
        if budget.out_of_time() {
            break;
        }
        let node = tree.node(index);
        if graph.is_failure(node.state) {
            if budget.record(&mut found, tree.path(index), !queue.is_empty()) {
                break;
            }
            continue;
        }
        if node.depth >= max_depth {
            if graph
                .neighbors(node.state)
                .any(|next| !visited[next.index()])
            {
                budget.truncation.depth_limited = true;
            }
            continue;
        }
        if !budget.try_expand(&mut expansions) {
            break;
        }
        for next in graph.neighbors(node.state) {
            if !visited[next.index()] {
                visited[next.index()] = true;
                queue.push_back(tree.extend(index, next, 1.0));
            }
        }
    }
    found
}
