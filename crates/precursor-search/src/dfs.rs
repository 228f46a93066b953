//! Depth-first search with backtracking.
//!
//! Follows each branch in edge order until it reaches a failure state, hits
//! `max_depth` or runs out of neighbors not already on the current path, then
//! backtracks. Only states on the current path count as visited, so the same
//! state may be reached again through a different branch. This yields more
//! (and longer) paths than breadth-first search on branching graphs.

use precursor_core::{Graph, StateId};

use crate::{
    budget::Budget,
    params::SearchLimits,
    path::{Path, SearchOutcome},
};

/// Runs depth-first search from `start`, collecting paths that end in a failure state.
#[must_use]
pub fn depth_first(
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

#[derive(Debug, Clone, Copy)]
struct Frame {
    state: StateId,
    /// Index of the next edge to try.
    next_edge: usize,
}

pub(crate) fn search_from(
    graph: &Graph,
    start: StateId,
    max_depth: usize,
    budget: &mut Budget,
) -> Vec<Path> {
    let mut found = vec![];
    if graph.is_failure(start) {
        budget.record(&mut found, Path::new(vec![start]), false);
        return found;
    }

    let mut expansions = 0;
    if !budget.try_expand(&mut expansions) {
        return found;
    }
    let mut on_path = vec![false; graph.len()];
    on_path[start.index()] = true;
    let mut stack = vec![Frame {
        state: start,
        next_edge: 0,
    }];

    while let Some(&Frame { state, next_edge }) = stack.last() {
        if budget.out_of_time() {
            break;
        }
        let edges = graph.edges(state);
        let Some(offset) = edges[next_edge..]
            .iter()
            .position(|edge| !on_path[edge.target.index()])
        else {
            on_path[state.index()] = false;
            stack.pop();
            continue;
        };
        let edge_index = next_edge + offset;
        if let Some(top) = stack.last_mut() {
            top.next_edge = edge_index + 1;
        }

        let target = edges[edge_index].target;
        let depth = stack.len();
        let is_failure = graph.is_failure(target);
        if depth > max_depth || (!is_failure && depth == max_depth) {
            budget.truncation.depth_limited = true;
        } else if is_failure {
            let states = stack
                .iter()
                .map(|frame| frame.state)
                .chain([target])
                .collect();
            let pending = has_untried_edges(graph, &stack);
            if budget.record(&mut found, Path::new(states), pending) {
                break;
            }
        } else {
            if !budget.try_expand(&mut expansions) {
                break;
            }
            on_path[target.index()] = true;
            stack.push(Frame {
                state: target,
                next_edge: 0,
            });
        }
    }
    found
}

/// Whether any frame on the stack still has edges left to try.
fn has_untried_edges(graph: &Graph, stack: &[Frame]) -> bool {
    stack
        .iter()
        .any(|frame| frame.next_edge < graph.edges(frame.state).len())
}
