//! Shared bookkeeping for the traversal algorithms.

use std::time::Instant;

use precursor_core::StateId;

use crate::{
    params::SearchLimits,
    path::{Path, Truncation},
};

/// Limits remaining for one strategy run, shared across its start states.
#[derive(Debug)]
pub(crate) struct Budget {
    per_start: usize,
    remaining_total: usize,
    max_expansions: usize,
    deadline: Option<Instant>,
    pub(crate) truncation: Truncation,
}

impl Budget {
    pub(crate) fn new(limits: &SearchLimits) -> Self {
        Self {
            per_start: limits.max_paths_per_start,
            remaining_total: limits.max_total_paths,
            max_expansions: limits.max_expansions_per_start,
            deadline: limits.time_budget.map(|budget| Instant::now() + budget),
            truncation: Truncation::default(),
        }
    }

    pub(crate) fn total_exhausted(&self) -> bool {
        self.remaining_total == 0
    }

    pub(crate) fn out_of_time(&mut self) -> bool {
        let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        self.truncation.time_budget_hit |= expired;
        expired
    }

    /// Whether a per-start search may expand another node.
    pub(crate) fn try_expand(&mut self, expansions: &mut usize) -> bool {
        if *expansions >= self.max_expansions {
            self.truncation.expansion_budget_hit = true;
            return false;
        }
        *expansions += 1;
        true
    }

    /// Stores `path` and returns `true` when the per-start search must stop.
    ///
    /// `pending` tells whether the search still had unexplored work, which is
    /// what makes hitting a cap a truncation.
    pub(crate) fn record(&mut self, found: &mut Vec<Path>, path: Path, pending: bool) -> bool {
        // a path turned away by a cap is always a truncation
        if self.remaining_total == 0 {
            self.truncation.total_cap_hit = true;
            return true;
        }
        if found.len() >= self.per_start {
            self.truncation.per_start_cap_hit = true;
            return true;
        }
        found.push(path);
        self.remaining_total -= 1;
        if self.remaining_total == 0 {
            self.truncation.total_cap_hit |= pending;
            return true;
        }
        if found.len() >= self.per_start {
            self.truncation.per_start_cap_hit |= pending;
            return true;
        }
        false
    }
}

/// Search-tree node; the path so far is recovered through parent links.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchNode {
    pub(crate) state: StateId,
    pub(crate) parent: Option<usize>,
    pub(crate) depth: usize,
    /// Accumulated edge cost from the start.
    pub(crate) cost: f64,
}

#[derive(Debug)]
pub(crate) struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub(crate) fn new(start: StateId) -> Self {
        Self {
            nodes: vec![SearchNode {
                state: start,
                parent: None,
                depth: 0,
                cost: 0.0,
            }],
        }
    }

    pub(crate) fn root(&self) -> usize {
        0
    }

    pub(crate) fn node(&self, index: usize) -> SearchNode {
        self.nodes[index]
    }

    pub(crate) fn extend(&mut self, parent: usize, state: StateId, edge_cost: f64) -> usize {
        let SearchNode { depth, cost, .. } = self.nodes[parent];
        self.nodes.push(SearchNode {
            state,
            parent: Some(parent),
            depth: depth + 1,
            cost: cost + edge_cost,
        });
        self.nodes.len() - 1
    }

    pub(crate) fn path(&self, index: usize) -> Path {
        let mut states = vec![];
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            states.push(self.nodes[i].state);
            cursor = self.nodes[i].parent;
        }
        states.reverse();
        Path::new(states)
    }
}
