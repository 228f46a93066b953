//! Search results.

use precursor_core::{Graph, StateId};
use serde::Serialize;

/// A discovered path from a start state to a failure state.
///
/// States are listed in traversal order; the last one is always a failure
/// state and no state repeats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path {
    states: Vec<StateId>,
}

impl Path {
    #[must_use]
    pub fn new(states: Vec<StateId>) -> Self {
        assert!(
            !states.is_empty(),
            "a path contains at least its start state"
        );
        Self { states }
    }

    #[must_use]
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    #[must_use]
    pub fn start(&self) -> StateId {
        self.states[0]
    }

    #[must_use]
    pub fn goal(&self) -> StateId {
        self.states[self.states.len() - 1]
    }

    /// Number of states on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of edges on the path.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.states.len() - 1
    }

    /// Checks that consecutive states are joined by graph edges and that no state repeats.
    #[must_use]
    pub fn is_valid_in(&self, graph: &Graph) -> bool {
        let connected = self
            .states
            .windows(2)
            .all(|pair| graph.has_edge(pair[0], pair[1]));
        let mut seen = vec![false; graph.len()];
        let simple = self
            .states
            .iter()
            .all(|id| !std::mem::replace(&mut seen[id.index()], true));
        connected && simple && graph.is_failure(self.goal())
    }
}

/// Which limits cut a search short.
///
/// All flags false means the search explored everything reachable within
/// `max_depth`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[expect(clippy::struct_excessive_bools)]
pub struct Truncation {
    /// Some frontier state could not be expanded because of `max_depth`.
    pub depth_limited: bool,
    pub per_start_cap_hit: bool,
    pub total_cap_hit: bool,
    pub expansion_budget_hit: bool,
    pub time_budget_hit: bool,
}

impl Truncation {
    /// Whether a resource cap, rather than the depth bound, ended the search early.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.per_start_cap_hit
            || self.total_cap_hit
            || self.expansion_budget_hit
            || self.time_budget_hit
    }

    pub fn merge(&mut self, other: Truncation) {
        self.depth_limited |= other.depth_limited;
        self.per_start_cap_hit |= other.per_start_cap_hit;
        self.total_cap_hit |= other.total_cap_hit;
        self.expansion_budget_hit |= other.expansion_budget_hit;
        self.time_budget_hit |= other.time_budget_hit;
    }
}

/// Paths found by one strategy together with how the search ended.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub paths: Vec<Path>,
    pub truncation: Truncation,
    /// Start states actually searched.
    pub starts_searched: usize,
}
