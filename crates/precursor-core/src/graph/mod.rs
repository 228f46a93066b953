//! The state graph searched for failure precursors.
//!
//! Nodes live in a dense arena indexed by [`StateId`]; adjacency is stored as
//! per-node edge lists in first-insertion order, so iteration order (and with
//! it every downstream result) is deterministic.
//!
//! Besides topology the graph keeps, per state, how many records mapped to it
//! and the steps-to-failure observations taken from each record's entity
//! history (see [`Graph::failure_horizons`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    config::AdjacencyMode,
    sample::SampleSummary,
    state::{State, StateId},
};

pub use self::builder::GraphLimits;

mod builder;

/// Directed edge to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub target: StateId,
    /// Set when a transition along this edge ended in a failure-labeled record
    /// (temporal mode) or when `target` is a failure state (similarity mode).
    pub leads_to_failure: bool,
}

/// Steps-to-failure observation for a state: `(steps, is_censored)`.
///
/// `steps` counts records from the observation to the entity's next failure
/// record, or to its last record when no failure follows (censored).
pub type FailureHorizon = (usize, bool);

/// Summary of how a graph was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Adjacency mode actually used (never [`AdjacencyMode::Auto`] after a build).
    pub mode: AdjacencyMode,
    pub states: usize,
    pub edges: usize,
    pub failure_states: usize,
    /// Similarity edges dropped because a node's neighbor cap was saturated.
    pub truncated_edges: usize,
    /// Nodes whose neighbor cap was saturated.
    pub saturated_states: usize,
    /// Present when input records were sampled down.
    pub sample: Option<SampleSummary>,
}

impl GraphStats {
    /// Whether neighbor caps or sampling reduced coverage.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.truncated_edges > 0 || self.sample.is_some()
    }
}

/// State graph with failure marks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    states: Vec<State>,
    #[serde(skip)]
    index: HashMap<State, StateId>,
    adjacency: Vec<Vec<Edge>>,
    predecessors: Vec<Vec<StateId>>,
    failure: Vec<bool>,
    record_counts: Vec<usize>,
    horizons: Vec<Vec<FailureHorizon>>,
    mode: AdjacencyMode,
    truncated_edges: usize,
    saturated: Vec<bool>,
    sample: Option<SampleSummary>,
}

impl Graph {
    /// Creates an empty graph whose edges follow `mode`.
    #[must_use]
    pub fn new(mode: AdjacencyMode) -> Self {
        Self {
            states: vec![],
            index: HashMap::new(),
            adjacency: vec![],
            predecessors: vec![],
            failure: vec![],
            record_counts: vec![],
            horizons: vec![],
            mode,
            truncated_edges: 0,
            saturated: vec![],
            sample: None,
        }
    }

    /// Inserts `state` if absent and returns its id.
    pub fn add_state(&mut self, state: State) -> StateId {
        if let Some(&id) = self.index.get(&state) {
            return id;
        }
        let id = StateId::new(self.states.len());
        self.index.insert(state.clone(), id);
        self.states.push(state);
        self.adjacency.push(vec![]);
        self.predecessors.push(vec![]);
        self.failure.push(false);
        self.record_counts.push(0);
        self.horizons.push(vec![]);
        self.saturated.push(false);
        id
    }

    /// Adds the edge `from -> to`, returning `false` if it already existed.
    ///
    /// Re-adding an existing edge only ORs in `leads_to_failure`.
    pub fn add_edge(&mut self, from: StateId, to: StateId, leads_to_failure: bool) -> bool {
        let edges = &mut self.adjacency[from.index()];
        if let Some(edge) = edges.iter_mut().find(|e| e.target == to) {
            edge.leads_to_failure |= leads_to_failure;
            return false;
        }
        edges.push(Edge {
            target: to,
            leads_to_failure,
        });
        self.predecessors[to.index()].push(from);
        true
    }

    /// Marks `id` as a failure state. Marks are never cleared.
    pub fn mark_failure(&mut self, id: StateId) {
        self.failure[id.index()] = true;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    #[must_use]
    pub fn state_id(&self, state: &State) -> Option<StateId> {
        self.index.get(state).copied()
    }

    /// All state ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = StateId> + use<> {
        (0..self.states.len()).map(StateId::new)
    }

    #[must_use]
    pub fn edges(&self, id: StateId) -> &[Edge] {
        &self.adjacency[id.index()]
    }

    pub fn neighbors(&self, id: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.adjacency[id.index()].iter().map(|e| e.target)
    }

    /// States with an edge into `id`, in edge-insertion order.
    #[must_use]
    pub fn predecessors(&self, id: StateId) -> &[StateId] {
        &self.predecessors[id.index()]
    }

    #[must_use]
    pub fn has_edge(&self, from: StateId, to: StateId) -> bool {
        self.adjacency[from.index()].iter().any(|e| e.target == to)
    }

    #[must_use]
    pub fn is_failure(&self, id: StateId) -> bool {
        self.failure[id.index()]
    }

    pub fn failure_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.ids().filter(|&id| self.is_failure(id))
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failure.iter().filter(|&&f| f).count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Number of records that discretized into `id`.
    #[must_use]
    pub fn record_count(&self, id: StateId) -> usize {
        self.record_counts[id.index()]
    }

    /// Steps-to-failure observations collected for `id`.
    #[must_use]
    pub fn failure_horizons(&self, id: StateId) -> &[FailureHorizon] {
        &self.horizons[id.index()]
    }

    #[must_use]
    pub fn mode(&self) -> AdjacencyMode {
        self.mode
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            mode: self.mode,
            states: self.len(),
            edges: self.edge_count(),
            failure_states: self.failure_count(),
            truncated_edges: self.truncated_edges,
            saturated_states: self.saturated.iter().filter(|&&s| s).count(),
            sample: self.sample,
        }
    }
}
