//! Serializable output documents.

use precursor_core::{Graph, GraphStats};
use precursor_search::{Discovery, Strategy, Truncation};
use serde::Serialize;

use crate::{Patterns, sequence::SequenceRecord, warning::WarningSign};

/// Contents of `sequences.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencesDocument {
    pub sequences: Vec<SequenceRecord>,
}

/// Contents of `warning_signs.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningSignsDocument {
    pub warning_signs: Vec<WarningSign>,
}

/// Per-strategy line of a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub paths: usize,
    pub starts_searched: usize,
    pub truncation: Truncation,
}

/// Contents of `summary.json`: how much of the input the run actually covered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub graph: GraphStats,
    pub strategies: Vec<StrategySummary>,
    pub sequences: usize,
    pub warning_signs: usize,
    /// Set when sampling, neighbor caps or search caps reduced coverage.
    pub partial: bool,
}

impl Patterns {
    #[must_use]
    pub fn sequences_document(&self, graph: &Graph) -> SequencesDocument {
        SequencesDocument {
            sequences: self
                .sequences
                .iter()
                .map(|sequence| sequence.to_record(graph))
                .collect(),
        }
    }

    #[must_use]
    pub fn warning_signs_document(&self) -> WarningSignsDocument {
        WarningSignsDocument {
            warning_signs: self.warning_signs.clone(),
        }
    }
}

impl RunSummary {
    #[must_use]
    pub fn new(graph: &Graph, discovery: &Discovery, patterns: &Patterns) -> Self {
        let graph = graph.stats();
        let strategies = discovery
            .runs
            .iter()
            .map(|run| StrategySummary {
                strategy: run.strategy,
                paths: run.outcome.paths.len(),
                starts_searched: run.outcome.starts_searched,
                truncation: run.outcome.truncation,
            })
            .collect();
        Self {
            partial: graph.is_partial() || discovery.is_partial(),
            graph,
            strategies,
            sequences: patterns.sequences.len(),
            warning_signs: patterns.warning_signs.len(),
        }
    }
}
