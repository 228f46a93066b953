//! Aggregation of discovered paths into failure sequences.

use std::collections::{BTreeSet, HashMap};

use precursor_core::{Graph, StateId};
use precursor_search::Path;
use precursor_stats::descriptive::mean_steps;
use serde::Serialize;

/// A distinct state sequence ending in a failure state, with how often it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureSequence {
    /// Full path, terminal failure state included.
    pub states: Vec<StateId>,
    /// Number of discovered paths with exactly this state sequence.
    pub frequency: usize,
    /// Mean number of steps from the first state to the failure state.
    pub avg_time_to_failure: f64,
    /// Sorted entity ids of the states on the contributing paths.
    pub machines: Vec<String>,
}

impl FailureSequence {
    /// Renders the sequence with state descriptions, for output.
    #[must_use]
    pub fn to_record(&self, graph: &Graph) -> SequenceRecord {
        SequenceRecord {
            sequence: self
                .states
                .iter()
                .map(|&id| graph.state(id).to_string())
                .collect(),
            frequency: self.frequency,
            avg_time_to_failure: self.avg_time_to_failure,
            machines: self.machines.clone(),
        }
    }
}

/// Output form of a [`FailureSequence`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceRecord {
    pub sequence: Vec<String>,
    pub frequency: usize,
    pub avg_time_to_failure: f64,
    pub machines: Vec<String>,
}

#[derive(Debug)]
struct Group {
    states: Vec<StateId>,
    steps: Vec<usize>,
    machines: BTreeSet<String>,
}

/// Groups `paths` by their exact state sequence.
///
/// Paths with fewer than `min_length` states are skipped. The result is
/// ordered by frequency, most frequent first; equal frequencies keep the order
/// in which the sequence was first found.
pub fn aggregate_sequences<'a, I>(
    graph: &Graph,
    paths: I,
    min_length: usize,
) -> Vec<FailureSequence>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut groups: Vec<Group> = vec![];
    let mut index: HashMap<&[StateId], usize> = HashMap::new();

    for path in paths {
        if path.len() < min_length {
            continue;
        }
        let group = *index.entry(path.states()).or_insert_with(|| {
            groups.push(Group {
                states: path.states().to_vec(),
                steps: vec![],
                machines: BTreeSet::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[group];
        group.steps.push(path.edge_count());
        group.machines.extend(
            path.states()
                .iter()
                .map(|&id| graph.state(id).entity_id().to_owned()),
        );
    }

    let mut sequences: Vec<FailureSequence> = groups
        .into_iter()
        .map(|group| FailureSequence {
            frequency: group.steps.len(),
            avg_time_to_failure: mean_steps(group.steps).unwrap_or(0.0),
            machines: group.machines.into_iter().collect(),
            states: group.states,
        })
        .collect();
    sequences.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    sequences
}
