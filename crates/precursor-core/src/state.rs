use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a [`State`] in its [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A discretized equipment condition: the entity it belongs to plus one bin
/// label per state component.
///
/// Two states are equal when both the entity and the label tuple match,
/// regardless of which records produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    entity_id: String,
    labels: Vec<String>,
}

impl State {
    #[must_use]
    pub fn new<I, S>(entity_id: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_id: entity_id.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of positions whose labels differ, ignoring the entity.
    ///
    /// Tuples of different widths count every unmatched position as different.
    #[must_use]
    pub fn hamming_distance(&self, other: &State) -> usize {
        let common = self
            .labels
            .iter()
            .zip(&other.labels)
            .filter(|(a, b)| a != b)
            .count();
        common + self.labels.len().abs_diff(other.labels.len())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.entity_id, self.labels.join(", "))
    }
}
