//! Ranking of single-step transitions as warning signs.
//!
//! Every consecutive state pair on a discovered path is one occurrence of a
//! transition. The predictive score is a normalized count,
//! `min(occurrences / 10, 1)`, and is not a calibrated probability. An
//! occurrence is a false positive when the failure at the end of its path lies
//! more than `lookback_window` steps after the transition's target state.

use std::collections::HashMap;

use precursor_core::{Graph, StateId};
use precursor_search::Path;
use serde::Serialize;

/// Occurrence count at which the predictive score saturates.
const SCORE_SATURATION: f64 = 10.0;

/// A transition between two states, ranked by how often it precedes failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningSign {
    #[serde(skip)]
    pub from: StateId,
    #[serde(skip)]
    pub to: StateId,
    /// `"<from> -> <to>"` with state descriptions.
    pub pattern: String,
    pub predictive_score: f64,
    pub frequency: usize,
    pub false_positive_rate: f64,
}

/// Predictive score for a transition seen `occurrences` times.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn predictive_score(occurrences: usize) -> f64 {
    (occurrences as f64 / SCORE_SATURATION).min(1.0)
}

#[derive(Debug, Default)]
struct Tally {
    occurrences: usize,
    misses: usize,
}

/// Counts transitions over `paths` and ranks them.
///
/// Ordered by predictive score, then frequency (both descending), then pattern text.
#[expect(clippy::cast_precision_loss)]
pub fn rank_warning_signs<'a, I>(
    graph: &Graph,
    paths: I,
    lookback_window: usize,
) -> Vec<WarningSign>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut tallies: HashMap<(StateId, StateId), Tally> = HashMap::new();
    for path in paths {
        let states = path.states();
        let last = states.len() - 1;
        for (i, pair) in states.windows(2).enumerate() {
            let tally = tallies.entry((pair[0], pair[1])).or_default();
            tally.occurrences += 1;
            if last - (i + 1) > lookback_window {
                tally.misses += 1;
            }
        }
    }

    let mut signs: Vec<WarningSign> = tallies
        .into_iter()
        .map(|((from, to), tally)| WarningSign {
            from,
            to,
            pattern: format!("{} -> {}", graph.state(from), graph.state(to)),
            predictive_score: predictive_score(tally.occurrences),
            frequency: tally.occurrences,
            false_positive_rate: tally.misses as f64 / tally.occurrences as f64,
        })
        .collect();
    signs.sort_by(|a, b| {
        b.predictive_score
            .total_cmp(&a.predictive_score)
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.pattern.cmp(&b.pattern))
            .then_with(|| (a.from, a.to).cmp(&(b.from, b.to)))
    });
    signs
}

#[cfg(test)]
mod tests {
    use precursor_core::{AdjacencyMode, State};

    use super::*;

    fn chain(labels: &[&str]) -> (Graph, Vec<StateId>) {
        let mut graph = Graph::new(AdjacencyMode::Temporal);
        let ids: Vec<_> = labels
            .iter()
            .map(|l| graph.add_state(State::new("M1", [*l])))
            .collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1], false);
        }
        if let Some(&last) = ids.last() {
            graph.mark_failure(last);
        }
        (graph, ids)
    }

    #[test]
    fn test_score_saturates() {
        assert!((predictive_score(23) - 1.0).abs() < f64::EPSILON);
        assert!((predictive_score(4) - 0.4).abs() < 1e-12);
        assert!(predictive_score(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counts_and_ranking() {
        let (graph, ids) = chain(&["a", "b", "f"]);
        let long = Path::new(ids.clone());
        let short = Path::new(ids[1..].to_vec());
        let paths = [long.clone(), long, short];

        let signs = rank_warning_signs(&graph, &paths, 50);
        assert_eq!(signs.len(), 2);
        assert_eq!(signs[0].pattern, "M1[b] -> M1[f]");
        assert_eq!(signs[0].frequency, 3);
        assert!((signs[0].predictive_score - 0.3).abs() < 1e-12);
        assert_eq!(signs[1].pattern, "M1[a] -> M1[b]");
        assert_eq!(signs[1].frequency, 2);
        assert!(signs.iter().all(|s| s.false_positive_rate.abs() < f64::EPSILON));
    }

    #[test]
    fn test_ties_break_on_pattern() {
        let (graph, ids) = chain(&["x", "b", "a", "f"]);
        let signs = rank_warning_signs(&graph, &[Path::new(ids)], 50);
        let patterns: Vec<_> = signs.iter().map(|s| s.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec!["M1[a] -> M1[f]", "M1[b] -> M1[a]", "M1[x] -> M1[b]"]
        );
    }

    #[test]
    fn test_lookback_window_marks_false_positives() {
        // a -> b -> c -> d -> f: the a -> b transition is 3 steps from failure
        let (graph, ids) = chain(&["a", "b", "c", "d", "f"]);
        let path = Path::new(ids);
        let rate = |window: usize, pattern: &str| {
            rank_warning_signs(&graph, [&path], window)
                .into_iter()
                .find(|s| s.pattern == pattern)
                .map(|s| s.false_positive_rate)
        };
        assert_eq!(rate(3, "M1[a] -> M1[b]"), Some(0.0));
        assert_eq!(rate(2, "M1[a] -> M1[b]"), Some(1.0));
        assert_eq!(rate(0, "M1[d] -> M1[f]"), Some(0.0));
        assert_eq!(rate(0, "M1[c] -> M1[d]"), Some(1.0));
    }

    #[test]
    fn test_partial_false_positive_rate() {
        let (graph, ids) = chain(&["a", "b", "c", "f"]);
        let far = Path::new(ids.clone());
        let near = Path::new(vec![ids[0], ids[1]]);
        let signs = rank_warning_signs(&graph, [&far, &near], 1);
        let sign = signs
            .iter()
            .find(|s| s.pattern == "M1[a] -> M1[b]")
            .unwrap();
        assert_eq!(sign.frequency, 2);
        assert!((sign.false_positive_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_state_paths_have_no_transitions() {
        let (graph, ids) = chain(&["f"]);
        assert!(rank_warning_signs(&graph, &[Path::new(ids)], 50).is_empty());
    }
}
