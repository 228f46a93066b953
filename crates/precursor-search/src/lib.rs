//! Search for paths from failure-adjacent states into failure states.
//!
//! Three strategies run over a built [`Graph`](precursor_core::Graph):
//!
//! 1. **Breadth-first** ([`bfs`]) - level-order traversal; finds the fewest-edge
//!    path to each reachable failure state.
//! 2. **Depth-first** ([`dfs`]) - backtracking traversal with per-branch visited
//!    marks; finds alternative, often longer, routes.
//! 3. **Best-first / A\*** ([`astar`]) - priority traversal on `g + w * h`, with
//!    `h` from a [`Heuristic`] prepared once per run.
//!
//! # Architecture
//!
//! ```text
//! discover (one run per strategy)
//!     ↓ for each start state
//! bfs / dfs / astar search_from
//!     ↓ shares
//! Budget (path caps, expansion cap, time budget)
//! ```
//!
//! Every run reports a [`Truncation`] next to its paths, so a caller can tell
//! an empty result from a capped one.
//!
//! # Example
//!
//! ```
//! use precursor_core::{AdjacencyMode, Graph, State};
//! use precursor_search::{SearchLimits, bfs::breadth_first};
//!
//! let mut graph = Graph::new(AdjacencyMode::Temporal);
//! let [a, b, c, f] = ["a", "b", "c", "f"].map(|l| graph.add_state(State::new("M1", [l])));
//! graph.add_edge(a, b, false);
//! graph.add_edge(b, c, false);
//! graph.add_edge(c, f, true);
//! graph.mark_failure(f);
//!
//! let outcome = breadth_first(&graph, a, 10, &SearchLimits::default());
//! assert_eq!(outcome.paths[0].edge_count(), 3);
//! ```

pub use self::{discovery::*, heuristic::Heuristic, params::*, path::*};

pub mod astar;
pub mod bfs;
mod budget;
pub mod dfs;
pub mod discovery;
pub mod heuristic;
pub mod params;
pub mod path;
