//! Records, discretization and the state graph for failure-precursor discovery.
//!
//! Historical sensor records are discretized into [`State`]s, which become the
//! nodes of a [`Graph`]. Edges follow either the time order of each entity's
//! readings or, for one-snapshot-per-entity data, label similarity.
//!
//! ```text
//! HistoricalRecord --Discretizer--> State --Graph::build--> Graph
//! ```
//!
//! # Example
//!
//! ```
//! use precursor_core::{GraphConfig, GraphLimits, Graph, HistoricalRecord, TimeKey};
//!
//! let config: GraphConfig = serde_json::from_str(r#"{
//!     "discretization": {
//!         "temperature": { "bins": [50.0, 80.0], "labels": ["low", "medium", "high"] }
//!     },
//!     "state_components": ["temperature"]
//! }"#).unwrap();
//! let discretizer = config.validate().unwrap();
//!
//! let records = vec![
//!     HistoricalRecord::new("M1", TimeKey::Ordinal(0), false).with_sensor("temperature", 40.0),
//!     HistoricalRecord::new("M1", TimeKey::Ordinal(1), true).with_sensor("temperature", 90.0),
//! ];
//! let graph = Graph::build(&records, &discretizer, &GraphLimits::default());
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.failure_count(), 1);
//! ```

pub use self::{config::*, discretize::*, graph::*, record::*, sample::*, state::*};

pub mod config;
pub mod discretize;
pub mod graph;
pub mod record;
pub mod sample;
pub mod state;
