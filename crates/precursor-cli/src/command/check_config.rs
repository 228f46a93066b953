use std::path::PathBuf;

use precursor_core::AdjacencyMode;
use precursor_search::SearchParams;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CheckConfigArg {
    /// Discretization config JSON file
    #[arg(long)]
    graph_config: PathBuf,
    /// Search parameters JSON file
    #[arg(long)]
    search_params: Option<PathBuf>,
    /// Output file path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ResolvedConfig {
    adjacency: AdjacencyMode,
    state_components: Vec<ResolvedComponent>,
    search_params: SearchParams,
}

#[derive(Debug, Serialize)]
struct ResolvedComponent {
    sensor: String,
    cut_points: Vec<f64>,
    labels: Vec<String>,
}

pub(crate) fn run(arg: &CheckConfigArg) -> anyhow::Result<()> {
    let discretizer = util::read_graph_config(&arg.graph_config)?;
    let search_params = util::read_search_params(arg.search_params.as_deref())?;

    let state_components = (0..discretizer.width())
        .map(|i| {
            let rule = discretizer.component_rule(i);
            ResolvedComponent {
                sensor: rule.sensor().to_owned(),
                cut_points: rule.cuts().to_vec(),
                labels: rule.labels().to_vec(),
            }
        })
        .collect();
    let resolved = ResolvedConfig {
        adjacency: discretizer.adjacency(),
        state_components,
        search_params,
    };
    tracing::info!(components = discretizer.width(), "configuration is valid");
    Output::save_json(&resolved, arg.output.clone())
}
