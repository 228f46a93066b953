use std::{path::PathBuf, time::Duration};

use precursor_core::{Graph, GraphLimits};
use precursor_patterns::{extract, report::RunSummary};
use precursor_search::{SearchLimits, discover};

use crate::{
    load::{self, CsvLayout},
    util::{self, OutputDir},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DiscoverArg {
    /// Historical records CSV file
    data: PathBuf,
    /// Discretization config JSON file
    #[arg(long)]
    graph_config: PathBuf,
    /// Search parameters JSON file (defaults apply when omitted)
    #[arg(long)]
    search_params: Option<PathBuf>,
    /// Directory for sequences.json, warning_signs.json and summary.json
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
    #[clap(flatten)]
    csv: CsvLayout,
    #[clap(flatten)]
    limits: LimitArg,
}

#[derive(Debug, Clone, clap::Args)]
struct LimitArg {
    /// Records kept before graph construction; larger inputs are sampled
    #[arg(long, default_value_t = GraphLimits::default().max_records)]
    max_records: usize,
    /// Maximum similarity edges per state
    #[arg(long, default_value_t = GraphLimits::default().max_neighbors)]
    max_neighbors: usize,
    /// Seed for record sampling
    #[arg(long, default_value_t = GraphLimits::default().sample_seed)]
    sample_seed: u64,
    /// Paths kept per start state and strategy
    #[arg(long, default_value_t = SearchLimits::default().max_paths_per_start)]
    max_paths_per_start: usize,
    /// Paths kept per strategy
    #[arg(long, default_value_t = SearchLimits::default().max_total_paths)]
    max_total_paths: usize,
    /// Node expansions allowed per start state
    #[arg(long, default_value_t = SearchLimits::default().max_expansions_per_start)]
    max_expansions: usize,
    /// Wall-clock budget per strategy in milliseconds (results may then vary between runs)
    #[arg(long)]
    time_budget_ms: Option<u64>,
}

impl LimitArg {
    fn graph_limits(&self) -> GraphLimits {
        GraphLimits {
            max_records: self.max_records,
            max_neighbors: self.max_neighbors,
            sample_seed: self.sample_seed,
        }
    }

    fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_paths_per_start: self.max_paths_per_start,
            max_total_paths: self.max_total_paths,
            max_expansions_per_start: self.max_expansions,
            time_budget: self.time_budget_ms.map(Duration::from_millis),
        }
    }
}

pub(crate) fn run(arg: &DiscoverArg) -> anyhow::Result<()> {
    let DiscoverArg {
        data,
        graph_config,
        search_params,
        output_dir,
        csv,
        limits,
    } = arg;

    let discretizer = util::read_graph_config(graph_config)?;
    let params = util::read_search_params(search_params.as_deref())?;
    let records = load::load_records(data, csv)?;

    let graph = Graph::build(&records, &discretizer, &limits.graph_limits());
    let discovery = discover(&graph, &discretizer, &params, &limits.search_limits());
    let patterns = extract(&graph, discovery.paths(), &params);
    let summary = RunSummary::new(&graph, &discovery, &patterns);

    let sequences = patterns.sequences_document(&graph);
    let warning_signs = patterns.warning_signs_document();

    let output = OutputDir::create(output_dir)?;
    let sequences_path = output.save_json("sequences.json", &sequences)?;
    let warning_signs_path = output.save_json("warning_signs.json", &warning_signs)?;
    let summary_path = output.save_json("summary.json", &summary)?;

    println!(
        "Built graph with {} states, {} edges and {} failure states ({} adjacency)",
        summary.graph.states,
        summary.graph.edges,
        summary.graph.failure_states,
        summary.graph.mode,
    );
    for strategy in &summary.strategies {
        println!(
            "  {:<7} {} paths from {} start states",
            strategy.strategy.to_string(),
            strategy.paths,
            strategy.starts_searched
        );
    }
    println!(
        "Found {} failure sequences -> {}",
        summary.sequences,
        sequences_path.display()
    );
    println!(
        "Ranked {} warning signs -> {}",
        summary.warning_signs,
        warning_signs_path.display()
    );
    println!("Run summary -> {}", summary_path.display());
    if summary.partial {
        println!("Note: coverage is partial (sampling or search limits applied); see the summary");
    }
    Ok(())
}
