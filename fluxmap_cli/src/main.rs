use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use indexmap::{IndexMap, IndexSet};
use tracing::{info, warn, Level};

use fluxmap_core::configuration::Configuration;
use fluxmap_core::io::tsv::{read_color_table, read_exclude_pairs, read_flux_table, read_subset};
use fluxmap_core::metabolic_model::model::Model;
use fluxmap_core::visualize::export::{render_image, write_outputs};
use fluxmap_core::visualize::pair_filter::PairPolicy;
use fluxmap_core::visualize::predict::GreedyTransferPredictor;
use fluxmap_core::visualize::style::ScalingMethod;
use fluxmap_core::visualize::{visualize, VisualizationOptionsBuilder};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scaling {
    /// Clip at the 90th percentile magnitude
    Percentile,
    /// Linear between the smallest and largest magnitude
    MinMax,
}

impl From<Scaling> for ScalingMethod {
    fn from(scaling: Scaling) -> Self {
        match scaling {
            Scaling::Percentile => ScalingMethod::PercentileClip,
            Scaling::MinMax => ScalingMethod::MinMax,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "fluxmap",
    about = "Draw the flow of an element through a metabolic model as a Graphviz graph"
)]
struct Cli {
    /// Model in the COBRA json format
    model: PathBuf,

    /// Compound pair method, `fpp`, `no-fpp` or the path of a pair file
    #[arg(long, default_value = "fpp")]
    method: String,

    /// Reaction left out of pair prediction, may be repeated
    #[arg(long)]
    exclude: Vec<String>,

    /// Tab separated reaction fluxes
    #[arg(long)]
    fluxes: Option<PathBuf>,

    /// Element traced through the network
    #[arg(long, default_value = "C", conflicts_with = "any_element")]
    element: String,

    /// Keep compound pairs regardless of the atoms they share
    #[arg(long)]
    any_element: bool,

    /// Properties shown on node labels
    #[arg(long, num_args = 1..)]
    detail: Option<Vec<String>>,

    /// File of reaction ids or compounds to visualize
    #[arg(long)]
    subset: Option<PathBuf>,

    /// Tab separated node colors, later files take precedence
    #[arg(long, num_args = 1..)]
    color: Vec<PathBuf>,

    /// Tab separated compound pairs to leave out
    #[arg(long)]
    exclude_pairs: Option<PathBuf>,

    /// Draw one reaction node per compound pair
    #[arg(long)]
    split_map: bool,

    /// Export the graph of compounds only
    #[arg(long)]
    compound_graph: bool,

    /// Pen width scaling, overrides the configuration
    #[arg(long, value_enum)]
    scaling: Option<Scaling>,

    /// Reaction outside the active model, may be repeated
    #[arg(long)]
    inactive: Vec<String>,

    /// Biomass reaction, defaults to the model objective
    #[arg(long)]
    biomass: Option<String>,

    /// Json configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render the dot file to an image of this format with Graphviz
    #[arg(long)]
    image: Option<String>,

    /// Directory the outputs are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// More logging, may be repeated
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn log_level(cli: &Cli) -> Level {
    match (cli.quiet, cli.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(&cli))
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.config {
        Some(ref path) => Configuration::read_json(path)
            .with_context(|| format!("Unable to load configuration {}", path.display()))?,
        None => Configuration::default(),
    };

    let mut model = Model::read_json(&cli.model)
        .with_context(|| format!("Unable to read model {}", cli.model.display()))?;
    if let Some(biomass) = cli.biomass.clone() {
        if !model.reactions.contains_key(&biomass) {
            bail!("Biomass reaction {} is not in the model", biomass);
        }
        model.biomass_reaction = Some(biomass);
    }
    for id in &cli.inactive {
        if !model.deactivate_reaction(id) {
            bail!("Inactive reaction {} is not in the model", id);
        }
    }

    let fluxes = cli.fluxes.as_ref().map(read_flux_table).transpose()?;
    let exclude_pairs = match cli.exclude_pairs {
        Some(ref path) => read_exclude_pairs(path, &model.compound_lookup())?,
        None => IndexSet::new(),
    };
    let mut recolor = IndexMap::new();
    for path in &cli.color {
        recolor.extend(read_color_table(path)?);
    }
    let subset = cli.subset.as_ref().map(read_subset).transpose()?;

    let options = VisualizationOptionsBuilder::default()
        .policy(PairPolicy::from_method(&cli.method))
        .element(if cli.any_element { None } else { Some(cli.element.clone()) })
        .split_map(cli.split_map)
        .compound_graph(cli.compound_graph)
        .exclude_reactions(cli.exclude.iter().cloned().collect())
        .exclude_pairs(exclude_pairs)
        .subset(subset)
        .recolor(recolor)
        .detail(cli.detail.clone())
        .scaling(cli.scaling.map(ScalingMethod::from).unwrap_or(config.scaling))
        .palette(config.palette.clone())
        .build()?;

    let vis = visualize(&model, fluxes.as_ref(), &options, &GreedyTransferPredictor::default())?;

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Unable to create {}", cli.output_dir.display()))?;
    let files = write_outputs(vis.graph(), &cli.output_dir)?;
    info!(
        nodes = vis.graph().node_count(),
        edges = vis.graph().edge_count(),
        dot = %files.dot.display(),
        "Wrote graph"
    );

    if let Some(ref format) = cli.image {
        if vis.reaction_count() > config.large_graph_threshold {
            info!(
                reactions = vis.reaction_count(),
                "Creating a large graph, this may take a long time"
            );
        }
        match render_image(&files.dot, format) {
            Ok(path) => info!(image = %path.display(), "Rendered image"),
            Err(err) => warn!(error = %err, "Unable to render the graph image"),
        }
    }
    Ok(())
}
