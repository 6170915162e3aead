//! Construction of reaction/compound graphs that trace a chemical element through a
//! metabolic model, optionally weighted by reaction fluxes.
//!
//! The stages run in order: [`formula_gate`] selects usable formulas, [`pair_filter`]
//! decides which reactant/product pairs of each reaction are linked, [`direction`] groups
//! the reactions of every compound pair by flow direction, [`flux_edges`] turns fluxes into
//! edge magnitudes, [`builder`] assembles the graph views and [`export`] writes them out.
//! [`visualize`] runs the whole pipeline.
use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;

use crate::io::tsv::TableError;
use crate::metabolic_model::formula::Formula;
use crate::metabolic_model::metabolite::Compound;

pub mod builder;
pub mod direction;
pub mod export;
pub mod flux_edges;
pub mod formula_gate;
pub mod graph;
pub mod labels;
pub mod pair_filter;
pub mod pipeline;
pub mod predict;
pub mod style;

pub use pipeline::{visualize, GraphView, Visualization, VisualizationOptions, VisualizationOptionsBuilder};

/// Ordered (reactant, product) pair
pub type CompoundPair = (Compound, Compound);

/// Flattened formula of each metabolite id
pub type FormulaMap = IndexMap<String, Formula>;

/// Signed flux of each reaction id
pub type FluxMap = IndexMap<String, f64>;

#[derive(Error, Debug)]
pub enum VisError {
    #[error("Reactions without an equation: {}", .0.join(", "))]
    MissingEquations(Vec<String>),
    #[error("Reactions with compounds missing a formula: {}", .0.join(", "))]
    MissingFormulas(Vec<String>),
    #[error("Unable to read compound pair file {}: {source}", .path.display())]
    PairFile {
        path: PathBuf,
        #[source]
        source: TableError,
    },
    #[error("Unknown compound `{0}` in compound pair file")]
    UnknownCompound(String),
    #[error("Split map can't be used with the no-fpp method")]
    SplitMapWithNaive,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Graph(#[from] graph::GraphError),
}
