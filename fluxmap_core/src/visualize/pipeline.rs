//! The visualization pipeline from a model and optional fluxes to the exported graph
use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::configuration::Palette;
use crate::metabolic_model::model::Model;
use crate::visualize::builder::{GraphBuilder, GraphSet};
use crate::visualize::direction::{group_by_pair, resolve_directions, DirectionMap};
use crate::visualize::flux_edges::EdgeValues;
use crate::visualize::formula_gate::{compound_formulas, primary_element};
use crate::visualize::graph::Graph;
use crate::visualize::labels::Labeler;
use crate::visualize::pair_filter::{PairFilter, PairPolicy};
use crate::visualize::predict::PairPredictor;
use crate::visualize::style::{EdgeStyler, PenWidthScale, ScalingMethod};
use crate::visualize::{CompoundPair, FluxMap, VisError};

/// Options of one visualization run
#[derive(Builder, Clone, Debug)]
pub struct VisualizationOptions {
    /// How compound pairs are chosen
    #[builder(default = "PairPolicy::Predicted")]
    pub policy: PairPolicy,
    /// Element traced through the network, `None` keeps every pair
    #[builder(default = "Some(\"C\".to_string())")]
    pub element: Option<String>,
    /// Draw one reaction node per compound pair
    #[builder(default = "false")]
    pub split_map: bool,
    /// Export the compound contracted graph
    #[builder(default = "false")]
    pub compound_graph: bool,
    /// Reactions left out of pair prediction
    #[builder(default = "IndexSet::new()")]
    pub exclude_reactions: IndexSet<String>,
    /// Compound pairs never drawn, in both orientations
    #[builder(default = "IndexSet::new()")]
    pub exclude_pairs: IndexSet<CompoundPair>,
    /// Reaction ids or compound display strings limiting the visualized reactions
    #[builder(default = "None")]
    pub subset: Option<Vec<String>>,
    /// Fill color overrides keyed by reaction id or compound display string
    #[builder(default = "IndexMap::new()")]
    pub recolor: IndexMap<String, String>,
    /// Properties shown on node labels
    #[builder(default = "None")]
    pub detail: Option<Vec<String>>,
    #[builder(default = "ScalingMethod::PercentileClip")]
    pub scaling: ScalingMethod,
    #[builder(default = "Palette::default()")]
    pub palette: Palette,
}

impl Default for VisualizationOptions {
    fn default() -> Self {
        VisualizationOptions {
            policy: PairPolicy::Predicted,
            element: Some("C".to_string()),
            split_map: false,
            compound_graph: false,
            exclude_reactions: IndexSet::new(),
            exclude_pairs: IndexSet::new(),
            subset: None,
            recolor: IndexMap::new(),
            detail: None,
            scaling: ScalingMethod::PercentileClip,
            palette: Palette::default(),
        }
    }
}

/// Which of the built graphs is exported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphView {
    Full,
    Compound,
    Combined,
}

impl GraphView {
    /// Pick the exported graph for the pair policy and view flags
    pub fn select(policy: &PairPolicy, split_map: bool, compound_graph: bool) -> Result<GraphView, VisError> {
        if split_map && !policy.splits_reactions() {
            return Err(VisError::SplitMapWithNaive);
        }
        if compound_graph {
            return Ok(GraphView::Compound);
        }
        Ok(match (policy, split_map) {
            (PairPolicy::Naive, _) => GraphView::Full,
            (_, true) => GraphView::Full,
            (_, false) => GraphView::Combined,
        })
    }
}

/// The graphs built by one run together with the data they were drawn from
#[derive(Clone, Debug)]
pub struct Visualization {
    pub graphs: GraphSet,
    pub view: GraphView,
    pub edge_values: EdgeValues,
    pub directions: DirectionMap,
    /// Visualized reactions
    pub subset: IndexSet<String>,
}

impl Visualization {
    /// The graph selected for export
    pub fn graph(&self) -> &Graph {
        match self.view {
            GraphView::Full => &self.graphs.full,
            GraphView::Compound => &self.graphs.contracted,
            GraphView::Combined => &self.graphs.combined,
        }
    }

    pub fn reaction_count(&self) -> usize {
        self.subset.len()
    }
}

/// Resolve subset ids into the set of visualized reactions
///
/// A list of reaction ids is used as given, a list of compounds selects every reaction
/// touching one of them. Anything else falls back to the whole model.
pub fn resolve_subset(model: &Model, ids: Option<&[String]>) -> IndexSet<String> {
    let mut subset: IndexSet<String> = match ids {
        None => model.reactions.keys().cloned().collect(),
        Some(ids) if ids.iter().all(|id| model.reactions.contains_key(id)) => ids.iter().cloned().collect(),
        Some(ids) => {
            let lookup = model.compound_lookup();
            if ids.iter().all(|id| lookup.contains_key(id)) {
                let wanted: IndexSet<&String> = ids.iter().collect();
                model
                    .equations()
                    .into_iter()
                    .filter(|(_, eq)| eq.compounds().any(|(c, _)| wanted.contains(&c.to_string())))
                    .map(|(id, _)| id)
                    .collect()
            } else {
                warn!(
                    "Invalid subset, expected only reaction ids or only compounds with \
                     compartment, visualizing the entire network"
                );
                model.reactions.keys().cloned().collect()
            }
        }
    };
    subset.retain(|id| model.is_active(id));
    subset.sort();
    subset
}

/// Build the graphs of `model`
///
/// `fluxes` weights and orients the edges when given. The returned visualization holds
/// all three graph views, [`Visualization::graph`] is the one selected by the options.
pub fn visualize(
    model: &Model,
    fluxes: Option<&FluxMap>,
    options: &VisualizationOptions,
    predictor: &dyn PairPredictor,
) -> Result<Visualization, VisError> {
    let view = GraphView::select(&options.policy, options.split_map, options.compound_graph)?;
    let formulas = compound_formulas(model);
    let element = options.element.as_deref().map(primary_element);
    let element = element.as_deref();
    let subset = resolve_subset(model, options.subset.as_deref());

    let pairs = PairFilter {
        model,
        formulas: &formulas,
        element,
        exclude_pairs: &options.exclude_pairs,
        exclude_reactions: &options.exclude_reactions,
    }
    .filter(&options.policy, predictor)?;

    // The biomass reaction gets its own nodes
    let scope: IndexSet<String> = subset
        .iter()
        .filter(|r| model.biomass_reaction.as_ref() != Some(*r))
        .cloned()
        .collect();
    let empty = FluxMap::new();
    let fluxes = fluxes.unwrap_or(&empty);
    let grouped = group_by_pair(&pairs.pairs, &scope);
    let directions = resolve_directions(&grouped, model, fluxes);

    let mut edge_values = EdgeValues::from_fluxes(fluxes, &model.equations(), &formulas, element);
    if view == GraphView::Combined {
        edge_values.combine_groups(&directions, fluxes);
    }
    let scale = PenWidthScale::new(options.scaling, &edge_values);
    debug!(edges = edge_values.len(), ?scale, "Computed edge magnitudes");

    let graphs = GraphBuilder {
        model,
        formulas: &formulas,
        element,
        pairs: &pairs,
        scope: &scope,
        subset: &subset,
        directions: &directions,
        styler: EdgeStyler::new(&edge_values, scale),
        labeler: Labeler::new(model, options.detail.as_deref(), fluxes),
        palette: &options.palette,
        recolor: &options.recolor,
    }
    .build()?;

    Ok(Visualization {
        graphs,
        view,
        edge_values,
        directions,
        subset,
    })
}
