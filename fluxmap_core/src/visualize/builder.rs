//! Assembly of the full, compound contracted and reaction combined graphs
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::configuration::Palette;
use crate::metabolic_model::metabolite::Compound;
use crate::metabolic_model::model::Model;
use crate::visualize::direction::DirectionMap;
use crate::visualize::flux_edges::EdgeEnd;
use crate::visualize::formula_gate::carries_element;
use crate::visualize::graph::{Edge, EdgeDirection, Graph, GraphError, Node, NodeShape};
use crate::visualize::labels::Labeler;
use crate::visualize::pair_filter::FilteredPairs;
use crate::visualize::style::EdgeStyler;
use crate::visualize::FormulaMap;

/// The three views built from one run
#[derive(Clone, Debug, Default)]
pub struct GraphSet {
    /// Compounds and reaction nodes, reactions optionally split per compound pair
    pub full: Graph,
    /// Compounds only, with one edge per reaction and compound pair
    pub contracted: Graph,
    /// One node per compound pair and direction group
    pub combined: Graph,
}

/// Fill color of a combined node
///
/// A single reaction keeps its own color. A group whose members were all recolored the
/// same keeps that color, a group with only some or differently recolored members gets
/// the mixed color.
pub fn group_color(group: &[String], recolor: &IndexMap<String, String>, palette: &Palette) -> String {
    let colors: Vec<Option<&String>> = group.iter().map(|r| recolor.get(r)).collect();
    match colors.as_slice() {
        [Some(color)] => color.to_string(),
        [first, rest @ ..] if first.is_some() && rest.iter().all(|c| c == first) => {
            first.map(|c| c.to_string()).unwrap_or_default()
        }
        _ if colors.iter().any(|c| c.is_some()) => palette.mixed.clone(),
        _ => palette.reaction.clone(),
    }
}

/// Inputs of graph construction, the output of every earlier stage
pub struct GraphBuilder<'a> {
    pub model: &'a Model,
    pub formulas: &'a FormulaMap,
    /// Normalized tracked element
    pub element: Option<&'a str>,
    pub pairs: &'a FilteredPairs,
    /// Reactions drawn from their compound pairs
    pub scope: &'a IndexSet<String>,
    /// Every visualized reaction, exchange and biomass reactions included
    pub subset: &'a IndexSet<String>,
    pub directions: &'a DirectionMap,
    pub styler: EdgeStyler<'a>,
    pub labeler: Labeler<'a>,
    pub palette: &'a Palette,
    /// Fill color overrides keyed by reaction id or compound display string
    pub recolor: &'a IndexMap<String, String>,
}

impl<'a> GraphBuilder<'a> {
    pub fn build(&self) -> Result<GraphSet, GraphError> {
        let mut graphs = GraphSet::default();
        self.add_pair_reactions(&mut graphs.full, &mut graphs.contracted)?;
        self.add_direction_groups(&mut graphs.combined)?;
        self.add_exchange_reactions(&mut graphs.full, &mut graphs.combined)?;
        self.add_biomass_reaction(&mut graphs.full, &mut graphs.combined)?;
        debug!(
            full_nodes = graphs.full.node_count(),
            combined_nodes = graphs.combined.node_count(),
            "Built graphs"
        );
        Ok(graphs)
    }

    fn compound_color(&self, compound: &Compound) -> &str {
        self.recolor
            .get(&compound.to_string())
            .unwrap_or(&self.palette.compound)
    }

    fn reaction_color(&self, reaction_id: &str) -> &str {
        self.recolor.get(reaction_id).unwrap_or(&self.palette.reaction)
    }

    fn declared_direction(&self, reaction_id: &str) -> EdgeDirection {
        self.model
            .reactions
            .get(reaction_id)
            .map(|r| r.direction().into())
            .unwrap_or(EdgeDirection::Both)
    }

    fn compound_node(&self, compound: &Compound, color: &str) -> Node {
        let id = compound.to_string();
        Node::new(id.clone(), self.labeler.compound_label(compound), NodeShape::Ellipse, color).with_edge_id(&id)
    }

    /// Add the compound unless the graph has it, with `color` marking how it was reached
    fn ensure_compound(&self, graph: &mut Graph, compound: &Compound, color: &str) {
        if !graph.contains_node(&compound.to_string()) {
            graph.add_node(self.compound_node(compound, color));
        }
    }

    fn add_pair_reactions(&self, full: &mut Graph, contracted: &mut Graph) -> Result<(), GraphError> {
        let mut occurrences: IndexMap<&str, usize> = IndexMap::new();
        for (rxn, pairs) in &self.pairs.pairs {
            if !self.scope.contains(rxn) {
                continue;
            }
            let declared = self.declared_direction(rxn);
            let reaction = EdgeEnd::reaction(rxn);
            for (c1, c2) in pairs {
                for c in [c1, c2] {
                    let node = self.compound_node(c, self.compound_color(c));
                    full.add_node(node.clone());
                    contracted.add_node(node);
                }
                let node_id = if self.pairs.split_reaction {
                    let count = occurrences.entry(rxn.as_str()).or_insert(0);
                    *count += 1;
                    format!("{}_{}", rxn, count)
                } else {
                    rxn.clone()
                };
                full.add_node(
                    Node::new(
                        node_id.clone(),
                        self.labeler.reaction_label(rxn),
                        NodeShape::Box,
                        self.reaction_color(rxn),
                    )
                    .with_edge_id(rxn),
                );

                let (first, second) = (EdgeEnd::compound(c1), EdgeEnd::compound(c2));
                let (c1_id, c2_id) = (c1.to_string(), c2.to_string());
                full.add_edge(Edge::new(
                    &c1_id,
                    &node_id,
                    self.styler.reaction_edge(&first, &reaction, declared),
                ))?;
                full.add_edge(Edge::new(
                    &node_id,
                    &c2_id,
                    self.styler.reaction_edge(&reaction, &second, declared),
                ))?;
                contracted.add_edge(
                    Edge::new(&c1_id, &c2_id, self.styler.reaction_edge(&first, &reaction, declared))
                        .with_reaction(rxn),
                )?;
            }
        }
        Ok(())
    }

    fn add_direction_groups(&self, combined: &mut Graph) -> Result<(), GraphError> {
        for (c1, c2) in self.directions.keys() {
            for c in [c1, c2] {
                combined.add_node(self.compound_node(c, self.compound_color(c)));
            }
        }
        for ((c1, c2), sets) in self.directions {
            let (first, second) = (EdgeEnd::compound(c1), EdgeEnd::compound(c2));
            for (n, (direction, group)) in sets.groups().enumerate() {
                let node_id = format!("{}_{}_{}", c1, c2, n + 1);
                combined.add_node(Node::new(
                    node_id.clone(),
                    self.labeler.group_label(group),
                    NodeShape::Box,
                    &group_color(group, self.recolor, self.palette),
                ));
                let members = EdgeEnd::reactions(group);
                let dir = EdgeDirection::from(direction);
                combined.add_edge(Edge::new(
                    &c1.to_string(),
                    &node_id,
                    self.styler.group_edge(&first, &members, dir),
                ))?;
                combined.add_edge(Edge::new(
                    &node_id,
                    &c2.to_string(),
                    self.styler.group_edge(&members, &second, dir),
                ))?;
            }
        }
        Ok(())
    }

    fn add_exchange_reactions(&self, full: &mut Graph, combined: &mut Graph) -> Result<(), GraphError> {
        let mut exchanges: Vec<&String> = self
            .subset
            .iter()
            .filter(|r| self.model.is_exchange(r))
            .collect();
        exchanges.sort();
        for rxn in exchanges {
            let Some(equation) = self.model.equation(rxn) else {
                continue;
            };
            if !equation
                .compounds()
                .any(|(c, _)| carries_element(self.formulas, c, self.element))
            {
                continue;
            }
            let node = Node::new(
                rxn.clone(),
                self.labeler.reaction_label(rxn),
                NodeShape::Box,
                &self.palette.exchange,
            )
            .with_edge_id(rxn);
            let declared = self.declared_direction(rxn);
            let reaction = EdgeEnd::reaction(rxn);
            for graph in [&mut *full, &mut *combined] {
                graph.add_node(node.clone());
                for (c, _) in &equation.left {
                    self.ensure_compound(graph, c, &self.palette.exchange_only_compound);
                    let attrs = self.styler.reaction_edge(&EdgeEnd::compound(c), &reaction, declared);
                    graph.add_edge(Edge::new(&c.to_string(), rxn, attrs))?;
                }
                for (c, _) in &equation.right {
                    self.ensure_compound(graph, c, &self.palette.exchange_only_compound);
                    let attrs = self.styler.reaction_edge(&reaction, &EdgeEnd::compound(c), declared);
                    graph.add_edge(Edge::new(rxn, &c.to_string(), attrs))?;
                }
            }
        }
        Ok(())
    }

    /// Fan the biomass reaction out into one node per precursor carrying the element
    fn add_biomass_reaction(&self, full: &mut Graph, combined: &mut Graph) -> Result<(), GraphError> {
        let Some(ref biomass) = self.model.biomass_reaction else {
            warn!("No biomass reaction in this model");
            return Ok(());
        };
        if !self.subset.contains(biomass) {
            debug!(reaction = %biomass, "Biomass reaction is outside the visualized subset");
            return Ok(());
        }
        let Some(equation) = self.model.equation(biomass) else {
            return Ok(());
        };
        let mut precursors: Vec<&Compound> = equation
            .left
            .iter()
            .map(|(c, _)| c)
            .filter(|c| carries_element(self.formulas, c, self.element))
            .collect();
        precursors.sort();
        precursors.dedup();

        let declared = self.declared_direction(biomass);
        let reaction = EdgeEnd::reaction(biomass);
        for (n, c) in precursors.into_iter().enumerate() {
            let node = Node::new(
                format!("{}_{}", biomass, n + 1),
                biomass.clone(),
                NodeShape::Box,
                &self.palette.biomass,
            )
            .with_edge_id(biomass);
            let attrs = self.styler.reaction_edge(&EdgeEnd::compound(c), &reaction, declared);
            for graph in [&mut *full, &mut *combined] {
                graph.add_node(node.clone());
                self.ensure_compound(graph, c, &self.palette.biomass_only_compound);
                graph.add_edge(Edge::new(&c.to_string(), &node.id, attrs.clone()))?;
            }
        }
        Ok(())
    }
}
