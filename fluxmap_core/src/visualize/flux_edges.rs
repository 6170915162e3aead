//! Edge magnitudes derived from reaction fluxes
use indexmap::{IndexMap, IndexSet};

use crate::metabolic_model::metabolite::Compound;
use crate::metabolic_model::reaction::Equation;
use crate::visualize::direction::DirectionMap;
use crate::visualize::formula_gate::carries_element;
use crate::visualize::{FluxMap, FormulaMap};

/// Fluxes with a smaller magnitude are treated as zero
pub const FLUX_THRESHOLD: f64 = 1e-9;

/// One side of a directed edge magnitude
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeEnd {
    Compound(Compound),
    Reaction(String),
    /// Several co-directional reactions drawn as a single node
    Group(Vec<String>),
}

impl EdgeEnd {
    /// The end standing for a list of reactions, a single reaction is not a group
    pub fn reactions(ids: &[String]) -> EdgeEnd {
        match ids {
            [id] => EdgeEnd::Reaction(id.clone()),
            _ => EdgeEnd::Group(ids.to_vec()),
        }
    }

    pub fn compound(compound: &Compound) -> EdgeEnd {
        EdgeEnd::Compound(compound.clone())
    }

    pub fn reaction(id: &str) -> EdgeEnd {
        EdgeEnd::Reaction(id.to_string())
    }
}

/// Directed magnitude for each (from, to) pair of graph entities
///
/// Empty when no flux data is available.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeValues {
    values: IndexMap<(EdgeEnd, EdgeEnd), f64>,
}

impl EdgeValues {
    /// Convert reaction fluxes into edge magnitudes
    ///
    /// A positive flux runs from each reactant into the reaction and from the reaction into
    /// each product, a negative flux the other way around. Magnitudes are the absolute flux
    /// times the stoichiometric coefficient. Only compounds carrying `element` get edges.
    pub fn from_fluxes(
        fluxes: &FluxMap,
        equations: &IndexMap<String, Equation>,
        formulas: &FormulaMap,
        element: Option<&str>,
    ) -> EdgeValues {
        let mut edges = EdgeValues::default();
        for (id, equation) in equations {
            let Some(&flux) = fluxes.get(id) else {
                continue;
            };
            if flux.abs() < FLUX_THRESHOLD {
                continue;
            }
            let (sources, sinks) = if flux > 0. {
                (&equation.left, &equation.right)
            } else {
                (&equation.right, &equation.left)
            };
            let reaction = EdgeEnd::reaction(id);
            for (compound, coef) in sinks {
                if carries_element(formulas, compound, element) {
                    edges.insert(reaction.clone(), EdgeEnd::compound(compound), flux.abs() * coef);
                }
            }
            for (compound, coef) in sources {
                if carries_element(formulas, compound, element) {
                    edges.insert(EdgeEnd::compound(compound), reaction.clone(), flux.abs() * coef);
                }
            }
        }
        edges
    }

    /// Replace the magnitudes of co-directional reactions sharing a compound pair by the
    /// summed magnitude of their combined node
    pub fn combine_groups(&mut self, directions: &DirectionMap, fluxes: &FluxMap) {
        let mut removed: IndexSet<(EdgeEnd, EdgeEnd)> = IndexSet::new();
        let mut combined: Vec<((EdgeEnd, EdgeEnd), f64)> = Vec::new();
        for ((c1, c2), sets) in directions {
            let first = EdgeEnd::compound(c1);
            let second = EdgeEnd::compound(c2);
            // Forward groups flow c1 -> group -> c2, back groups c2 -> group -> c1
            for (group, from, to) in [(&sets.forward, &first, &second), (&sets.back, &second, &first)] {
                if group.len() < 2 || group.iter().all(|r| !fluxes.contains_key(r)) {
                    continue;
                }
                let (mut into_group, mut out_of_group) = (0., 0.);
                for r in group.iter().filter(|r| fluxes.contains_key(*r)) {
                    let reaction = EdgeEnd::reaction(r);
                    let incoming = (from.clone(), reaction.clone());
                    let outgoing = (reaction, to.clone());
                    into_group += self.values.get(&incoming).copied().unwrap_or(0.);
                    out_of_group += self.values.get(&outgoing).copied().unwrap_or(0.);
                    removed.insert(incoming);
                    removed.insert(outgoing);
                }
                let node = EdgeEnd::reactions(group);
                combined.push(((from.clone(), node.clone()), into_group));
                combined.push(((node, to.clone()), out_of_group));
            }
        }
        for (key, value) in combined {
            self.values.insert(key, value);
        }
        for key in removed {
            self.values.shift_remove(&key);
        }
    }

    pub fn insert(&mut self, from: EdgeEnd, to: EdgeEnd, value: f64) {
        self.values.insert((from, to), value);
    }

    /// Magnitude of the edge from `from` to `to`
    pub fn get(&self, from: &EdgeEnd, to: &EdgeEnd) -> Option<f64> {
        // Keys are owned tuples, so the lookup key has to be built
        self.values.get(&(from.clone(), to.clone())).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }
}
