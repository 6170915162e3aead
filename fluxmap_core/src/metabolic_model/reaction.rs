//! This module provides a struct for representing reactions
use crate::configuration::{DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND};
use crate::metabolic_model::metabolite::Compound;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction, negative for consumed metabolites
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Protein Reaction rule, kept as text for labelling
    #[builder(default = "None")]
    pub gene_reaction_rule: Option<String>,
    /// Lower flux bound
    #[builder(default = "DEFAULT_LOWER_BOUND")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "DEFAULT_UPPER_BOUND")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
    /// Reaction Activity
    #[builder(default = "ReactionActivity::Active")]
    pub activity: ReactionActivity,
}

impl Reaction {
    /// Direction the reaction is allowed to run in, determined by its flux bounds
    pub fn direction(&self) -> Direction {
        if self.lower_bound < 0f64 && self.upper_bound > 0f64 {
            Direction::Both
        } else if self.upper_bound <= 0f64 && self.lower_bound < 0f64 {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Properties of the reaction which can be shown on a node label, in a fixed order
    pub fn properties(&self) -> IndexMap<String, String> {
        let mut props = IndexMap::new();
        props.insert("id".to_string(), self.id.clone());
        let optional = [
            ("name", &self.name),
            ("genes", &self.gene_reaction_rule),
            ("subsystem", &self.subsystem),
            ("notes", &self.notes),
            ("annotation", &self.annotation),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                props.insert(key.to_string(), v.clone());
            }
        }
        props.insert("lower_bound".to_string(), format!("{:?}", self.lower_bound));
        props.insert("upper_bound".to_string(), format!("{:?}", self.upper_bound));
        props
    }
}

/// Whether a Reaction is active or inactive
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactionActivity {
    /// The Reaction is active and can carry flux
    Active,
    /// The Reaction is inactive and can't carry flux
    Inactive,
}

/// Direction a reaction is declared to run in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right only
    Forward,
    /// Right to left only
    Reverse,
    /// Reversible
    Both,
}

/// Reaction equation with compounds resolved to their compartments
///
/// Coefficients are always positive, the side determines whether a compound is consumed.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    /// Reactants
    pub left: Vec<(Compound, f64)>,
    /// Products
    pub right: Vec<(Compound, f64)>,
}

impl Equation {
    /// Every compound of the equation, reactants first
    pub fn compounds(&self) -> impl Iterator<Item = &(Compound, f64)> {
        self.left.iter().chain(self.right.iter())
    }

    /// True when exactly one side of the equation is empty, i.e. the reaction crosses the
    /// model boundary
    pub fn is_boundary(&self) -> bool {
        self.left.is_empty() != self.right.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction_with_bounds(lower: f64, upper: f64) -> Reaction {
        ReactionBuilder::default()
            .id("r".to_string())
            .lower_bound(lower)
            .upper_bound(upper)
            .build()
            .unwrap()
    }

    #[test]
    fn direction_from_bounds() {
        assert_eq!(reaction_with_bounds(0., 1000.).direction(), Direction::Forward);
        assert_eq!(reaction_with_bounds(-1000., 0.).direction(), Direction::Reverse);
        assert_eq!(reaction_with_bounds(-1000., 1000.).direction(), Direction::Both);
        // A blocked reaction falls back to forward
        assert_eq!(reaction_with_bounds(0., 0.).direction(), Direction::Forward);
    }

    #[test]
    fn default_bounds_are_reversible() {
        let reaction = ReactionBuilder::default()
            .id("r".to_string())
            .build()
            .unwrap();
        assert_eq!(reaction.direction(), Direction::Both);
        assert_eq!(reaction.activity, ReactionActivity::Active);
    }
}
