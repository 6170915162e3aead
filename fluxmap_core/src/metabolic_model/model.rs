//! This module provides the Model struct for representing an entire metabolic model
use crate::metabolic_model::metabolite::{Compound, Metabolite};
use crate::metabolic_model::reaction::{Equation, Reaction, ReactionActivity};

use indexmap::IndexMap;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
    /// Id of the reaction representing biomass production
    pub biomass_reaction: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
            id: None,
            compartments: None,
            version: None,
            biomass_reaction: None,
        }
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use fluxmap_core::metabolic_model::model::Model;
    /// use fluxmap_core::metabolic_model::reaction::{Reaction, ReactionBuilder};
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction);
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Resolve a metabolite id into a compound, metabolites missing from the model
    /// have no compartment
    pub fn compound(&self, metabolite_id: &str) -> Compound {
        match self.metabolites.get(metabolite_id) {
            Some(met) => met.compound(),
            None => Compound::new(metabolite_id, None),
        }
    }

    /// All compounds of the model, in metabolite order
    pub fn compounds(&self) -> impl Iterator<Item = Compound> + '_ {
        self.metabolites.values().map(|m| m.compound())
    }

    /// Map of the compound display string (e.g. `pyr_c[c]`) to the compound
    pub fn compound_lookup(&self) -> IndexMap<String, Compound> {
        self.compounds().map(|c| (c.to_string(), c)).collect()
    }

    /// Get the equation of a reaction, `None` if the reaction is unknown or has no
    /// metabolites
    pub fn equation(&self, reaction_id: &str) -> Option<Equation> {
        let reaction = self.reactions.get(reaction_id)?;
        if reaction.metabolites.is_empty() {
            return None;
        }
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (met, coef) in &reaction.metabolites {
            if *coef < 0f64 {
                left.push((self.compound(met), -coef));
            } else if *coef > 0f64 {
                right.push((self.compound(met), *coef));
            }
        }
        Some(Equation { left, right })
    }

    /// Equations of all reactions which have one, sorted by reaction id
    pub fn equations(&self) -> IndexMap<String, Equation> {
        let mut equations: IndexMap<String, Equation> = self
            .reactions
            .keys()
            .filter_map(|id| self.equation(id).map(|eq| (id.clone(), eq)))
            .collect();
        equations.sort_keys();
        equations
    }

    /// Whether the reaction crosses the model boundary
    ///
    /// The biomass reaction is never an exchange, even when it has no products.
    pub fn is_exchange(&self, reaction_id: &str) -> bool {
        if self.biomass_reaction.as_deref() == Some(reaction_id) {
            return false;
        }
        self.equation(reaction_id)
            .map(|eq| eq.is_boundary())
            .unwrap_or(false)
    }

    /// Whether the reaction is part of the active model
    pub fn is_active(&self, reaction_id: &str) -> bool {
        self.reactions
            .get(reaction_id)
            .map(|r| r.activity == ReactionActivity::Active)
            .unwrap_or(false)
    }

    /// Mark a reaction as outside the active model, returns false for unknown ids
    pub fn deactivate_reaction(&mut self, reaction_id: &str) -> bool {
        match self.reactions.get_mut(reaction_id) {
            Some(reaction) => {
                reaction.activity = ReactionActivity::Inactive;
                true
            }
            None => false,
        }
    }
}
