//! Prediction of the reactant/product pairs which exchange atoms within a reaction
use indexmap::IndexMap;

use crate::metabolic_model::formula::Formula;
use crate::metabolic_model::metabolite::Compound;
use crate::metabolic_model::reaction::Equation;
use crate::visualize::{CompoundPair, FormulaMap};

/// Formulas transferred between the two compounds of each pair in one reaction
pub type TransferMap = IndexMap<CompoundPair, Vec<Formula>>;

/// Predicted transfers for each reaction id
pub type PredictedPairs = IndexMap<String, TransferMap>;

/// Predicts which compound pairs of a reaction share atoms
pub trait PairPredictor {
    /// Predict the transfers of every reaction
    ///
    /// `formulas` holds a formula for every compound of every equation.
    fn predict(&self, reactions: &[(String, Equation)], formulas: &FormulaMap) -> PredictedPairs;
}

/// Greedy assignment of shared atoms between reactants and products
///
/// Each round picks the reactant/product pair whose remaining formulas are most similar
/// (weighted Jaccard of the element counts), records their shared atoms as a transfer and
/// removes those atoms from both sides. Rounds continue until no pair shares any atom with
/// a positive weight.
#[derive(Clone, Debug)]
pub struct GreedyTransferPredictor {
    pub hydrogen_weight: f64,
    pub carbon_weight: f64,
    pub other_weight: f64,
}

impl Default for GreedyTransferPredictor {
    fn default() -> Self {
        GreedyTransferPredictor {
            hydrogen_weight: 0.,
            carbon_weight: 1.,
            other_weight: 0.82,
        }
    }
}

impl GreedyTransferPredictor {
    /// Weight of a single atom of `element`
    pub fn element_weight(&self, element: &str) -> f64 {
        match element {
            "H" => self.hydrogen_weight,
            "C" => self.carbon_weight,
            _ => self.other_weight,
        }
    }

    fn weight(&self, formula: &Formula) -> f64 {
        formula
            .elements()
            .map(|(element, count)| self.element_weight(element) * count as f64)
            .sum()
    }

    fn side(&self, compounds: &[(Compound, f64)], formulas: &FormulaMap) -> Vec<(Compound, Formula)> {
        compounds
            .iter()
            .filter_map(|(compound, coef)| {
                let formula = formulas.get(&compound.name)?;
                let mut scaled = Formula::default();
                scaled.merge(formula, coef.round().max(1.) as u64)?;
                Some((compound.clone(), scaled))
            })
            .collect()
    }

    /// Predict the transfers of a single reaction
    pub fn predict_reaction(&self, equation: &Equation, formulas: &FormulaMap) -> TransferMap {
        let mut left = self.side(&equation.left, formulas);
        let mut right = self.side(&equation.right, formulas);
        let mut transfers = TransferMap::new();

        loop {
            let mut best: Option<(usize, usize, Formula, f64)> = None;
            for (i, (_, lf)) in left.iter().enumerate() {
                for (j, (_, rf)) in right.iter().enumerate() {
                    let shared = lf.intersection(rf);
                    let shared_weight = self.weight(&shared);
                    if shared_weight <= 0. {
                        continue;
                    }
                    let union_weight = self.weight(lf) + self.weight(rf) - shared_weight;
                    let score = shared_weight / union_weight;
                    if best.as_ref().map_or(true, |(_, _, _, s)| score > *s) {
                        best = Some((i, j, shared, score));
                    }
                }
            }
            let Some((i, j, shared, _)) = best else {
                break;
            };
            left[i].1.subtract(&shared);
            right[j].1.subtract(&shared);
            transfers
                .entry((left[i].0.clone(), right[j].0.clone()))
                .or_default()
                .push(shared);
        }
        transfers
    }
}

impl PairPredictor for GreedyTransferPredictor {
    fn predict(&self, reactions: &[(String, Equation)], formulas: &FormulaMap) -> PredictedPairs {
        reactions
            .iter()
            .map(|(id, equation)| (id.clone(), self.predict_reaction(equation, formulas)))
            .collect()
    }
}
