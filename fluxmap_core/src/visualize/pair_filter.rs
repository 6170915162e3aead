//! Selection of the reactant/product pairs drawn for each reaction
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::io::tsv::read_pair_table;
use crate::metabolic_model::formula::Formula;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Equation;
use crate::visualize::formula_gate::carries_element;
use crate::visualize::predict::PairPredictor;
use crate::visualize::{CompoundPair, FormulaMap, VisError};

/// How compound pairs are chosen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairPolicy {
    /// Pairs predicted from the transfer of atoms between reactants and products
    Predicted,
    /// Every reactant paired with every product
    Naive,
    /// Pairs listed in a tab separated file
    FileBased(PathBuf),
}

impl PairPolicy {
    /// Interpret a method name, `fpp` and `no-fpp` select the predicted and naive
    /// policies, anything else is taken as the path of a pair file
    pub fn from_method(method: &str) -> PairPolicy {
        match method {
            "fpp" => PairPolicy::Predicted,
            "no-fpp" => PairPolicy::Naive,
            path => PairPolicy::FileBased(PathBuf::from(path)),
        }
    }

    /// Whether reactions are drawn once per compound pair
    pub fn splits_reactions(&self) -> bool {
        !matches!(self, PairPolicy::Naive)
    }
}

/// Compound pairs of each reaction
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredPairs {
    /// Reaction id to its pairs, sorted by reaction id
    pub pairs: IndexMap<String, Vec<CompoundPair>>,
    /// Whether each reaction should be drawn once per pair it appears in
    pub split_reaction: bool,
}

/// Inputs shared by the pair selection policies
pub struct PairFilter<'a> {
    pub model: &'a Model,
    pub formulas: &'a FormulaMap,
    /// Normalized tracked element, `None` keeps pairs regardless of their atoms
    pub element: Option<&'a str>,
    /// Pairs never drawn, stored in both orientations
    pub exclude_pairs: &'a IndexSet<CompoundPair>,
    /// Reactions left out of pair prediction
    pub exclude_reactions: &'a IndexSet<String>,
}

impl<'a> PairFilter<'a> {
    /// Select the compound pairs of every reaction with `policy`
    pub fn filter(
        &self,
        policy: &PairPolicy,
        predictor: &dyn PairPredictor,
    ) -> Result<FilteredPairs, VisError> {
        let mut pairs = match policy {
            PairPolicy::Predicted => self.predicted(predictor)?,
            PairPolicy::Naive => self.naive(),
            PairPolicy::FileBased(path) => self.from_file(path)?,
        };
        pairs.sort_keys();
        debug!(reactions = pairs.len(), "Selected compound pairs");
        Ok(FilteredPairs {
            pairs,
            split_reaction: policy.splits_reactions(),
        })
    }

    fn sorted_reaction_ids(&self) -> Vec<&String> {
        let mut ids: Vec<&String> = self.model.reactions.keys().collect();
        ids.sort();
        ids
    }

    fn predicted(
        &self,
        predictor: &dyn PairPredictor,
    ) -> Result<IndexMap<String, Vec<CompoundPair>>, VisError> {
        let mut reactions: Vec<(String, Equation)> = Vec::new();
        let mut no_equation = Vec::new();
        let mut no_formula = Vec::new();
        for id in self.sorted_reaction_ids() {
            if !self.model.is_active(id) || self.exclude_reactions.contains(id) {
                continue;
            }
            let Some(equation) = self.model.equation(id) else {
                no_equation.push(id.clone());
                continue;
            };
            if equation
                .compounds()
                .any(|(c, _)| !self.formulas.contains_key(&c.name))
            {
                no_formula.push(id.clone());
                continue;
            }
            reactions.push((id.clone(), equation));
        }
        if !no_equation.is_empty() {
            return Err(VisError::MissingEquations(no_equation));
        }
        if !no_formula.is_empty() {
            return Err(VisError::MissingFormulas(no_formula));
        }

        let predicted = predictor.predict(&reactions, self.formulas);
        let mut filtered = IndexMap::new();
        for (id, transfers) in predicted {
            let pairs = transfers
                .into_iter()
                .filter(|(pair, _)| !self.exclude_pairs.contains(pair))
                .filter(|(_, transfer)| match self.element {
                    None => true,
                    Some(el) => transfer.iter().any(|f| f.contains(el)),
                })
                .map(|(pair, _)| pair)
                .collect();
            filtered.insert(id, pairs);
        }
        Ok(filtered)
    }

    fn naive(&self) -> IndexMap<String, Vec<CompoundPair>> {
        let mut filtered = IndexMap::new();
        for id in self.sorted_reaction_ids() {
            if !self.model.is_active(id) || self.model.biomass_reaction.as_ref() == Some(id) {
                continue;
            }
            let Some(equation) = self.model.equation(id) else {
                continue;
            };
            let mut pairs = Vec::new();
            for (c1, _) in &equation.left {
                for (c2, _) in &equation.right {
                    let pair = (c1.clone(), c2.clone());
                    if self.exclude_pairs.contains(&pair) {
                        continue;
                    }
                    if carries_element(self.formulas, c1, self.element)
                        && carries_element(self.formulas, c2, self.element)
                    {
                        pairs.push(pair);
                    }
                }
            }
            filtered.insert(id.clone(), pairs);
        }
        filtered
    }

    fn from_file(&self, path: &Path) -> Result<IndexMap<String, Vec<CompoundPair>>, VisError> {
        let rows = read_pair_table(path).map_err(|source| VisError::PairFile {
            path: path.to_path_buf(),
            source,
        })?;
        let lookup = self.model.compound_lookup();
        let resolve = |id: &str| {
            lookup
                .get(id)
                .cloned()
                .ok_or_else(|| VisError::UnknownCompound(id.to_string()))
        };

        let mut filtered: IndexMap<String, Vec<CompoundPair>> = IndexMap::new();
        for row in rows {
            if !self.model.reactions.contains_key(&row.reaction) {
                warn!(reaction = %row.reaction, "Skipping pair of a reaction not in the model");
                continue;
            }
            let pair = (resolve(&row.first)?, resolve(&row.second)?);
            if self.exclude_pairs.contains(&pair) {
                continue;
            }
            let keep = match (self.element, &row.formula) {
                (None, _) => true,
                (Some(el), Some(raw)) => match Formula::parse(raw) {
                    Ok(formula) => formula.contains(el),
                    Err(err) => {
                        warn!(reaction = %row.reaction, formula = %raw, error = %err,
                            "Skipping pair with unparsable transfer formula");
                        false
                    }
                },
                (Some(el), None) => {
                    carries_element(self.formulas, &pair.0, Some(el))
                        && carries_element(self.formulas, &pair.1, Some(el))
                }
            };
            if keep {
                filtered.entry(row.reaction).or_default().push(pair);
            }
        }
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::Compound;
    use crate::metabolic_model::test_models::{metabolite, reaction, scenario_model};
    use crate::visualize::formula_gate::compound_formulas;
    use crate::visualize::predict::GreedyTransferPredictor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn c(name: &str) -> Compound {
        Compound::new(name, Some("c"))
    }

    fn run(model: &Model, policy: &PairPolicy, element: Option<&str>) -> Result<FilteredPairs, VisError> {
        let formulas = compound_formulas(model);
        let exclude_pairs = IndexSet::new();
        let exclude_reactions = IndexSet::new();
        let filter = PairFilter {
            model,
            formulas: &formulas,
            element,
            exclude_pairs: &exclude_pairs,
            exclude_reactions: &exclude_reactions,
        };
        filter.filter(policy, &GreedyTransferPredictor::default())
    }

    #[test]
    fn naive_cross_product() {
        let mut model = scenario_model();
        model.add_metabolite(metabolite("h", "c", "H"));
        model.add_reaction(reaction("R2", &[("C", -1.), ("A", 1.), ("h", 1.)], 0., 1000.));
        let result = run(&model, &PairPolicy::Naive, Some("C")).unwrap();
        assert!(!result.split_reaction);
        assert_eq!(result.pairs["R1"], vec![(c("A"), c("C")), (c("B"), c("C"))]);
        // The proton carries no carbon
        assert_eq!(result.pairs["R2"], vec![(c("C"), c("A"))]);
        assert!(result.pairs["EX_A"].is_empty());

        let unfiltered = run(&model, &PairPolicy::Naive, None).unwrap();
        assert_eq!(unfiltered.pairs["R2"].len(), 2);
    }

    #[test]
    fn naive_skips_biomass() {
        let mut model = scenario_model();
        model.biomass_reaction = Some("R1".to_string());
        let result = run(&model, &PairPolicy::Naive, Some("C")).unwrap();
        assert!(!result.pairs.contains_key("R1"));
    }

    #[test]
    fn inactive_reactions_are_skipped() {
        let mut model = scenario_model();
        model.add_metabolite(metabolite("D", "c", ""));
        model.add_reaction(reaction("R2", &[("C", -1.), ("A", 1.)], 0., 1000.));
        // Would abort the predicted policy if it were active
        model.add_reaction(reaction("R3", &[("C", -1.), ("D", 1.)], 0., 1000.));
        assert!(model.deactivate_reaction("R2"));
        assert!(model.deactivate_reaction("R3"));

        let predicted = run(&model, &PairPolicy::Predicted, Some("C")).unwrap();
        assert!(predicted.pairs.contains_key("R1"));
        assert!(!predicted.pairs.contains_key("R2"));
        assert!(!predicted.pairs.contains_key("R3"));

        let naive = run(&model, &PairPolicy::Naive, Some("C")).unwrap();
        assert!(naive.pairs.contains_key("R1"));
        assert!(!naive.pairs.contains_key("R2"));
        assert!(!naive.pairs.contains_key("R3"));
    }

    #[test]
    fn predicted_requires_formulas() {
        let mut model = scenario_model();
        model.add_metabolite(metabolite("D", "c", ""));
        model.add_reaction(reaction("R3", &[("C", -1.), ("D", 1.)], 0., 1000.));
        model.add_reaction(reaction("R4", &[("D", -1.), ("A", 1.)], 0., 1000.));
        match run(&model, &PairPolicy::Predicted, Some("C")) {
            Err(VisError::MissingFormulas(ids)) => assert_eq!(ids, vec!["R3", "R4"]),
            other => panic!("Expected missing formulas, got {:?}", other),
        }
    }

    #[test]
    fn predicted_requires_equations() {
        let mut model = scenario_model();
        model.add_reaction(reaction("EMPTY", &[], 0., 1000.));
        assert!(matches!(
            run(&model, &PairPolicy::Predicted, Some("C")),
            Err(VisError::MissingEquations(ids)) if ids == vec!["EMPTY".to_string()]
        ));
    }

    #[test]
    fn predicted_pairs_follow_carbon() {
        let model = scenario_model();
        let result = run(&model, &PairPolicy::Predicted, Some("C")).unwrap();
        assert!(result.split_reaction);
        let pairs = &result.pairs["R1"];
        assert!(pairs.contains(&(c("A"), c("C"))));
        assert!(pairs.contains(&(c("B"), c("C"))));
        assert!(result.pairs["EX_A"].is_empty());
    }

    #[test]
    fn predicted_respects_exclusions() {
        let model = scenario_model();
        let formulas = compound_formulas(&model);
        let mut exclude_pairs = IndexSet::new();
        exclude_pairs.insert((c("B"), c("C")));
        let mut exclude_reactions = IndexSet::new();
        exclude_reactions.insert("EX_A".to_string());
        let filter = PairFilter {
            model: &model,
            formulas: &formulas,
            element: Some("C"),
            exclude_pairs: &exclude_pairs,
            exclude_reactions: &exclude_reactions,
        };
        let result = filter
            .filter(&PairPolicy::Predicted, &GreedyTransferPredictor::default())
            .unwrap();
        assert_eq!(result.pairs["R1"], vec![(c("A"), c("C"))]);
        assert!(!result.pairs.contains_key("EX_A"));
    }

    #[test]
    fn file_based_pairs() {
        let model = scenario_model();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"R1\tA[c]\tC[c]\tC2\nR1\tB[c]\tC[c]\tO\nGONE\tA[c]\tC[c]\n")
            .unwrap();
        let policy = PairPolicy::FileBased(file.path().to_path_buf());
        let result = run(&model, &policy, Some("C")).unwrap();
        assert!(result.split_reaction);
        assert_eq!(result.pairs["R1"], vec![(c("A"), c("C"))]);
        assert!(!result.pairs.contains_key("GONE"));

        let unfiltered = run(&model, &policy, None).unwrap();
        assert_eq!(unfiltered.pairs["R1"].len(), 2);
    }

    #[test]
    fn file_based_unknown_compound() {
        let model = scenario_model();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"R1\tA[c]\tZ[c]\n").unwrap();
        let policy = PairPolicy::FileBased(file.path().to_path_buf());
        assert!(matches!(
            run(&model, &policy, None),
            Err(VisError::UnknownCompound(id)) if id == "Z[c]"
        ));
    }

    #[test]
    fn file_based_missing_file() {
        let model = scenario_model();
        let policy = PairPolicy::FileBased(PathBuf::from("no/such/pairs.tsv"));
        assert!(matches!(run(&model, &policy, None), Err(VisError::PairFile { .. })));
    }

    #[test]
    fn method_names() {
        assert_eq!(PairPolicy::from_method("fpp"), PairPolicy::Predicted);
        assert_eq!(PairPolicy::from_method("no-fpp"), PairPolicy::Naive);
        assert_eq!(
            PairPolicy::from_method("pairs.tsv"),
            PairPolicy::FileBased(PathBuf::from("pairs.tsv"))
        );
    }
}
