//! Selection of the compound formulas usable for element tracing
use tracing::warn;

use crate::metabolic_model::formula::Formula;
use crate::metabolic_model::metabolite::Compound;
use crate::metabolic_model::model::Model;
use crate::visualize::FormulaMap;

/// Parse the formula of every metabolite that has one
///
/// Formulas which fail to parse, or which contain generic parts, are logged and skipped.
/// The result is keyed by metabolite id.
pub fn compound_formulas(model: &Model) -> FormulaMap {
    let mut formulas = FormulaMap::new();
    for met in model.metabolites.values() {
        let Some(ref raw) = met.formula else {
            continue;
        };
        match Formula::parse(raw) {
            Ok(formula) if formula.is_variable() => {
                warn!(compound = %met.id, formula = %raw, "Skipping variable formula");
            }
            Ok(formula) => {
                formulas.insert(met.id.clone(), formula);
            }
            Err(err) => {
                warn!(compound = %met.id, formula = %raw, error = %err, "Error parsing formula");
            }
        }
    }
    formulas
}

/// Normalize a tracked element symbol
///
/// A single letter is upper cased so `c` and `C` both track carbon, longer symbols are
/// used as given.
pub fn primary_element(element: &str) -> String {
    let mut chars = element.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
        _ => element.to_string(),
    }
}

/// Whether the compound's formula contains the tracked element
///
/// Always true without an element filter, always false for compounds without a usable
/// formula otherwise.
pub fn carries_element(formulas: &FormulaMap, compound: &Compound, element: Option<&str>) -> bool {
    match element {
        None => true,
        Some(el) => formulas
            .get(&compound.name)
            .is_some_and(|formula| formula.contains(el)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::test_models::metabolite;

    #[test]
    fn skips_variable_and_malformed() {
        let mut model = Model::new_empty();
        model.add_metabolite(metabolite("glc", "c", "C6H12O6"));
        model.add_metabolite(metabolite("starch", "c", "(C6H10O5)n"));
        model.add_metabolite(metabolite("protein", "c", "C5H8NOR"));
        model.add_metabolite(metabolite("broken", "c", "C6(H12"));
        model.add_metabolite(metabolite("unknown", "c", ""));
        let formulas = compound_formulas(&model);
        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas["glc"].count("C"), 6);
    }

    #[test]
    fn skips_overflowing_counts() {
        let mut model = Model::new_empty();
        model.add_metabolite(metabolite("glc", "c", "C6H12O6"));
        model.add_metabolite(metabolite("huge", "c", "(C2)18446744073709551615"));
        let formulas = compound_formulas(&model);
        assert_eq!(formulas.len(), 1);
        assert!(!formulas.contains_key("huge"));
    }

    #[test]
    fn element_normalization() {
        assert_eq!(primary_element("c"), "C");
        assert_eq!(primary_element("N"), "N");
        assert_eq!(primary_element("Fe"), "Fe");
        assert_eq!(primary_element("fe"), "fe");
    }

    #[test]
    fn element_carrying() {
        let mut formulas = FormulaMap::new();
        formulas.insert("glc".to_string(), Formula::parse("C6H12O6").unwrap());
        formulas.insert("h".to_string(), Formula::parse("H").unwrap());
        let glc = Compound::new("glc", Some("c"));
        let h = Compound::new("h", Some("c"));
        let missing = Compound::new("x", Some("c"));
        assert!(carries_element(&formulas, &glc, Some("C")));
        assert!(!carries_element(&formulas, &h, Some("C")));
        assert!(!carries_element(&formulas, &missing, Some("C")));
        assert!(carries_element(&formulas, &missing, None));
    }
}
