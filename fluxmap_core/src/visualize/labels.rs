//! Node labels
use crate::metabolic_model::metabolite::Compound;
use crate::metabolic_model::model::Model;
use crate::visualize::FluxMap;

/// Builds node labels from model properties and fluxes
pub struct Labeler<'a> {
    model: &'a Model,
    /// Property names shown on each label, in order
    detail: Option<&'a [String]>,
    fluxes: &'a FluxMap,
}

impl<'a> Labeler<'a> {
    pub fn new(model: &'a Model, detail: Option<&'a [String]>, fluxes: &'a FluxMap) -> Labeler<'a> {
        Labeler {
            model,
            detail,
            fluxes,
        }
    }

    fn with_flux(&self, label: String, reaction_id: &str) -> String {
        match self.fluxes.get(reaction_id) {
            Some(flux) => format!("{}\n{:?}", label, flux),
            None => label,
        }
    }

    /// Label of a reaction node
    ///
    /// Without detail properties this is the reaction id, otherwise the values of the
    /// requested properties the reaction has. The flux is appended when known.
    pub fn reaction_label(&self, reaction_id: &str) -> String {
        let base = match (self.detail, self.model.reactions.get(reaction_id)) {
            (Some(detail), Some(reaction)) => {
                let props = reaction.properties();
                let lines: Vec<&str> = detail
                    .iter()
                    .filter_map(|p| props.get(p).map(|v| v.as_str()))
                    .collect();
                if lines.is_empty() {
                    reaction_id.to_string()
                } else {
                    lines.join("\n")
                }
            }
            _ => reaction_id.to_string(),
        };
        self.with_flux(base, reaction_id)
    }

    /// Label of a compound node, the compound followed by any requested properties
    /// other than the id
    pub fn compound_label(&self, compound: &Compound) -> String {
        let mut label = compound.to_string();
        let (Some(detail), Some(met)) = (self.detail, self.model.metabolites.get(&compound.name)) else {
            return label;
        };
        let props = met.properties();
        for prop in detail.iter().filter(|p| p.as_str() != "id") {
            if let Some(value) = props.get(prop) {
                label.push('\n');
                label.push_str(value);
            }
        }
        label
    }

    /// Label of a combined node, the member ids followed by their summed absolute flux
    pub fn group_label(&self, reaction_ids: &[String]) -> String {
        if let [id] = reaction_ids {
            return self.reaction_label(id);
        }
        let members = reaction_ids.join("\n");
        if self.fluxes.is_empty() {
            return members;
        }
        let total: f64 = reaction_ids
            .iter()
            .filter_map(|r| self.fluxes.get(r))
            .map(|f| f.abs())
            .sum();
        format!("{}\n{:?}", members, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::test_models::scenario_model;

    #[test]
    fn plain_labels() {
        let model = scenario_model();
        let fluxes = FluxMap::new();
        let labeler = Labeler::new(&model, None, &fluxes);
        assert_eq!(labeler.reaction_label("R1"), "R1");
        assert_eq!(labeler.compound_label(&Compound::new("A", Some("c"))), "A[c]");
    }

    #[test]
    fn flux_is_appended() {
        let model = scenario_model();
        let mut fluxes = FluxMap::new();
        fluxes.insert("R1".to_string(), 2.0);
        let labeler = Labeler::new(&model, None, &fluxes);
        assert_eq!(labeler.reaction_label("R1"), "R1\n2.0");
        assert_eq!(labeler.reaction_label("EX_A"), "EX_A");
    }

    #[test]
    fn detail_properties() {
        let model = scenario_model();
        let fluxes = FluxMap::new();
        let detail = vec!["id".to_string(), "formula".to_string(), "missing".to_string()];
        let labeler = Labeler::new(&model, Some(detail.as_slice()), &fluxes);
        assert_eq!(labeler.compound_label(&Compound::new("A", Some("c"))), "A[c]\nC2H4O2");
        assert_eq!(labeler.reaction_label("R1"), "R1");

        let detail = vec!["lower_bound".to_string()];
        let labeler = Labeler::new(&model, Some(detail.as_slice()), &fluxes);
        assert_eq!(labeler.reaction_label("R1"), "0.0");
    }

    #[test]
    fn group_labels() {
        let model = scenario_model();
        let mut fluxes = FluxMap::new();
        fluxes.insert("R1".to_string(), 2.0);
        fluxes.insert("R2".to_string(), -3.0);
        let labeler = Labeler::new(&model, None, &fluxes);
        let ids = vec!["R1".to_string(), "R2".to_string()];
        assert_eq!(labeler.group_label(&ids), "R1\nR2\n5.0");
        assert_eq!(labeler.group_label(&ids[..1]), "R1\n2.0");

        let empty = FluxMap::new();
        let labeler = Labeler::new(&model, None, &empty);
        assert_eq!(labeler.group_label(&ids), "R1\nR2");
    }
}
