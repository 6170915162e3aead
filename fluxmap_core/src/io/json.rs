//! Module providing JSON input for fluxmap Models
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionBuilderError};

// region JSON Model
/// Represents a JSON serialized model, used for reading models in the COBRA json layout
#[derive(Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    id: Option<String>,
    compartments: Option<IndexMap<String, String>>,
    version: Option<String>,
}

#[derive(Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: Option<String>,
    charge: Option<i32>,
    formula: Option<String>,
    notes: Option<Value>,
    annotation: Option<Value>,
}

#[derive(Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    #[serde(default)]
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: Option<String>,
    objective_coefficient: Option<f64>,
    subsystem: Option<String>,
    notes: Option<Value>,
    annotation: Option<Value>,
}
// endregion JSON Model

// region Conversions
impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
            notes: m.notes.map(|v| v.to_string()),
            annotation: m.annotation.map(|v| v.to_string()),
        }
    }
}

impl Model {
    /// Read a model stored in the COBRA json layout
    ///
    /// The first reaction with a non-zero objective coefficient is taken as the biomass
    /// reaction.
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        let json_model = match serde_json::from_str::<JsonModel>(&model_str) {
            Ok(model) => model,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Model::from_json(json_model)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        json_model.metabolites.into_iter().for_each(|m| {
            model.add_metabolite(Metabolite::from(m));
        });
        for rxn in json_model.reactions {
            let gene_reaction_rule = rxn.gene_reaction_rule.filter(|rule| !rule.is_empty());
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id.clone())
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .gene_reaction_rule(gene_reaction_rule)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .notes(rxn.notes.map(|v| v.to_string()))
                .annotation(rxn.annotation.map(|v| v.to_string()))
                .build()?;
            if model.biomass_reaction.is_none()
                && rxn.objective_coefficient.is_some_and(|coef| coef != 0f64)
            {
                model.biomass_reaction = Some(rxn.id.clone());
            }
            model.add_reaction(new_reaction);
        }
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;
        Ok(model)
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
}

// endregion Conversions

#[cfg(test)]
mod json_tests {
    use crate::io::json::{JsonMetabolite, JsonReaction};
    use std::collections::HashMap;

    #[test]
    fn json_metabolite() {
        let data = r#"{
"id":"glc__D_e",
"name":"D-Glucose",
"compartment":"e",
"charge":0,
"formula":"C6H12O6",
"notes":{
"original_bigg_ids":[
"glc_D_e"
]
},
"annotation":{
"bigg.metabolite":[
"glc__D"
],
"kegg.compound":[
"C00031"
],
"sbo":"SBO:0000247"
}
}"#;
        let met: JsonMetabolite = serde_json::from_str(data).unwrap();
        assert_eq!(met.id, "glc__D_e");
        assert_eq!(met.name.unwrap(), "D-Glucose");
        assert_eq!(met.compartment.unwrap(), "e");
        assert_eq!(met.charge.unwrap(), 0);
        assert_eq!(met.formula.unwrap(), "C6H12O6");
    }

    #[test]
    fn json_reaction() {
        let data = r#"{
"id":"PFK",
"name":"Phosphofructokinase",
"metabolites":{
"adp_c":1.0,
"atp_c":-1.0,
"f6p_c":-1.0,
"fdp_c":1.0,
"h_c":1.0
},
"lower_bound":0.0,
"upper_bound":1000.0,
"gene_reaction_rule":"b3916 or b1723",
"subsystem":"Glycolysis/Gluconeogenesis"
}"#;
        let reaction: JsonReaction = serde_json::from_str(data).unwrap();
        assert_eq!(reaction.id, "PFK");
        assert_eq!(reaction.name.unwrap(), "Phosphofructokinase");
        let mut expected_reactions: HashMap<String, f64> = HashMap::new();
        expected_reactions.insert("adp_c".to_string(), 1.0);
        expected_reactions.insert("atp_c".to_string(), -1.0);
        expected_reactions.insert("f6p_c".to_string(), -1.0);
        expected_reactions.insert("fdp_c".to_string(), 1.0);
        expected_reactions.insert("h_c".to_string(), 1.0);
        for (k, v) in reaction.metabolites {
            assert!((v - expected_reactions.get(&k).unwrap()).abs() < 1e-25);
        }
        assert!((reaction.lower_bound - 0.0).abs() < 1e-25);
        assert!((reaction.upper_bound - 1000.0).abs() < 1e-25);
        assert_eq!(reaction.gene_reaction_rule.unwrap(), "b3916 or b1723");
        assert_eq!(reaction.subsystem.unwrap(), "Glycolysis/Gluconeogenesis");
        assert!(reaction.objective_coefficient.is_none());
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use crate::metabolic_model::metabolite::Compound;
    use crate::metabolic_model::reaction::Direction;
    use std::path::PathBuf;

    fn toy_model_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("test_models")
            .join("toy_glycolysis.json")
    }

    #[test]
    fn read_json() {
        let model: Model = Model::read_json(toy_model_path()).unwrap();
        let (_, met) = model.metabolites.first().unwrap();
        let (_, reaction) = model.reactions.first().unwrap();

        // Tests for the metabolite
        assert_eq!(met.id, "glc__D_e");
        assert_eq!(met.name.clone().unwrap(), "D-Glucose");
        assert_eq!(met.compartment.clone().unwrap(), "e");
        assert_eq!(met.charge, 0);
        assert_eq!(met.formula.clone().unwrap(), "C6H12O6");

        // Tests for the reaction
        assert_eq!(reaction.id, "EX_glc__D_e");
        assert_eq!(reaction.direction(), Direction::Both);
        assert!(model.is_exchange("EX_glc__D_e"));

        let pgi = model.reactions.get("PGI").unwrap();
        assert_eq!(pgi.gene_reaction_rule.clone().unwrap(), "b4025");
        assert_eq!(pgi.subsystem.clone().unwrap(), "Glycolysis/Gluconeogenesis");
        let eq = model.equation("PGI").unwrap();
        assert_eq!(eq.left, vec![(Compound::new("g6p_c", Some("c")), 1.0)]);
        assert_eq!(eq.right, vec![(Compound::new("f6p_c", Some("c")), 1.0)]);

        assert_eq!(model.biomass_reaction.clone().unwrap(), "BIOMASS");
        assert_eq!(model.id.clone().unwrap(), "toy_glycolysis");
        assert_eq!(model.version.clone().unwrap(), "1");
        let mut expected_compartments: IndexMap<String, String> = IndexMap::new();
        expected_compartments.insert("c".to_string(), "cytosol".to_string());
        expected_compartments.insert("e".to_string(), "extracellular space".to_string());
        assert_eq!(model.compartments.clone().unwrap(), expected_compartments);
    }

    #[test]
    fn missing_file() {
        let err = Model::read_json("does/not/exist.json").unwrap_err();
        assert!(matches!(err, JsonError::UnableToRead(_)));
    }
}
