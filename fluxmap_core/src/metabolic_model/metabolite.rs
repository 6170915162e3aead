//! This module provides the metabolite struct representing a metabolite, and the compound
//! identity used in graphs
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents a metabolite
#[derive(Builder, Debug, Clone)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// The compound identity of this metabolite
    pub fn compound(&self) -> Compound {
        Compound::new(&self.id, self.compartment.as_deref())
    }

    /// Properties of the metabolite which can be shown on a node label, in a fixed order
    pub fn properties(&self) -> IndexMap<String, String> {
        let mut props = IndexMap::new();
        props.insert("id".to_string(), self.id.clone());
        let optional = [
            ("name", &self.name),
            ("compartment", &self.compartment),
            ("formula", &self.formula),
            ("notes", &self.notes),
            ("annotation", &self.annotation),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                props.insert(key.to_string(), v.clone());
            }
        }
        props.insert("charge".to_string(), self.charge.to_string());
        props
    }
}

/// A compound in a specific compartment
///
/// Two metabolites with the same id in different compartments are distinct compounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Compound {
    /// Id of the metabolite
    pub name: String,
    /// Compartment of the metabolite, if known
    pub compartment: Option<String>,
}

impl Compound {
    pub fn new(name: &str, compartment: Option<&str>) -> Compound {
        Compound {
            name: name.to_string(),
            compartment: compartment.map(|c| c.to_string()),
        }
    }
}

impl Display for Compound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.compartment {
            Some(ref compartment) => write!(f, "{}[{}]", self.name, compartment),
            None => write!(f, "{}", self.name),
        }
    }
}
