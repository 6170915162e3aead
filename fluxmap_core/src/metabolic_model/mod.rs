//! Module providing the Model struct for representing a metabolic model.

pub mod formula;
pub mod metabolite;
pub mod model;
pub mod reaction;
