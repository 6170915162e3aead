//! Module for reading models and the tabular inputs of a visualization
pub mod formula_parse;
pub mod json;
pub mod tsv;
