//! Core rust implementation of fluxmap, a crate for drawing the flow of a chemical element
//! through a metabolic model as a Graphviz graph.

pub mod configuration;
pub mod io;
pub mod metabolic_model;
pub mod visualize;
