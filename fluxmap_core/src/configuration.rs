//! Default colors and tunables used while building graphs
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::visualize::style::ScalingMethod;

/// Default lower flux bound for newly built reactions
pub const DEFAULT_LOWER_BOUND: f64 = -1000.;
/// Default upper flux bound for newly built reactions
pub const DEFAULT_UPPER_BOUND: f64 = 1000.;

/// Settings shared by one visualization run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Node fill colors
    pub palette: Palette,
    /// How edge magnitudes are turned into pen widths
    pub scaling: ScalingMethod,
    /// Number of visualized reactions above which rendering is reported as slow
    pub large_graph_threshold: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            palette: Palette::default(),
            scaling: ScalingMethod::default(),
            large_graph_threshold: 500,
        }
    }
}

impl Configuration {
    /// Read a configuration from a json file, any missing field takes its default
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigurationError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(ConfigurationError::UnableToRead(format!("{:?}", err))),
        };
        Ok(serde_json::from_str(&data)?)
    }
}

/// Fill colors for the different kinds of nodes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Ordinary reaction nodes
    pub reaction: String,
    /// Ordinary compound nodes
    pub compound: String,
    /// Exchange reaction nodes
    pub exchange: String,
    /// Biomass reaction nodes
    pub biomass: String,
    /// Combined nodes where only part of the member reactions were recolored
    pub mixed: String,
    /// Compounds that only appear through the biomass reaction
    pub biomass_only_compound: String,
    /// Compounds that only appear through exchange reactions
    pub exchange_only_compound: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            reaction: "#ccebc5".to_string(),
            compound: "#fbb4ae".to_string(),
            exchange: "#b3cde3".to_string(),
            biomass: "#f4fc55".to_string(),
            mixed: "#fc9a44".to_string(),
            biomass_only_compound: "#82e593".to_string(),
            exchange_only_compound: "#5a95f4".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Unable to read configuration file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse configuration file")]
    UnableToParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override() {
        let config: Configuration =
            serde_json::from_str(r##"{"palette": {"reaction": "#000000"}, "scaling": "min_max"}"##)
                .unwrap();
        assert_eq!(config.palette.reaction, "#000000");
        assert_eq!(config.palette.compound, "#fbb4ae");
        assert_eq!(config.scaling, ScalingMethod::MinMax);
        assert_eq!(config.large_graph_threshold, 500);
    }
}
