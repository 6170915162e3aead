//! Edge widths and arrow directions
use serde::{Deserialize, Serialize};

use crate::visualize::flux_edges::{EdgeEnd, EdgeValues};
use crate::visualize::graph::{EdgeAttributes, EdgeDirection};

/// How edge magnitudes are turned into pen widths
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// Width 10 at the 90th percentile magnitude, larger magnitudes are clipped
    #[default]
    PercentileClip,
    /// Width from 1 at the smallest magnitude to 20 at the largest
    MinMax,
}

/// Pen width scale fitted to one set of edge magnitudes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PenWidthScale {
    /// Every edge is drawn with width 1
    Constant,
    PercentileClip { ceiling: f64 },
    MinMax { min: f64, max: f64 },
}

impl PenWidthScale {
    /// Fit the scale to the magnitudes in `values`
    ///
    /// The percentile ceiling is the sorted magnitude at index `floor(0.9 n) + 1`, clamped
    /// to the last index. A scale without spread draws every edge with width 1.
    pub fn new(method: ScalingMethod, values: &EdgeValues) -> PenWidthScale {
        let mut sorted: Vec<f64> = values.values().collect();
        if sorted.is_empty() {
            return PenWidthScale::Constant;
        }
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        match method {
            ScalingMethod::PercentileClip => {
                let index = ((sorted.len() as f64 * 0.9).floor() as usize + 1).min(sorted.len() - 1);
                let ceiling = sorted[index];
                if ceiling - min == 0. {
                    PenWidthScale::Constant
                } else {
                    PenWidthScale::PercentileClip { ceiling }
                }
            }
            ScalingMethod::MinMax => {
                if max - min == 0. {
                    PenWidthScale::Constant
                } else {
                    PenWidthScale::MinMax { min, max }
                }
            }
        }
    }

    pub fn width(&self, value: f64) -> f64 {
        match *self {
            PenWidthScale::Constant => 1.,
            PenWidthScale::PercentileClip { ceiling } => 10. * value.min(ceiling) / ceiling,
            PenWidthScale::MinMax { min, max } => 19. * (value - min) / (max - min) + 1.,
        }
    }
}

/// Attributes of edges drawn from a set of edge magnitudes
pub struct EdgeStyler<'a> {
    values: &'a EdgeValues,
    scale: PenWidthScale,
}

impl<'a> EdgeStyler<'a> {
    pub fn new(values: &'a EdgeValues, scale: PenWidthScale) -> EdgeStyler<'a> {
        EdgeStyler { values, scale }
    }

    /// Attributes of an edge drawn from `from` to `to` for a single reaction
    ///
    /// With magnitudes the arrow points along whichever orientation carries flux, an edge
    /// without flux is dotted and keeps the declared direction. Without any magnitudes only
    /// the declared direction is used.
    pub fn reaction_edge(&self, from: &EdgeEnd, to: &EdgeEnd, declared: EdgeDirection) -> EdgeAttributes {
        if self.values.is_empty() {
            return EdgeAttributes::new(declared);
        }
        if let Some(value) = self.values.get(from, to) {
            EdgeAttributes {
                dir: EdgeDirection::Forward,
                penwidth: Some(self.scale.width(value)),
                dotted: false,
            }
        } else if let Some(value) = self.values.get(to, from) {
            EdgeAttributes {
                dir: EdgeDirection::Back,
                penwidth: Some(self.scale.width(value)),
                dotted: false,
            }
        } else {
            EdgeAttributes {
                dir: declared,
                penwidth: None,
                dotted: true,
            }
        }
    }

    /// Attributes of an edge of a combined reaction node, the arrow always follows the
    /// direction of the group
    pub fn group_edge(&self, from: &EdgeEnd, to: &EdgeEnd, direction: EdgeDirection) -> EdgeAttributes {
        if self.values.is_empty() {
            return EdgeAttributes::new(direction);
        }
        let value = self.values.get(from, to).or_else(|| self.values.get(to, from));
        EdgeAttributes {
            dir: direction,
            penwidth: value.map(|v| self.scale.width(v)),
            dotted: value.is_none(),
        }
    }
}
