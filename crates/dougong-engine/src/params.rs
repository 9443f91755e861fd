//! Design parameters and their per-layer resolution.

use serde::{Deserialize, Serialize};

use crate::types::{BuildError, LayerId};

/// Change to the beam dimensions that takes effect at `at` and stays in
/// force for every later layer until overridden again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamOverride {
    pub at: LayerId,
    /// New beam length. Also resets the half length to `beam_length / 2`.
    #[serde(default)]
    pub beam_length: Option<f64>,
    /// New half length, applied after `beam_length`.
    #[serde(default)]
    pub beam_half_length: Option<f64>,
}

/// Global dimensions of the bracket set (mm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignParams {
    pub core_radius: f64,
    pub beam_height: f64,
    pub beam_width: f64,
    pub beam_length: f64,
    pub column_diameter: f64,
    /// Append-only, applied in build order.
    pub overrides: Vec<ParamOverride>,
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            core_radius: 6.25,
            beam_height: 5.0,
            beam_width: 3.0,
            beam_length: 56.25,
            column_diameter: 9.0,
            overrides: vec![
                ParamOverride {
                    at: LayerId::Layer2,
                    beam_length: Some(80.0),
                    beam_half_length: None,
                },
                ParamOverride {
                    at: LayerId::Layer3,
                    beam_length: None,
                    beam_half_length: Some(35.75),
                },
                ParamOverride {
                    at: LayerId::Layer5,
                    beam_length: Some(70.0),
                    beam_half_length: None,
                },
            ],
        }
    }
}

impl DesignParams {
    /// Reject dimensions that cannot produce a solid.
    pub fn validate(&self) -> Result<(), BuildError> {
        let base = [
            ("core_radius", self.core_radius),
            ("beam_height", self.beam_height),
            ("beam_width", self.beam_width),
            ("beam_length", self.beam_length),
            ("column_diameter", self.column_diameter),
        ];
        let overridden = self.overrides.iter().flat_map(|o| {
            [
                ("beam_length", o.beam_length),
                ("beam_half_length", o.beam_half_length),
            ]
            .into_iter()
            .filter_map(|(name, v)| v.map(|v| (name, v)))
        });
        for (name, value) in base.into_iter().chain(overridden) {
            if !(value.is_finite() && value > 0.0) {
                return Err(BuildError::Config {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Parameter values as seen by one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    pub layer: LayerId,
    pub core_radius: f64,
    pub beam_height: f64,
    pub beam_width: f64,
    pub beam_length: f64,
    pub beam_half_length: f64,
    pub column_diameter: f64,
    pub plane_height: f64,
}

impl LayerParams {
    /// Fold every override at or before `layer` in build order.
    pub fn resolve(design: &DesignParams, layer: LayerId) -> Self {
        let mut params = LayerParams {
            layer,
            core_radius: design.core_radius,
            beam_height: design.beam_height,
            beam_width: design.beam_width,
            beam_length: design.beam_length,
            beam_half_length: design.beam_length / 2.0,
            column_diameter: design.column_diameter,
            plane_height: layer.plane_height(),
        };
        let mut applicable: Vec<&ParamOverride> =
            design.overrides.iter().filter(|o| o.at <= layer).collect();
        // Stable: list order breaks ties within one layer.
        applicable.sort_by_key(|o| o.at);
        for o in applicable {
            if let Some(length) = o.beam_length {
                params.beam_length = length;
                params.beam_half_length = length / 2.0;
            }
            if let Some(half) = o.beam_half_length {
                params.beam_half_length = half;
            }
        }
        params
    }
}
