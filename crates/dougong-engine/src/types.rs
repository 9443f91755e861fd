use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One buildable part of the bracket set. Ordering follows build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerId {
    Base,
    Layer1,
    Layer2,
    Layer3,
    Layer4,
    Layer5,
}

impl LayerId {
    /// Every layer, in build order.
    pub const BUILD_ORDER: [LayerId; 6] = [
        LayerId::Base,
        LayerId::Layer1,
        LayerId::Layer2,
        LayerId::Layer3,
        LayerId::Layer4,
        LayerId::Layer5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerId::Base => "base",
            LayerId::Layer1 => "layer1",
            LayerId::Layer2 => "layer2",
            LayerId::Layer3 => "layer3",
            LayerId::Layer4 => "layer4",
            LayerId::Layer5 => "layer5",
        }
    }

    /// Height of the layer's working plane above the ground (mm).
    pub fn plane_height(self) -> f64 {
        match self {
            LayerId::Base => 0.0,
            LayerId::Layer1 => 62.5,
            LayerId::Layer2 => 75.0,
            LayerId::Layer3 => 87.5,
            LayerId::Layer4 => 102.5,
            LayerId::Layer5 => 115.0,
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerId::BUILD_ORDER
            .into_iter()
            .find(|layer| layer.name() == s)
            .ok_or_else(|| format!("unknown layer name: {s}"))
    }
}

/// How far a layer has progressed through junction processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JunctionState {
    /// No pegs added, nothing carved.
    Unjunctioned,
    /// The layer's pegs were fused into the running base.
    BaseExtended,
    /// The layer was also carved against the extended base.
    Carved,
}

/// Errors from building a layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("kernel error: {0}")]
    Kernel(#[from] dougong_kernel::KernelError),

    #[error("operation error: {0}")]
    Op(#[from] dougong_ops::OpError),

    #[error("{layer} needs the running base, which is unavailable")]
    MissingBase { layer: LayerId },

    #[error("{layer} depends on {dependency}, which failed to build")]
    MissingDependency { layer: LayerId, dependency: LayerId },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl From<serde_json::Error> for BuildError {
    fn from(e: serde_json::Error) -> Self {
        BuildError::Config {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_names_round_trip() {
        for layer in LayerId::BUILD_ORDER {
            assert_eq!(layer.name().parse::<LayerId>().unwrap(), layer);
        }
        assert!("layer9".parse::<LayerId>().is_err());
    }

    #[test]
    fn build_order_is_sorted() {
        let mut sorted = LayerId::BUILD_ORDER;
        sorted.sort();
        assert_eq!(sorted, LayerId::BUILD_ORDER);
    }
}
