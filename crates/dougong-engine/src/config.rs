//! Build configuration: which layers to build and how.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::params::DesignParams;
use crate::types::{BuildError, LayerId};

/// Which layers a build should produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTarget", into = "RawTarget")]
pub enum BuildTarget {
    #[default]
    All,
    Layers(BTreeSet<LayerId>),
}

impl BuildTarget {
    /// Target from layer names. Unknown names are ignored with a warning.
    ///
    /// `"all"` is not a layer name here; it only selects every layer as the
    /// whole target value.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut layers = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            match name.parse::<LayerId>() {
                Ok(layer) => {
                    layers.insert(layer);
                }
                Err(_) => warn!(name, "ignoring unknown layer in build target"),
            }
        }
        BuildTarget::Layers(layers)
    }

    pub fn should_build(&self, layer: LayerId) -> bool {
        match self {
            BuildTarget::All => true,
            BuildTarget::Layers(layers) => layers.contains(&layer),
        }
    }
}

/// Wire form of a target: `"all"`, a single name, or a list of names.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    One(String),
    Many(Vec<String>),
}

impl From<RawTarget> for BuildTarget {
    fn from(raw: RawTarget) -> Self {
        match raw {
            RawTarget::One(name) if name == "all" => BuildTarget::All,
            RawTarget::One(name) => BuildTarget::from_names([name]),
            RawTarget::Many(names) => BuildTarget::from_names(names),
        }
    }
}

impl From<BuildTarget> for RawTarget {
    fn from(target: BuildTarget) -> Self {
        match target {
            BuildTarget::All => RawTarget::One("all".to_string()),
            BuildTarget::Layers(layers) => {
                RawTarget::Many(layers.into_iter().map(|l| l.name().to_string()).collect())
            }
        }
    }
}

/// Options for one build of the bracket set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub target: BuildTarget,
    /// Fuse pegs into the running base and carve layers against it.
    pub add_junction: bool,
    /// Delete profile curves once their solids exist.
    pub remove_draft: bool,
    pub params: DesignParams,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target: BuildTarget::All,
            add_junction: true,
            remove_draft: true,
            params: DesignParams::default(),
        }
    }
}

impl BuildConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, BuildError> {
        let config: BuildConfig = serde_json::from_str(json)?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Config for the given targets with every other option at its default.
    pub fn for_layers(layers: &[LayerId]) -> Self {
        Self {
            target: BuildTarget::Layers(layers.iter().copied().collect()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = BuildConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert!(config.add_junction);
        assert!(config.remove_draft);
    }

    #[test]
    fn target_list_ignores_unknown_names() {
        let config =
            BuildConfig::from_json_str(r#"{"target": ["layer1", "layer9"], "add_junction": false}"#)
                .unwrap();
        assert!(config.target.should_build(LayerId::Layer1));
        assert!(!config.target.should_build(LayerId::Layer2));
        assert!(!config.target.should_build(LayerId::Base));
        assert!(!config.add_junction);
    }

    #[test]
    fn target_all_string() {
        let config = BuildConfig::from_json_str(r#"{"target": "all"}"#).unwrap();
        assert_eq!(config.target, BuildTarget::All);
    }

    #[test]
    fn all_inside_a_list_is_an_unknown_name() {
        let config = BuildConfig::from_json_str(r#"{"target": ["all", "layer3"]}"#).unwrap();
        assert_eq!(
            config.target,
            BuildTarget::Layers([LayerId::Layer3].into_iter().collect())
        );
        assert!(!config.target.should_build(LayerId::Layer1));

        let only_all = BuildTarget::from_names(["all"]);
        assert_eq!(only_all, BuildTarget::Layers(BTreeSet::new()));
    }

    #[test]
    fn config_survives_json_round_trip() {
        let config = BuildConfig::for_layers(&[LayerId::Layer2, LayerId::Layer4]);
        let json = config.to_json_string().unwrap();
        assert_eq!(BuildConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = BuildConfig::from_json_str(r#"{"add_junction": "yes"}"#).unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    fn nonpositive_override_rejected() {
        let json = r#"{"params": {"overrides": [{"at": "layer2", "beam_length": 0.0}]}}"#;
        assert!(matches!(
            BuildConfig::from_json_str(json),
            Err(BuildError::Config { .. })
        ));
    }
}
