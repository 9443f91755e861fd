use std::collections::BTreeMap;

use dougong_kernel::{CurveHandle, ModelingKernel, SolidHandle};
use tracing::{info, instrument, warn};

use crate::config::BuildConfig;
use crate::junction::{self, RunningBase};
use crate::layers::{self, Drafts, LayerBuilder};
use crate::params::LayerParams;
use crate::types::{BuildError, JunctionState, LayerId};

/// Everything a build produced.
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// One solid per built layer, in build order.
    pub layers: BTreeMap<LayerId, SolidHandle>,
    /// Junction progress of every layer that was built.
    pub junctions: BTreeMap<LayerId, JunctionState>,
    /// Profile curves, kept only when drafts are not removed.
    pub drafts: Vec<CurveHandle>,
    /// Layers that failed, with the reason. Later layers still ran.
    pub errors: Vec<(LayerId, BuildError)>,
}

impl BuildOutput {
    pub fn get(&self, layer: LayerId) -> Option<&SolidHandle> {
        self.layers.get(&layer)
    }

    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.keys().copied().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, layer: LayerId) -> Option<&BuildError> {
        self.errors.iter().find(|(l, _)| *l == layer).map(|(_, e)| e)
    }
}

/// State carried between layers of one build.
struct BuildState<'c> {
    config: &'c BuildConfig,
    base: Option<RunningBase>,
    drafts: Drafts,
    output: BuildOutput,
}

impl BuildState<'_> {
    fn params(&self, layer: LayerId) -> LayerParams {
        LayerParams::resolve(&self.config.params, layer)
    }

    fn record_error(&mut self, layer: LayerId, error: BuildError) {
        warn!(%layer, %error, "layer failed");
        self.output.errors.push((layer, error));
    }

    /// Build one layer from its profiles and run its junction step.
    fn build_layer(
        &mut self,
        kernel: &mut dyn ModelingKernel,
        layer: LayerId,
        builder: LayerBuilder,
    ) -> Result<SolidHandle, BuildError> {
        let p = self.params(layer);
        let solid = builder(kernel, &p, &mut self.drafts)?;
        self.finish_layer(kernel, &p, solid)
    }

    fn finish_layer(
        &mut self,
        kernel: &mut dyn ModelingKernel,
        p: &LayerParams,
        solid: SolidHandle,
    ) -> Result<SolidHandle, BuildError> {
        let (solid, state) = if self.config.add_junction {
            junction::join_layer(kernel, p, &mut self.base, solid)?
        } else {
            (solid, JunctionState::Unjunctioned)
        };
        self.output.junctions.insert(p.layer, state);
        info!(layer = %p.layer, ?state, "layer built");
        Ok(solid)
    }
}

/// Build every layer the configuration asks for.
///
/// A failed layer is recorded and the remaining layers are still attempted.
/// The running base is built when `base` is requested, or when junctions
/// are on and layer1, layer2 or layer4 is requested; it is then part of the
/// output. Layer1 is built whenever layer4 is requested, but only emitted
/// when requested itself.
#[instrument(skip_all, fields(junctions = config.add_junction, remove_draft = config.remove_draft))]
pub fn build(config: &BuildConfig, kernel: &mut dyn ModelingKernel) -> BuildOutput {
    let wants = |layer| config.target.should_build(layer);
    let junction_layers = [LayerId::Layer1, LayerId::Layer2, LayerId::Layer4]
        .into_iter()
        .any(wants);
    let needs_base = wants(LayerId::Base) || (config.add_junction && junction_layers);
    let needs_layer1 = wants(LayerId::Layer1) || wants(LayerId::Layer4);

    let mut state = BuildState {
        config,
        base: None,
        drafts: Drafts::new(!config.remove_draft),
        output: BuildOutput::default(),
    };

    if needs_base {
        let p = state.params(LayerId::Base);
        match layers::build_base(kernel, &p) {
            Ok(solid) => {
                state.base = Some(RunningBase::new(solid));
                info!(layer = %LayerId::Base, "running base ready");
            }
            Err(e) => state.record_error(LayerId::Base, e),
        }
    }

    let mut layer1 = None;
    if needs_layer1 {
        match state.build_layer(kernel, LayerId::Layer1, layers::build_layer1) {
            Ok(solid) => layer1 = Some(solid),
            Err(e) => state.record_error(LayerId::Layer1, e),
        }
    }

    let middle: [(LayerId, LayerBuilder); 2] = [
        (LayerId::Layer2, layers::build_layer2),
        (LayerId::Layer3, layers::build_layer3),
    ];
    for (layer, builder) in middle {
        if wants(layer) {
            match state.build_layer(kernel, layer, builder) {
                Ok(solid) => {
                    state.output.layers.insert(layer, solid);
                }
                Err(e) => state.record_error(layer, e),
            }
        }
    }

    if wants(LayerId::Layer4) {
        let result = match &layer1 {
            Some(source) => {
                let p = state.params(LayerId::Layer4);
                layers::build_layer4(kernel, &p, source)
                    .and_then(|solid| state.finish_layer(kernel, &p, solid))
            }
            None => Err(BuildError::MissingDependency {
                layer: LayerId::Layer4,
                dependency: LayerId::Layer1,
            }),
        };
        match result {
            Ok(solid) => {
                state.output.layers.insert(LayerId::Layer4, solid);
            }
            Err(e) => state.record_error(LayerId::Layer4, e),
        }
    }

    if let Some(solid) = layer1 {
        if wants(LayerId::Layer1) {
            state.output.layers.insert(LayerId::Layer1, solid);
        } else {
            kernel.delete_solid(solid);
        }
    }

    if wants(LayerId::Layer5) {
        match state.build_layer(kernel, LayerId::Layer5, layers::build_layer5) {
            Ok(solid) => {
                state.output.layers.insert(LayerId::Layer5, solid);
            }
            Err(e) => state.record_error(LayerId::Layer5, e),
        }
    }

    if let Some(base) = state.base.take() {
        state.output.layers.insert(LayerId::Base, base.into_solid());
    }

    let mut output = state.output;
    output.drafts = state.drafts.into_curves();
    info!(
        layers = output.layers.len(),
        errors = output.errors.len(),
        drafts = output.drafts.len(),
        "build finished"
    );
    output
}
