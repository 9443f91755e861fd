//! Peg-and-socket junctions between layers and the running base.
//!
//! Pegs fused into the base stand proud of the core; carving a layer
//! against the grown base cuts matching sockets into it.

use dougong_kernel::{ModelingKernel, Point3d, SolidHandle, Vec3};
use dougong_ops::{add_box, mirror_pair, quad_mirror_object, quad_rotate_object};
use tracing::{debug, instrument};

use crate::params::LayerParams;
use crate::profiles::{PEG_HEIGHT, PEG_RADIUS, SLOT_DEPTH, SLOT_LENGTH, SLOT_Y};
use crate::types::{BuildError, JunctionState, LayerId};

/// The accumulated core solid. Every extension consumes the previous value.
#[derive(Debug)]
pub struct RunningBase {
    solid: SolidHandle,
}

impl RunningBase {
    pub fn new(solid: SolidHandle) -> Self {
        Self { solid }
    }

    pub fn solid(&self) -> &SolidHandle {
        &self.solid
    }

    pub fn into_solid(self) -> SolidHandle {
        self.solid
    }

    /// Fuse `pegs` into the base. On failure the old base is gone too.
    #[instrument(skip_all, fields(pegs = pegs.len()))]
    pub fn extend(
        self,
        kernel: &mut dyn ModelingKernel,
        pegs: Vec<SolidHandle>,
    ) -> Result<RunningBase, BuildError> {
        let mut operands = Vec::with_capacity(pegs.len() + 1);
        operands.push(self.solid);
        operands.extend(pegs);
        let solid = kernel.boolean_union(operands)?;
        Ok(RunningBase { solid })
    }
}

/// Single peg standing on `at`.
pub fn peg(kernel: &mut dyn ModelingKernel, at: Point3d) -> Result<SolidHandle, BuildError> {
    Ok(kernel.add_cylinder(at, PEG_HEIGHT, PEG_RADIUS)?)
}

/// Four pegs for a layer, on the core surface at the plane height.
///
/// Layers 1 and 4 place them by quarter turns; layer 2 by mirroring a peg
/// set slightly off the x axis.
pub fn layer_pegs(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
) -> Result<Vec<SolidHandle>, BuildError> {
    match p.layer {
        LayerId::Layer1 | LayerId::Layer4 => {
            let first = peg(kernel, Point3d::new(p.core_radius, 0.0, p.plane_height))?;
            Ok(quad_rotate_object(kernel, first, Point3d::ORIGIN, Vec3::Z)?)
        }
        LayerId::Layer2 => {
            let first = peg(kernel, Point3d::new(p.core_radius, 1.0, p.plane_height))?;
            Ok(quad_mirror_object(kernel, first)?)
        }
        _ => Ok(Vec::new()),
    }
}

/// Layer2 slot boxes cut into the core side of the long beams.
pub fn layer2_slots(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
) -> Result<Vec<SolidHandle>, BuildError> {
    let slot = add_box(
        kernel,
        Point3d::new(p.core_radius, SLOT_Y, p.plane_height),
        Vec3::new(-SLOT_DEPTH, 0.0, 0.0),
        Vec3::new(0.0, -SLOT_LENGTH, 0.0),
        Vec3::new(0.0, 0.0, p.beam_height),
    )?;
    Ok(mirror_pair(kernel, slot, Point3d::ORIGIN, Vec3::X)?)
}

/// `layer - base`. The candidate solid is deleted; the base is untouched.
pub fn carve(
    kernel: &mut dyn ModelingKernel,
    layer: SolidHandle,
    base: &RunningBase,
) -> Result<SolidHandle, BuildError> {
    let carved = kernel.boolean_difference(&layer, base.solid());
    kernel.delete_solid(layer);
    Ok(carved?)
}

/// Run junction processing for one freshly built layer.
///
/// Layers 1 and 2 extend the base and are carved; layer 4 only extends the
/// base; every other layer passes through untouched. On error the layer
/// solid is deleted.
#[instrument(skip(kernel, p, base, layer), fields(layer = %p.layer))]
pub fn join_layer(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
    base: &mut Option<RunningBase>,
    layer: SolidHandle,
) -> Result<(SolidHandle, JunctionState), BuildError> {
    if !matches!(p.layer, LayerId::Layer1 | LayerId::Layer2 | LayerId::Layer4) {
        return Ok((layer, JunctionState::Unjunctioned));
    }
    let Some(current) = base.take() else {
        kernel.delete_solid(layer);
        return Err(BuildError::MissingBase { layer: p.layer });
    };

    let pegs = match layer_pegs(kernel, p) {
        Ok(pegs) => pegs,
        Err(e) => {
            *base = Some(current);
            kernel.delete_solid(layer);
            return Err(e);
        }
    };
    let extended = match current.extend(kernel, pegs) {
        Ok(extended) => extended,
        Err(e) => {
            kernel.delete_solid(layer);
            return Err(e);
        }
    };
    debug!("running base extended");

    if p.layer == LayerId::Layer4 {
        *base = Some(extended);
        return Ok((layer, JunctionState::BaseExtended));
    }

    let candidate = if p.layer == LayerId::Layer2 {
        match layer2_slots(kernel, p) {
            Ok(mut parts) => {
                parts.insert(0, layer);
                kernel.boolean_union(parts).map_err(BuildError::from)
            }
            Err(e) => {
                kernel.delete_solid(layer);
                Err(e)
            }
        }
    } else {
        Ok(layer)
    };
    let carved = candidate.and_then(|candidate| carve(kernel, candidate, &extended));
    *base = Some(extended);
    Ok((carved?, JunctionState::Carved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DesignParams;
    use dougong_kernel::MockKernel;

    fn params(layer: LayerId) -> LayerParams {
        LayerParams::resolve(&DesignParams::default(), layer)
    }

    #[test]
    fn layer2_pegs_are_mirrored() {
        let mut kernel = MockKernel::new();
        let pegs = layer_pegs(&mut kernel, &params(LayerId::Layer2)).unwrap();
        assert_eq!(pegs.len(), 4);
        let z = 76.0;
        for (peg, (x, y)) in pegs.iter().zip([(6.25, 1.0), (-6.25, 1.0), (6.25, -1.0), (-6.25, -1.0)]) {
            assert!(kernel.contains(peg, Point3d::new(x, y, z)).unwrap());
        }
    }

    #[test]
    fn non_junction_layers_pass_through() {
        let mut kernel = MockKernel::new();
        let solid = kernel.add_cylinder(Point3d::ORIGIN, 1.0, 1.0).unwrap();
        let key = solid.key();
        let mut base = None;
        let (out, state) = join_layer(&mut kernel, &params(LayerId::Layer3), &mut base, solid).unwrap();
        assert_eq!(out.key(), key);
        assert_eq!(state, JunctionState::Unjunctioned);
    }

    #[test]
    fn missing_base_deletes_layer() {
        let mut kernel = MockKernel::new();
        let solid = kernel.add_cylinder(Point3d::ORIGIN, 1.0, 1.0).unwrap();
        let mut base = None;
        let err = join_layer(&mut kernel, &params(LayerId::Layer1), &mut base, solid).unwrap_err();
        assert!(matches!(err, BuildError::MissingBase { layer: LayerId::Layer1 }));
        assert_eq!(kernel.object_count(), 0);
    }

    #[test]
    fn carve_leaves_base_alive() {
        let mut kernel = MockKernel::new();
        let core = kernel.add_cylinder(Point3d::ORIGIN, 10.0, 2.0).unwrap();
        let base = RunningBase::new(core);
        let layer = kernel.add_cylinder(Point3d::new(1.0, 0.0, 2.0), 1.0, 3.0).unwrap();
        let layer_key = layer.key();

        let carved = carve(&mut kernel, layer, &base).unwrap();
        assert!(!kernel.is_solid_alive(layer_key));
        assert!(kernel.is_solid_alive(base.solid().key()));
        assert!(!kernel.contains(&carved, Point3d::new(0.0, 0.0, 2.5)).unwrap());
        assert!(kernel.contains(&carved, Point3d::new(3.5, 0.0, 2.5)).unwrap());
    }
}
