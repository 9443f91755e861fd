//! Layer builders. Each returns the layer's combined solid, before any
//! junction processing.

use dougong_kernel::{CurveHandle, ModelingKernel, Point3d, SolidHandle, Vec3};
use dougong_ops::{
    add_box, extrude_along, mirror_pair, quad_mirror_object, quad_rotate_object, rotate_pair,
};
use tracing::{debug, instrument};

use crate::params::LayerParams;
use crate::profiles::{self, *};
use crate::types::BuildError;

/// Profile curves left over from extrusion.
///
/// With `keep` off every curve is deleted as soon as it has been swept.
#[derive(Debug)]
pub struct Drafts {
    keep: bool,
    curves: Vec<CurveHandle>,
}

impl Drafts {
    pub fn new(keep: bool) -> Self {
        Self {
            keep,
            curves: Vec::new(),
        }
    }

    pub fn retire(&mut self, kernel: &mut dyn ModelingKernel, curve: CurveHandle) {
        if self.keep {
            self.curves.push(curve);
        } else {
            kernel.delete_curve(curve);
        }
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn into_curves(self) -> Vec<CurveHandle> {
        self.curves
    }
}

/// Signature shared by the layers built straight from profiles.
pub type LayerBuilder =
    fn(&mut dyn ModelingKernel, &LayerParams, &mut Drafts) -> Result<SolidHandle, BuildError>;

pub(crate) fn discard(kernel: &mut dyn ModelingKernel, solids: Vec<SolidHandle>) {
    for solid in solids {
        kernel.delete_solid(solid);
    }
}

/// Draw `points` as a closed polyline and sweep it along `vector` from `origin`.
fn extrude_profile(
    kernel: &mut dyn ModelingKernel,
    drafts: &mut Drafts,
    points: &[Point3d],
    origin: Point3d,
    vector: Vec3,
) -> Result<SolidHandle, BuildError> {
    let curve = kernel.add_polyline(points)?;
    let solid = extrude_along(kernel, &curve, origin, vector);
    drafts.retire(kernel, curve);
    Ok(solid?)
}

/// Flared plinth joined from six faces, fused with the core cylinder.
#[instrument(skip(kernel, p), fields(layer = %p.layer))]
pub fn build_base(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
) -> Result<SolidHandle, BuildError> {
    let mut surfaces = Vec::with_capacity(6);
    for face in profiles::base_faces(p.beam_half_length, p.beam_height) {
        match kernel.add_surface_from_points(&face) {
            Ok(surface) => surfaces.push(surface),
            Err(e) => {
                for surface in surfaces {
                    kernel.delete_surface(surface);
                }
                return Err(e.into());
            }
        }
    }
    let plinth = kernel.join_surfaces(surfaces)?;
    let core = match kernel.add_cylinder(Point3d::ORIGIN, CORE_HEIGHT, p.core_radius) {
        Ok(core) => core,
        Err(e) => {
            kernel.delete_solid(plinth);
            return Err(e.into());
        }
    };
    debug!("plinth and core ready");
    Ok(kernel.boolean_union(vec![plinth, core])?)
}

/// Four full beams tangent to the core, one per quadrant.
#[instrument(skip(kernel, p, drafts), fields(layer = %p.layer))]
pub fn build_layer1(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
    drafts: &mut Drafts,
) -> Result<SolidHandle, BuildError> {
    let origin = Point3d::new(p.beam_half_length, p.core_radius, p.plane_height);
    let profile = full_beam(origin, -Vec3::X, p.beam_length, p.beam_height);
    let beam = extrude_profile(kernel, drafts, &profile, origin, Vec3::new(0.0, p.beam_width, 0.0))?;
    let beams = quad_rotate_object(kernel, beam, Point3d::ORIGIN, Vec3::Z)?;
    Ok(kernel.boolean_union(beams)?)
}

/// Long beam plus a shifted cross beam, each doubled by a half turn.
#[instrument(skip(kernel, p, drafts), fields(layer = %p.layer))]
pub fn build_layer2(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
    drafts: &mut Drafts,
) -> Result<SolidHandle, BuildError> {
    let origin = Point3d::new(p.core_radius, p.beam_half_length, p.plane_height);
    let profile = full_beam(origin, -Vec3::Y, p.beam_length, p.beam_height);
    let beam = extrude_profile(kernel, drafts, &profile, origin, Vec3::new(p.beam_width, 0.0, 0.0))?;

    let shifted = match kernel.translate_copy(&beam, Vec3::new(CROSS_BEAM_OFFSET, 0.0, 0.0)) {
        Ok(shifted) => shifted,
        Err(e) => {
            kernel.delete_solid(beam);
            return Err(e.into());
        }
    };
    let cross = match kernel.rotate(shifted, Point3d::ORIGIN, 90.0, Vec3::Z) {
        Ok(cross) => cross,
        Err(e) => {
            kernel.delete_solid(beam);
            return Err(e.into());
        }
    };
    let beams = rotate_pair(kernel, vec![beam, cross], Point3d::ORIGIN, 180.0, Vec3::Z)?;
    Ok(kernel.boolean_union(beams)?)
}

/// Mirrored half beams with corner columns around a ring.
#[instrument(skip(kernel, p, drafts), fields(layer = %p.layer))]
pub fn build_layer3(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
    drafts: &mut Drafts,
) -> Result<SolidHandle, BuildError> {
    let offset = p.core_radius + LAYER3_BEAM_OFFSET;
    let origin = Point3d::new(offset, offset, p.plane_height);
    let profile = half_beam(origin, Vec3::X, p.beam_half_length, p.beam_height);
    let beam = extrude_profile(kernel, drafts, &profile, origin, Vec3::new(0.0, p.beam_width, 0.0))?;

    let mut quarter = mirror_pair(kernel, beam, Point3d::ORIGIN, Vec3::new(1.0, -1.0, 0.0))?;
    let d = p.column_diameter;
    let column = add_box(
        kernel,
        Point3d::new(
            CORNER_COLUMN_ORIGIN,
            CORNER_COLUMN_ORIGIN,
            p.plane_height - COLUMN_DROP,
        ),
        Vec3::new(d, 0.0, 0.0),
        Vec3::new(0.0, d, 0.0),
        Vec3::new(0.0, 0.0, CORNER_COLUMN_HEIGHT),
    );
    match column {
        Ok(column) => quarter.push(column),
        Err(e) => {
            discard(kernel, quarter);
            return Err(e.into());
        }
    }
    let quarter = kernel.boolean_union(quarter)?;
    let mut parts = quad_rotate_object(kernel, quarter, Point3d::ORIGIN, Vec3::Z)?;

    match ring(kernel, p) {
        Ok(ring) => parts.push(ring),
        Err(e) => {
            discard(kernel, parts);
            return Err(e);
        }
    }
    Ok(kernel.boolean_union(parts)?)
}

/// Flat annulus at the plane height, one beam height thick.
fn ring(kernel: &mut dyn ModelingKernel, p: &LayerParams) -> Result<SolidHandle, BuildError> {
    let center = Point3d::new(0.0, 0.0, p.plane_height);
    let outer = kernel.add_cylinder(center, p.beam_height, ANNULUS_OUTER_RADIUS)?;
    let inner = match kernel.add_cylinder(center, p.beam_height, ANNULUS_INNER_RADIUS) {
        Ok(inner) => inner,
        Err(e) => {
            kernel.delete_solid(outer);
            return Err(e.into());
        }
    };
    Ok(kernel.boolean_difference_consuming(outer, inner)?)
}

/// Copy of the finished layer1 lifted to the layer4 plane.
#[instrument(skip(kernel, p, layer1), fields(layer = %p.layer))]
pub fn build_layer4(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
    layer1: &SolidHandle,
) -> Result<SolidHandle, BuildError> {
    Ok(kernel.translate_copy(layer1, Vec3::new(0.0, 0.0, LAYER4_LIFT))?)
}

/// Outer full beams plus four raking columns.
#[instrument(skip(kernel, p, drafts), fields(layer = %p.layer))]
pub fn build_layer5(
    kernel: &mut dyn ModelingKernel,
    p: &LayerParams,
    drafts: &mut Drafts,
) -> Result<SolidHandle, BuildError> {
    let origin = Point3d::new(
        p.beam_half_length,
        p.core_radius + LAYER5_BEAM_OFFSET,
        p.plane_height,
    );
    let profile = full_beam(origin, -Vec3::X, p.beam_length, p.beam_height);
    let beam = extrude_profile(kernel, drafts, &profile, origin, Vec3::new(0.0, p.beam_width, 0.0))?;
    let mut parts = quad_rotate_object(kernel, beam, Point3d::ORIGIN, Vec3::Z)?;

    let corner = Point3d::new(p.core_radius, p.core_radius, p.plane_height - COLUMN_DROP);
    let d = p.column_diameter;
    let column = extrude_profile(
        kernel,
        drafts,
        &raking_column(corner, d),
        corner,
        Vec3::new(0.0, d, 0.0),
    )
    .and_then(|column| quad_mirror_object(kernel, column).map_err(BuildError::from));
    match column {
        Ok(columns) => parts.extend(columns),
        Err(e) => {
            discard(kernel, parts);
            return Err(e);
        }
    }
    Ok(kernel.boolean_union(parts)?)
}
