//! Sweep-based solid builders shared by every layer.
//!
//! Scratch surfaces and rails created here are deleted before returning,
//! whether the sweep succeeded or not.

use dougong_kernel::{CurveHandle, KernelError, ModelingKernel, Point3d, SolidHandle, Vec3};
use tracing::{debug, instrument};

use crate::types::OpError;

pub(crate) fn check_finite(what: &str, values: &[f64]) -> Result<(), OpError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(OpError::InvalidParameter {
            reason: format!("{what} has a non-finite coordinate"),
        })
    }
}

/// Extrude the planar region bounded by `curve` along the straight rail
/// `origin -> origin + vector`.
///
/// The curve itself is left alive; the caller decides whether it is a draft
/// to delete or keep.
#[instrument(level = "debug", skip(kernel, curve))]
pub fn extrude_along(
    kernel: &mut dyn ModelingKernel,
    curve: &CurveHandle,
    origin: Point3d,
    vector: Vec3,
) -> Result<SolidHandle, OpError> {
    check_finite("origin", &origin.to_array())?;
    check_finite("extrusion vector", &[vector.x, vector.y, vector.z])?;

    let surface = kernel.add_planar_surface(curve)?;
    let rail = match kernel.add_line(origin, origin + vector) {
        Ok(rail) => rail,
        Err(e) => {
            kernel.delete_surface(surface);
            return Err(e.into());
        }
    };
    let solid = kernel.extrude_surface_along_rail(&surface, &rail);
    kernel.delete_surface(surface);
    kernel.delete_curve(rail);
    Ok(solid?)
}

/// Box spanned by three edge vectors from `origin`.
///
/// The base quad is `origin, origin+x, origin+x+y, origin+y`, swept along `z`.
#[instrument(level = "debug", skip(kernel))]
pub fn add_box(
    kernel: &mut dyn ModelingKernel,
    origin: Point3d,
    x: Vec3,
    y: Vec3,
    z: Vec3,
) -> Result<SolidHandle, OpError> {
    check_finite("box origin", &origin.to_array())?;
    for v in [x, y, z] {
        check_finite("box edge", &[v.x, v.y, v.z])?;
    }
    let triple = x.cross(&y).dot(&z);
    if triple.abs() < 1e-12 {
        return Err(KernelError::DegenerateGeometry {
            reason: "box edge vectors are linearly dependent".to_string(),
        }
        .into());
    }

    let surface = kernel.add_surface_from_points(&[origin, origin + x, origin + x + y, origin + y])?;
    let rail = match kernel.add_line(origin, origin + z) {
        Ok(rail) => rail,
        Err(e) => {
            kernel.delete_surface(surface);
            return Err(e.into());
        }
    };
    let solid = kernel.extrude_surface_along_rail(&surface, &rail);
    kernel.delete_surface(surface);
    kernel.delete_curve(rail);
    debug!("box built");
    Ok(solid?)
}
