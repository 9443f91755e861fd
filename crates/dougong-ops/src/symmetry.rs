//! Four-fold and mirror replication of points and solids.

use dougong_kernel::{ModelingKernel, Point3d, SolidHandle, Vec3};
use tracing::instrument;

use crate::primitives::check_finite;
use crate::types::OpError;

/// `[p, rot(p, 90), rot(p, 180), rot(p, -90)]` about the axis through `center`.
pub fn quad_rotate_point(p: Point3d, center: Point3d, axis: Vec3) -> [Point3d; 4] {
    [
        p,
        p.rotated_about(center, 90.0, axis),
        p.rotated_about(center, 180.0, axis),
        p.rotated_about(center, -90.0, axis),
    ]
}

/// Delete every solid in `solids`. Used to unwind partially built replica sets.
fn discard(kernel: &mut dyn ModelingKernel, solids: Vec<SolidHandle>) {
    for solid in solids {
        kernel.delete_solid(solid);
    }
}

/// `[obj, r90, r180, r270]`: the object and three rotated copies about the
/// axis through `center`. Each copy is rotated directly from `obj`, so
/// rotating `result[i]` by 90° lands on `result[(i + 1) % 4]`.
///
/// On failure every solid, including `obj`, is deleted.
#[instrument(level = "debug", skip(kernel, obj))]
pub fn quad_rotate_object(
    kernel: &mut dyn ModelingKernel,
    obj: SolidHandle,
    center: Point3d,
    axis: Vec3,
) -> Result<Vec<SolidHandle>, OpError> {
    let mut out = Vec::with_capacity(4);
    for angle in [90.0, 180.0, 270.0] {
        match kernel.rotate_copy(&obj, center, angle, axis) {
            Ok(copy) => out.push(copy),
            Err(e) => {
                out.push(obj);
                discard(kernel, out);
                return Err(e.into());
            }
        }
    }
    out.insert(0, obj);
    Ok(out)
}

/// `[obj, mx, my, mxy]`: mirror across the plane x=0, then mirror the
/// original and that copy across y=0.
#[instrument(level = "debug", skip(kernel, obj))]
pub fn quad_mirror_object(
    kernel: &mut dyn ModelingKernel,
    obj: SolidHandle,
) -> Result<Vec<SolidHandle>, OpError> {
    let mut out = vec![obj];
    let steps: [(usize, Vec3); 3] = [(0, Vec3::X), (0, Vec3::Y), (1, Vec3::Y)];
    for (source, normal) in steps {
        match kernel.mirror_copy(&out[source], Point3d::ORIGIN, normal) {
            Ok(copy) => out.push(copy),
            Err(e) => {
                discard(kernel, out);
                return Err(e.into());
            }
        }
    }
    Ok(out)
}

/// `[obj, mirror(obj)]` across the plane through `plane_point` with `plane_normal`.
pub fn mirror_pair(
    kernel: &mut dyn ModelingKernel,
    obj: SolidHandle,
    plane_point: Point3d,
    plane_normal: Vec3,
) -> Result<Vec<SolidHandle>, OpError> {
    match kernel.mirror_copy(&obj, plane_point, plane_normal) {
        Ok(copy) => Ok(vec![obj, copy]),
        Err(e) => {
            kernel.delete_solid(obj);
            Err(e.into())
        }
    }
}

/// `objs` followed by a rotated copy of each, in the same order.
pub fn rotate_pair(
    kernel: &mut dyn ModelingKernel,
    mut objs: Vec<SolidHandle>,
    center: Point3d,
    angle_deg: f64,
    axis: Vec3,
) -> Result<Vec<SolidHandle>, OpError> {
    if let Err(e) = check_finite("rotation angle", &[angle_deg]) {
        discard(kernel, objs);
        return Err(e);
    }
    let originals = objs.len();
    for i in 0..originals {
        match kernel.rotate_copy(&objs[i], center, angle_deg, axis) {
            Ok(copy) => objs.push(copy),
            Err(e) => {
                discard(kernel, objs);
                return Err(e.into());
            }
        }
    }
    Ok(objs)
}
