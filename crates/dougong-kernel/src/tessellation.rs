//! Mesh-based measurements of truck solids.
//!
//! Volume and bounds are taken from a triangulation of the B-rep, so curved
//! faces are approximated to within the tessellation tolerance.

use crate::geometry::{BoundingBox, Point3d};
use crate::types::KernelError;
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;

type TruckSolid = truck_modeling::Solid;

/// Chord tolerance used for measurement meshes (mm).
pub const MEASURE_TOLERANCE: f64 = 0.01;

/// Outward-oriented triangles of a solid's tessellation.
pub fn triangles(solid: &TruckSolid, tolerance: f64) -> Result<Vec<[Point3d; 3]>, KernelError> {
    let meshed = solid.triangulation(tolerance);
    let mut out = Vec::new();

    for shell in meshed.boundaries().iter() {
        for face in shell.face_iter() {
            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(mut mesh) = maybe_mesh else {
                return Err(KernelError::TessellationFailed {
                    reason: "face could not be triangulated".to_string(),
                });
            };
            // Inverted faces carry a mesh with the surface's own winding.
            if !face.orientation() {
                mesh.invert();
            }
            let positions = mesh.positions();
            for tri in mesh.tri_faces() {
                let corner = |i: usize| {
                    let p = positions[tri[i].pos];
                    Point3d::new(p[0], p[1], p[2])
                };
                out.push([corner(0), corner(1), corner(2)]);
            }
        }
    }

    if out.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced an empty mesh".to_string(),
        });
    }
    Ok(out)
}

/// Signed volume by the divergence theorem. Positive for outward triangles.
pub fn signed_mesh_volume(triangles: &[[Point3d; 3]]) -> f64 {
    triangles
        .iter()
        .map(|[a, b, c]| a.to_vec3().dot(&b.to_vec3().cross(&c.to_vec3())) / 6.0)
        .sum()
}

/// Enclosed volume, regardless of orientation.
pub fn mesh_volume(triangles: &[[Point3d; 3]]) -> f64 {
    signed_mesh_volume(triangles).abs()
}

pub fn mesh_bounds(triangles: &[[Point3d; 3]]) -> Result<BoundingBox, KernelError> {
    let points: Vec<Point3d> = triangles.iter().flatten().copied().collect();
    BoundingBox::from_points(&points).ok_or(KernelError::TessellationFailed {
        reason: "solid produced an empty mesh".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tetrahedron_volume() {
        let p = |x: f64, y: f64, z: f64| Point3d::new(x, y, z);
        let (a, b, c, d) = (p(0., 0., 0.), p(1., 0., 0.), p(0., 1., 0.), p(0., 0., 1.));
        let tris = [[a, c, b], [a, b, d], [a, d, c], [b, c, d]];
        assert_relative_eq!(mesh_volume(&tris), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(signed_mesh_volume(&tris), 1.0 / 6.0, epsilon = 1e-12);

        let inverted: Vec<_> = tris.iter().map(|[a, b, c]| [*a, *c, *b]).collect();
        assert_relative_eq!(signed_mesh_volume(&inverted), -1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(mesh_volume(&inverted), 1.0 / 6.0, epsilon = 1e-12);

        let bounds = mesh_bounds(&tris).unwrap();
        assert_eq!(bounds.min, a);
        assert_eq!(bounds.max, p(1., 1., 1.));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(mesh_bounds(&[]).is_err());
    }
}
