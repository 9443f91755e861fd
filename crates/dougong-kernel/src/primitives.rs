//! Primitive builders on top of truck's sweep API.
//!
//! truck has no built-in cylinder or polygon face. Everything is built from
//! vertices, line edges and successive sweeps.

use crate::geometry::{Point3d, Transform, Vec3, POINT_TOLERANCE};
use crate::types::KernelError;
use std::collections::HashMap;
use std::f64::consts::PI;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Shell, Solid, Vertex, Wire};
use truck_modeling::{Matrix4, Point3, Rad, Vector3};

pub(crate) fn to_point3(p: &Point3d) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

pub(crate) fn to_vector3(v: &Vec3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

/// Homogeneous matrix of an affine transform. cgmath matrices are column-major.
pub(crate) fn to_matrix4(t: &Transform) -> Matrix4 {
    let l = &t.linear;
    let o = &t.translation;
    Matrix4::new(
        l[0][0], l[1][0], l[2][0], 0.0, //
        l[0][1], l[1][1], l[2][1], 0.0, //
        l[0][2], l[1][2], l[2][2], 0.0, //
        o.x, o.y, o.z, 1.0,
    )
}

/// Planar face bounded by a closed polygon (no repeated closing point).
pub fn make_polygon_face(polygon: &[Point3d]) -> Result<Face, KernelError> {
    if polygon.len() < 3 {
        return Err(KernelError::degenerate("polygon needs at least 3 vertices"));
    }
    let vertices: Vec<Vertex> = polygon
        .iter()
        .map(|p| builder::vertex(to_point3(p)))
        .collect();
    let n = vertices.len();
    let wire: Wire = (0..n)
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
        .collect();
    builder::try_attach_plane(&[wire]).map_err(|e| KernelError::DegenerateGeometry {
        reason: format!("failed to create planar face: {e}"),
    })
}

/// Capped cylinder standing on `base`, extending `height` along +Z.
pub fn make_cylinder(base: &Point3d, height: f64, radius: f64) -> Result<Solid, KernelError> {
    let center = to_point3(base);
    let v = builder::vertex(Point3::new(base.x + radius, base.y, base.z));
    let circle = builder::rsweep(&v, center, Vector3::unit_z(), Rad(2.0 * PI));
    let face = builder::try_attach_plane(&[circle]).map_err(|e| KernelError::DegenerateGeometry {
        reason: format!("failed to create circular face: {e}"),
    })?;
    Ok(builder::tsweep(&face, Vector3::new(0.0, 0.0, height)))
}

type PointKey = (i64, i64, i64);

fn point_key(p: &Point3d) -> PointKey {
    let q = |v: f64| (v / POINT_TOLERANCE).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}

/// Sew outward-oriented polygons into a closed solid.
///
/// Coincident vertices and edges are shared between faces so the shell is
/// topologically closed. Each edge is traversed once in each direction.
pub fn sew_polygons(faces: &[Vec<Point3d>]) -> Result<Solid, KernelError> {
    let mut vertices: HashMap<PointKey, Vertex> = HashMap::new();
    let mut edges: HashMap<(PointKey, PointKey), Edge> = HashMap::new();
    let mut shell_faces = Vec::with_capacity(faces.len());

    for polygon in faces {
        let n = polygon.len();
        let mut wire_edges = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (&polygon[i], &polygon[(i + 1) % n]);
            let (ka, kb) = (point_key(a), point_key(b));
            let (lo, hi) = if ka < kb { (ka, kb) } else { (kb, ka) };
            let edge = match edges.get(&(lo, hi)) {
                Some(edge) => edge.clone(),
                None => {
                    let (p_lo, p_hi) = if ka < kb { (a, b) } else { (b, a) };
                    let v_lo = vertices
                        .entry(lo)
                        .or_insert_with(|| builder::vertex(to_point3(p_lo)))
                        .clone();
                    let v_hi = vertices
                        .entry(hi)
                        .or_insert_with(|| builder::vertex(to_point3(p_hi)))
                        .clone();
                    let edge = builder::line(&v_lo, &v_hi);
                    edges.insert((lo, hi), edge.clone());
                    edge
                }
            };
            wire_edges.push(if ka < kb { edge } else { edge.inverse() });
        }
        let wire: Wire = wire_edges.into_iter().collect();
        let face = builder::try_attach_plane(&[wire]).map_err(|e| {
            KernelError::DegenerateGeometry {
                reason: format!("failed to create shell face: {e}"),
            }
        })?;
        shell_faces.push(face);
    }

    let shell: Shell = shell_faces.into_iter().collect();
    Solid::try_new(vec![shell]).map_err(|e| KernelError::DegenerateGeometry {
        reason: format!("joined surfaces do not form a closed shell: {e}"),
    })
}
