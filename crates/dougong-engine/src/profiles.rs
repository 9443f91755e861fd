//! Profile point lists and fixed dimensions of the bracket set.
//!
//! Everything here is pure geometry: no kernel calls.

use dougong_kernel::{Point3d, Vec3};
use dougong_ops::quad_rotate_point;

/// Horizontal run of a beam-end ramp.
pub const RAMP_RUN: f64 = 5.0;
/// Height where a beam-end ramp meets the beam's end face.
pub const RAMP_APEX: f64 = 8.0;
/// Vertical offset from layer1 to its layer4 copy.
pub const LAYER4_LIFT: f64 = 40.0;
/// Shift of layer2's cross beam before it is turned.
pub const CROSS_BEAM_OFFSET: f64 = 11.0;
/// Offset of layer3's half beams from the core surface.
pub const LAYER3_BEAM_OFFSET: f64 = 11.0;
/// Layer3 corner column: origin on the diagonal and height.
pub const CORNER_COLUMN_ORIGIN: f64 = 14.25;
pub const CORNER_COLUMN_HEIGHT: f64 = 22.5;
/// How far the layer3 and layer5 columns start below their plane.
pub const COLUMN_DROP: f64 = 7.5;
/// Raking column top heights at the far and near edge.
pub const RAKING_COLUMN_FAR_TOP: f64 = 22.5;
pub const RAKING_COLUMN_NEAR_TOP: f64 = 20.0;
/// Layer3 ring.
pub const ANNULUS_OUTER_RADIUS: f64 = 39.0;
pub const ANNULUS_INNER_RADIUS: f64 = 35.5;
/// Offset of layer5's beams from the core surface.
pub const LAYER5_BEAM_OFFSET: f64 = 3.0;
/// Height of the core cylinder rising from the base.
pub const CORE_HEIGHT: f64 = 107.5;
/// Flare of the base sides, measured from the horizontal.
pub const BASE_FLARE_DEG: f64 = 60.0;
/// Junction peg dimensions.
pub const PEG_RADIUS: f64 = 0.8;
pub const PEG_HEIGHT: f64 = 3.0;
/// Layer2 slot: start along y, depth along -x and length along -y.
pub const SLOT_Y: f64 = 4.0;
pub const SLOT_DEPTH: f64 = 1.0;
pub const SLOT_LENGTH: f64 = 8.0;

/// Full beam with a ramp at both ends, running `length` along `run`.
///
/// Closed: the first point is repeated last. 6 distinct vertices.
pub fn full_beam(origin: Point3d, run: Vec3, length: f64, beam_height: f64) -> Vec<Point3d> {
    let up = Vec3::Z;
    vec![
        origin,
        origin + up * RAMP_APEX,
        origin + run * RAMP_RUN + up * beam_height,
        origin + run * (length - RAMP_RUN) + up * beam_height,
        origin + run * length + up * RAMP_APEX,
        origin + run * length,
        origin,
    ]
}

/// Half beam: square at `origin`, ramped at the far end.
pub fn half_beam(origin: Point3d, run: Vec3, half_length: f64, beam_height: f64) -> Vec<Point3d> {
    let up = Vec3::Z;
    vec![
        origin,
        origin + up * beam_height,
        origin + run * (half_length - RAMP_RUN) + up * beam_height,
        origin + run * half_length + up * RAMP_APEX,
        origin + run * half_length,
        origin,
    ]
}

/// Raking column side: `diameter` wide along x, sloped top.
pub fn raking_column(origin: Point3d, diameter: f64) -> Vec<Point3d> {
    vec![
        origin,
        origin + Vec3::X * diameter,
        origin + Vec3::new(diameter, 0.0, RAKING_COLUMN_FAR_TOP),
        origin + Vec3::Z * RAKING_COLUMN_NEAR_TOP,
        origin,
    ]
}

/// Faces of the flared base plinth: bottom, top, then four sides.
///
/// The bottom square has corner `(h, h, 0)`; the top is inset by
/// `beam_height * tan(flare)` and sits at `beam_height`.
pub fn base_faces(half_length: f64, beam_height: f64) -> Vec<Vec<Point3d>> {
    let inset = beam_height * BASE_FLARE_DEG.to_radians().tan();
    let bottom_corner = Point3d::new(half_length, half_length, 0.0);
    let top_corner = bottom_corner + Vec3::new(-inset, -inset, beam_height);
    let bottom = quad_rotate_point(bottom_corner, Point3d::ORIGIN, Vec3::Z);
    let top = quad_rotate_point(top_corner, Point3d::ORIGIN, Vec3::Z);

    let mut faces = vec![bottom.to_vec(), top.to_vec()];
    for i in 0..4 {
        let j = (i + 1) % 4;
        faces.push(vec![bottom[i], bottom[j], top[j], top[i]]);
    }
    faces
}

/// Number of distinct vertices in a closed profile.
pub fn distinct_vertices(profile: &[Point3d]) -> usize {
    dougong_kernel::geometry::open_loop(profile).len()
}
