//! Point and vector arithmetic, affine transforms, and planar polygon helpers.
//!
//! All coordinates are millimetres. Angles taken by public APIs are degrees,
//! matching the host modeling conventions the layer builders are written in.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A point in 3D Euclidean space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Rotate this point about an axis through `center`.
    pub fn rotated_about(&self, center: Point3d, angle_deg: f64, axis: Vec3) -> Self {
        Transform::rotation(center, axis, angle_deg).apply_point(self)
    }
}

impl Add<Vec3> for Point3d {
    type Output = Point3d;
    fn add(self, v: Vec3) -> Point3d {
        Point3d::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub<Vec3> for Point3d {
    type Output = Point3d;
    fn sub(self, v: Vec3) -> Point3d {
        Point3d::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Sub for Point3d {
    type Output = Vec3;
    fn sub(self, other: Point3d) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl From<(f64, f64, f64)> for Point3d {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

/// A vector in 3D Euclidean space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalized(&self) -> Option<Self> {
        let len = self.length();
        if len < 1e-15 {
            None
        } else {
            Some(*self * (1.0 / len))
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        *self * factor
    }

    /// Rotate this vector by `angle_deg` about `axis` (right-hand rule).
    pub fn rotated(&self, angle_deg: f64, axis: Vec3) -> Self {
        Transform::rotation(Point3d::ORIGIN, axis, angle_deg).apply_vector(self)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, o: Vec3) {
        *self = *self + o;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl From<(f64, f64, f64)> for Vec3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

/// Affine transform: a 3x3 linear part (row-major) plus a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub linear: [[f64; 3]; 3],
    pub translation: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            linear: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: Vec3::ZERO,
        }
    }

    pub fn translation(offset: Vec3) -> Self {
        Self {
            translation: offset,
            ..Self::identity()
        }
    }

    /// Rotation by `angle_deg` about the axis through `center` (Rodrigues' formula).
    /// A zero axis yields the identity.
    pub fn rotation(center: Point3d, axis: Vec3, angle_deg: f64) -> Self {
        let Some(k) = axis.normalized() else {
            return Self::identity();
        };
        let (s, c) = angle_deg.to_radians().sin_cos();
        let t = 1.0 - c;
        #[rustfmt::skip]
        let linear = [
            [t * k.x * k.x + c,       t * k.x * k.y - s * k.z, t * k.x * k.z + s * k.y],
            [t * k.x * k.y + s * k.z, t * k.y * k.y + c,       t * k.y * k.z - s * k.x],
            [t * k.x * k.z - s * k.y, t * k.y * k.z + s * k.x, t * k.z * k.z + c      ],
        ];
        Self::about(center, linear)
    }

    /// Reflection across the plane through `plane_point` with normal `normal`.
    /// A zero normal yields the identity.
    pub fn reflection(plane_point: Point3d, normal: Vec3) -> Self {
        let Some(n) = normal.normalized() else {
            return Self::identity();
        };
        #[rustfmt::skip]
        let linear = [
            [1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y,       -2.0 * n.x * n.z      ],
            [-2.0 * n.y * n.x,      1.0 - 2.0 * n.y * n.y,  -2.0 * n.y * n.z      ],
            [-2.0 * n.z * n.x,      -2.0 * n.z * n.y,       1.0 - 2.0 * n.z * n.z ],
        ];
        Self::about(plane_point, linear)
    }

    /// Linear map applied around a fixed point: p' = L(p - c) + c.
    fn about(center: Point3d, linear: [[f64; 3]; 3]) -> Self {
        let c = center.to_vec3();
        let lc = mul_mat_vec(&linear, &c);
        Self {
            linear,
            translation: c - lc,
        }
    }

    pub fn apply_point(&self, p: &Point3d) -> Point3d {
        let v = mul_mat_vec(&self.linear, &p.to_vec3()) + self.translation;
        Point3d::new(v.x, v.y, v.z)
    }

    pub fn apply_vector(&self, v: &Vec3) -> Vec3 {
        mul_mat_vec(&self.linear, v)
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.linear;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Whether this transform flips orientation (mirror images).
    pub fn is_reflection(&self) -> bool {
        self.determinant() < 0.0
    }

    /// Inverse transform, or `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-15 {
            return None;
        }
        let m = &self.linear;
        let inv_det = 1.0 / det;
        #[rustfmt::skip]
        let linear = [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
            ],
        ];
        let translation = -mul_mat_vec(&linear, &self.translation);
        Some(Self {
            linear,
            translation,
        })
    }

    /// Compose: the result applies `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        let mut linear = [[0.0; 3]; 3];
        for (r, row) in linear.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| next.linear[r][k] * self.linear[k][c]).sum();
            }
        }
        Transform {
            linear,
            translation: next.apply_vector(&self.translation) + next.translation,
        }
    }
}

fn mul_mat_vec(m: &[[f64; 3]; 3], v: &Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all points. `None` for an empty slice.
    pub fn from_points(points: &[Point3d]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = Self::new(*first, *first);
        for p in &points[1..] {
            bb.include(p);
        }
        Some(bb)
    }

    pub fn include(&mut self, p: &Point3d) {
        self.min = Point3d::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3d::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut bb = *self;
        bb.include(&other.min);
        bb.include(&other.max);
        bb
    }

    pub fn contains(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Overlap of two boxes, or `None` when they are disjoint.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = Point3d::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = Point3d::new(
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        );
        (min.x <= max.x && min.y <= max.y && min.z <= max.z).then(|| Self::new(min, max))
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3d; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3d::new(a.x, a.y, a.z),
            Point3d::new(b.x, a.y, a.z),
            Point3d::new(b.x, b.y, a.z),
            Point3d::new(a.x, b.y, a.z),
            Point3d::new(a.x, a.y, b.z),
            Point3d::new(b.x, a.y, b.z),
            Point3d::new(b.x, b.y, b.z),
            Point3d::new(a.x, b.y, b.z),
        ]
    }

    /// Bounding box of this box's image under `transform`.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let corners = self.corners().map(|c| transform.apply_point(&c));
        let mut bb = Self::new(corners[0], corners[0]);
        for c in &corners[1..] {
            bb.include(c);
        }
        bb
    }
}

// ── Planar polygon helpers ─────────────────────────────────────────────────

/// Coincidence tolerance for polygon vertices and planarity checks (mm).
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Drop the repeated closing point of a closed polyline, if present.
pub fn open_loop(points: &[Point3d]) -> &[Point3d] {
    match (points.first(), points.last()) {
        (Some(first), Some(last))
            if points.len() > 1 && first.distance_to(last) < POINT_TOLERANCE =>
        {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Whether the polyline ends where it starts.
pub fn is_closed(points: &[Point3d]) -> bool {
    points.len() > 3 && open_loop(points).len() == points.len() - 1
}

/// Area-weighted polygon normal (Newell's method). Length is twice the area.
pub fn newell_normal(polygon: &[Point3d]) -> Vec3 {
    let n = polygon.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        normal += Vec3::new(
            (a.y - b.y) * (a.z + b.z),
            (a.z - b.z) * (a.x + b.x),
            (a.x - b.x) * (a.y + b.y),
        );
    }
    normal
}

/// Whether every vertex lies on the plane through the first vertex.
pub fn is_planar(polygon: &[Point3d], normal: Vec3) -> bool {
    let Some(n) = normal.normalized() else {
        return false;
    };
    let Some(origin) = polygon.first() else {
        return false;
    };
    polygon
        .iter()
        .all(|p| (*p - *origin).dot(&n).abs() < POINT_TOLERANCE * 10.0)
}

pub fn centroid(points: &[Point3d]) -> Point3d {
    let n = points.len().max(1) as f64;
    let sum = points
        .iter()
        .fold(Vec3::ZERO, |acc, p| acc + p.to_vec3());
    let c = sum * (1.0 / n);
    Point3d::new(c.x, c.y, c.z)
}

/// Reverse any face whose normal points toward the shell centroid, so that a
/// star-shaped closed shell ends up consistently outward-oriented.
pub fn orient_outward(faces: &mut [Vec<Point3d>]) {
    let all: Vec<Point3d> = faces.iter().flatten().copied().collect();
    let center = centroid(&all);
    for face in faces.iter_mut() {
        let outward = centroid(face) - center;
        if newell_normal(face).dot(&outward) < 0.0 {
            face.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_quarter_turn_about_z() {
        let p = Point3d::new(1.0, 0.0, 5.0).rotated_about(Point3d::ORIGIN, 90.0, Vec3::Z);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rotation_about_offset_center() {
        let center = Point3d::new(1.0, 1.0, 0.0);
        let p = Point3d::new(2.0, 1.0, 0.0).rotated_about(center, 180.0, Vec3::Z);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn reflection_is_its_own_inverse() {
        let t = Transform::reflection(Point3d::ORIGIN, Vec3::new(1.0, -1.0, 0.0));
        assert!(t.is_reflection());
        let p = Point3d::new(3.0, 7.0, 2.0);
        let q = t.apply_point(&p);
        assert_relative_eq!(q.x, 7.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 3.0, epsilon = 1e-12);
        let back = t.apply_point(&q);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn inverse_undoes_rotation_and_translation() {
        let t = Transform::rotation(Point3d::new(2.0, 3.0, 0.0), Vec3::Z, 37.0)
            .then(&Transform::translation(Vec3::new(0.0, 0.0, 40.0)));
        let inv = t.inverse().unwrap();
        let p = Point3d::new(-4.0, 9.5, 1.25);
        let back = inv.apply_point(&t.apply_point(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-9);
    }

    #[test]
    fn newell_normal_of_unit_square() {
        let square = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(&square);
        assert_relative_eq!(n.z, 2.0, epsilon = 1e-12);
        assert!(is_planar(&square, n));
    }

    #[test]
    fn open_loop_strips_closing_point() {
        let pts = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(open_loop(&pts).len(), 3);
        assert!(is_closed(&pts));
        assert!(!is_closed(&pts[..3]));
    }
}
