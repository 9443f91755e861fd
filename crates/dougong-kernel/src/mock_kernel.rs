//! MockKernel — deterministic test double implementing ModelingKernel.
//!
//! Solids are kept as CSG trees over exact primitives: swept planar polygons,
//! closed polyhedra and Z-aligned cylinders. Point membership is exact.
//! Volume is measured by counting the points of a global sampling lattice, so
//! two solids measured with the same step are always comparable: a solid
//! that contains another never reports a smaller volume.

use crate::geometry::*;
use crate::traits::ModelingKernel;
use crate::types::*;
use slotmap::SlotMap;
use std::collections::HashMap;
use tracing::debug;

/// Default lattice spacing for volume sampling (mm).
pub const DEFAULT_SAMPLE_STEP: f64 = 0.5;

/// One recorded kernel call, for test assertions on how a solid was built.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Polyline { vertices: usize },
    Line,
    PlanarSurface,
    SurfaceFromPoints { corners: usize },
    Join { faces: usize },
    Extrude,
    Cylinder { radius: f64, height: f64 },
    Union { operands: usize },
    Difference,
    Rotate { angle_deg: f64 },
    Mirror,
    Translate,
}

/// Orthonormal frame of a planar polygon.
#[derive(Debug, Clone)]
struct PlaneFrame {
    origin: Point3d,
    normal: Vec3,
    u: Vec3,
    v: Vec3,
}

impl PlaneFrame {
    fn from_polygon(polygon: &[Point3d]) -> Option<Self> {
        let normal = newell_normal(polygon).normalized()?;
        let helper = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        let u = normal.cross(&helper).normalized()?;
        let v = normal.cross(&u);
        Some(Self {
            origin: *polygon.first()?,
            normal,
            u,
            v,
        })
    }

    fn project(&self, p: &Point3d) -> (f64, f64) {
        let d = *p - self.origin;
        (d.dot(&self.u), d.dot(&self.v))
    }
}

#[derive(Debug, Clone)]
enum Shape {
    /// Planar polygon swept along a straight vector.
    Prism {
        frame: PlaneFrame,
        outline: Vec<(f64, f64)>,
        sweep: Vec3,
        sweep_dot: f64,
    },
    /// Closed triangulated shell.
    Polyhedron { triangles: Vec<[Point3d; 3]> },
    Cylinder {
        base: Point3d,
        height: f64,
        radius: f64,
    },
    Union(Vec<Node>),
    Difference(Box<Node>, Box<Node>),
    /// Inner shape seen through a transform; stores the inverse for point queries.
    Transformed { inner: Box<Node>, inverse: Transform },
}

#[derive(Debug, Clone)]
struct Node {
    shape: Shape,
    bounds: BoundingBox,
}

impl Node {
    fn contains(&self, p: &Point3d) -> bool {
        if !self.bounds.contains(p) {
            return false;
        }
        match &self.shape {
            Shape::Prism {
                frame,
                outline,
                sweep,
                sweep_dot,
            } => {
                let t = (*p - frame.origin).dot(&frame.normal) / sweep_dot;
                if !(0.0..=1.0).contains(&t) {
                    return false;
                }
                let (x, y) = frame.project(&(*p - *sweep * t));
                point_in_polygon(outline, x, y)
            }
            Shape::Polyhedron { triangles } => {
                let winding: f64 = triangles.iter().map(|tri| solid_angle(p, tri)).sum();
                (winding / (4.0 * std::f64::consts::PI)).abs() > 0.5
            }
            Shape::Cylinder {
                base,
                height,
                radius,
            } => {
                let dz = p.z - base.z;
                let (dx, dy) = (p.x - base.x, p.y - base.y);
                (0.0..=*height).contains(&dz) && dx * dx + dy * dy <= radius * radius
            }
            Shape::Union(children) => children.iter().any(|c| c.contains(p)),
            Shape::Difference(a, b) => a.contains(p) && !b.contains(p),
            Shape::Transformed { inner, inverse } => inner.contains(&inverse.apply_point(p)),
        }
    }

    fn union(children: Vec<Node>) -> Node {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child.shape {
                Shape::Union(grandchildren) => flat.extend(grandchildren),
                shape => flat.push(Node {
                    shape,
                    bounds: child.bounds,
                }),
            }
        }
        let bounds = flat
            .iter()
            .map(|c| c.bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BoundingBox::new(Point3d::ORIGIN, Point3d::ORIGIN));
        Node {
            shape: Shape::Union(flat),
            bounds,
        }
    }

    fn transformed(self, transform: &Transform, inverse: Transform) -> Node {
        let bounds = self.bounds.transformed(transform);
        match self.shape {
            // Collapse nested transforms: apply the outer inverse first.
            Shape::Transformed {
                inner,
                inverse: inner_inverse,
            } => Node {
                shape: Shape::Transformed {
                    inner,
                    inverse: inverse.then(&inner_inverse),
                },
                bounds,
            },
            shape => Node {
                shape: Shape::Transformed {
                    inner: Box::new(Node {
                        shape,
                        bounds: self.bounds,
                    }),
                    inverse,
                },
                bounds,
            },
        }
    }
}

/// Even-odd point-in-polygon test in plane coordinates.
fn point_in_polygon(outline: &[(f64, f64)], x: f64, y: f64) -> bool {
    let n = outline.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = outline[i];
        let (xj, yj) = outline[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Signed solid angle subtended by a triangle (Van Oosterom–Strackee).
fn solid_angle(p: &Point3d, tri: &[Point3d; 3]) -> f64 {
    let a = tri[0] - *p;
    let b = tri[1] - *p;
    let c = tri[2] - *p;
    let (la, lb, lc) = (a.length(), b.length(), c.length());
    let numerator = a.dot(&b.cross(&c));
    let denominator = la * lb * lc + a.dot(&b) * lc + a.dot(&c) * lb + b.dot(&c) * la;
    2.0 * numerator.atan2(denominator)
}

fn quantize(p: &Point3d) -> (i64, i64, i64) {
    let q = |v: f64| (v / POINT_TOLERANCE).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}

/// Validate a vertex loop as a non-degenerate planar polygon (closing point stripped).
fn planar_polygon(points: &[Point3d]) -> Result<Vec<Point3d>, KernelError> {
    let polygon = open_loop(points);
    if polygon.len() < 3 {
        return Err(KernelError::degenerate("polygon needs at least 3 vertices"));
    }
    let normal = newell_normal(polygon);
    if normal.length() < 1e-9 {
        return Err(KernelError::degenerate("polygon has zero area"));
    }
    if !is_planar(polygon, normal) {
        return Err(KernelError::degenerate("polygon is not planar"));
    }
    Ok(polygon.to_vec())
}

/// Deterministic test double for the modeling kernel.
pub struct MockKernel {
    curves: SlotMap<CurveKey, Vec<Point3d>>,
    surfaces: SlotMap<SurfaceKey, Vec<Point3d>>,
    solids: SlotMap<SolidKey, Node>,
    sample_step: f64,
    journal: Vec<MockOp>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::with_sample_step(DEFAULT_SAMPLE_STEP)
    }

    /// Kernel whose volume queries sample a lattice with spacing `step` (mm).
    pub fn with_sample_step(step: f64) -> Self {
        Self {
            curves: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            solids: SlotMap::with_key(),
            sample_step: step,
            journal: Vec::new(),
        }
    }

    /// Every kernel call made so far, oldest first.
    pub fn journal(&self) -> &[MockOp] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Points stored for a curve.
    pub fn curve_points(&self, curve: &CurveHandle) -> Result<&[Point3d], KernelError> {
        self.curves
            .get(curve.0)
            .map(Vec::as_slice)
            .ok_or(KernelError::StaleHandle {
                kind: ObjectKind::Curve,
            })
    }

    /// Exact point membership test.
    pub fn contains(&self, solid: &SolidHandle, point: Point3d) -> Result<bool, KernelError> {
        Ok(self.node(solid)?.contains(&point))
    }

    /// Sampled volume of the part of `solid` inside `region`.
    pub fn volume_within(
        &self,
        solid: &SolidHandle,
        region: &BoundingBox,
    ) -> Result<f64, KernelError> {
        let node = self.node(solid)?;
        let Some(window) = node.bounds.intersection(region) else {
            return Ok(0.0);
        };
        let h = self.sample_step;
        let span = |lo: f64, hi: f64| {
            ((lo / h - 0.5).ceil() as i64)..=((hi / h - 0.5).floor() as i64)
        };
        let mut hits = 0usize;
        for i in span(window.min.x, window.max.x) {
            let x = (i as f64 + 0.5) * h;
            for j in span(window.min.y, window.max.y) {
                let y = (j as f64 + 0.5) * h;
                for k in span(window.min.z, window.max.z) {
                    let z = (k as f64 + 0.5) * h;
                    if node.contains(&Point3d::new(x, y, z)) {
                        hits += 1;
                    }
                }
            }
        }
        Ok(hits as f64 * h * h * h)
    }

    fn node(&self, solid: &SolidHandle) -> Result<&Node, KernelError> {
        self.solids.get(solid.0).ok_or(KernelError::StaleHandle {
            kind: ObjectKind::Solid,
        })
    }

    fn store(&mut self, node: Node) -> SolidHandle {
        SolidHandle(self.solids.insert(node))
    }

    fn take(&mut self, solid: SolidHandle) -> Result<Node, KernelError> {
        self.solids.remove(solid.0).ok_or(KernelError::StaleHandle {
            kind: ObjectKind::Solid,
        })
    }

    fn transformed_copy(
        &mut self,
        solid: &SolidHandle,
        transform: Transform,
    ) -> Result<SolidHandle, KernelError> {
        let inverse = transform
            .inverse()
            .ok_or_else(|| KernelError::degenerate("singular transform"))?;
        let node = self.node(solid)?.clone().transformed(&transform, inverse);
        Ok(self.store(node))
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelingKernel for MockKernel {
    fn add_polyline(&mut self, points: &[Point3d]) -> Result<CurveHandle, KernelError> {
        if points.len() < 2 {
            return Err(KernelError::degenerate("polyline needs at least 2 points"));
        }
        self.journal.push(MockOp::Polyline {
            vertices: open_loop(points).len(),
        });
        Ok(CurveHandle(self.curves.insert(points.to_vec())))
    }

    fn add_line(&mut self, start: Point3d, end: Point3d) -> Result<CurveHandle, KernelError> {
        if start.distance_to(&end) < POINT_TOLERANCE {
            return Err(KernelError::degenerate("line has zero length"));
        }
        self.journal.push(MockOp::Line);
        Ok(CurveHandle(self.curves.insert(vec![start, end])))
    }

    fn add_planar_surface(
        &mut self,
        boundary: &CurveHandle,
    ) -> Result<SurfaceHandle, KernelError> {
        let points = self.curve_points(boundary)?;
        if !is_closed(points) {
            return Err(KernelError::degenerate("boundary curve is not closed"));
        }
        let polygon = planar_polygon(points)?;
        self.journal.push(MockOp::PlanarSurface);
        Ok(SurfaceHandle(self.surfaces.insert(polygon)))
    }

    fn add_surface_from_points(
        &mut self,
        corners: &[Point3d],
    ) -> Result<SurfaceHandle, KernelError> {
        if !(3..=4).contains(&corners.len()) {
            return Err(KernelError::degenerate("surface needs 3 or 4 corners"));
        }
        let polygon = planar_polygon(corners)?;
        self.journal.push(MockOp::SurfaceFromPoints {
            corners: corners.len(),
        });
        Ok(SurfaceHandle(self.surfaces.insert(polygon)))
    }

    fn join_surfaces(&mut self, surfaces: Vec<SurfaceHandle>) -> Result<SolidHandle, KernelError> {
        let count = surfaces.len();
        let mut faces = Vec::with_capacity(count);
        for surface in surfaces {
            let polygon = self.surfaces.remove(surface.0).ok_or(KernelError::StaleHandle {
                kind: ObjectKind::Surface,
            })?;
            faces.push(polygon);
        }
        if faces.len() < 4 {
            return Err(KernelError::degenerate("a closed shell needs at least 4 faces"));
        }

        // Closed shell: every edge is shared by exactly two faces.
        let mut edge_uses: HashMap<((i64, i64, i64), (i64, i64, i64)), usize> = HashMap::new();
        for face in &faces {
            for i in 0..face.len() {
                let a = quantize(&face[i]);
                let b = quantize(&face[(i + 1) % face.len()]);
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_uses.entry(key).or_default() += 1;
            }
        }
        if edge_uses.values().any(|&uses| uses != 2) {
            return Err(KernelError::degenerate("joined surfaces do not form a closed shell"));
        }

        orient_outward(&mut faces);
        let mut triangles = Vec::new();
        for face in &faces {
            for i in 1..face.len() - 1 {
                triangles.push([face[0], face[i], face[i + 1]]);
            }
        }
        let all: Vec<Point3d> = faces.iter().flatten().copied().collect();
        let bounds = BoundingBox::from_points(&all)
            .ok_or_else(|| KernelError::degenerate("empty shell"))?;

        self.journal.push(MockOp::Join { faces: count });
        debug!(faces = count, "joined surfaces into closed shell");
        Ok(self.store(Node {
            shape: Shape::Polyhedron { triangles },
            bounds,
        }))
    }

    fn extrude_surface_along_rail(
        &mut self,
        surface: &SurfaceHandle,
        rail: &CurveHandle,
    ) -> Result<SolidHandle, KernelError> {
        let polygon = self
            .surfaces
            .get(surface.0)
            .ok_or(KernelError::StaleHandle {
                kind: ObjectKind::Surface,
            })?
            .clone();
        let rail_points = self.curve_points(rail)?;
        let [start, end] = rail_points else {
            return Err(KernelError::degenerate("rail must be a straight line"));
        };
        let sweep = *end - *start;

        let frame = PlaneFrame::from_polygon(&polygon)
            .ok_or_else(|| KernelError::degenerate("surface has no plane"))?;
        let sweep_dot = sweep.dot(&frame.normal);
        if sweep_dot.abs() < 1e-12 {
            return Err(KernelError::degenerate("rail is parallel to the surface"));
        }

        let mut corners = polygon.clone();
        corners.extend(polygon.iter().map(|p| *p + sweep));
        let bounds = BoundingBox::from_points(&corners)
            .ok_or_else(|| KernelError::degenerate("empty surface"))?;
        let outline = polygon.iter().map(|p| frame.project(p)).collect();

        self.journal.push(MockOp::Extrude);
        Ok(self.store(Node {
            shape: Shape::Prism {
                frame,
                outline,
                sweep,
                sweep_dot,
            },
            bounds,
        }))
    }

    fn add_cylinder(
        &mut self,
        base: Point3d,
        height: f64,
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        if height <= 0.0 || radius <= 0.0 {
            return Err(KernelError::degenerate(format!(
                "cylinder needs positive height and radius, got h={height} r={radius}"
            )));
        }
        let bounds = BoundingBox::new(
            Point3d::new(base.x - radius, base.y - radius, base.z),
            Point3d::new(base.x + radius, base.y + radius, base.z + height),
        );
        self.journal.push(MockOp::Cylinder { radius, height });
        Ok(self.store(Node {
            shape: Shape::Cylinder {
                base,
                height,
                radius,
            },
            bounds,
        }))
    }

    fn boolean_union(&mut self, solids: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        if solids.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "union of no solids".to_string(),
            });
        }
        let operands = solids.len();
        let nodes = solids
            .into_iter()
            .map(|s| self.take(s))
            .collect::<Result<Vec<_>, _>>()?;
        self.journal.push(MockOp::Union { operands });
        debug!(operands, "boolean union");
        Ok(self.store(Node::union(nodes)))
    }

    fn boolean_difference(
        &mut self,
        minuend: &SolidHandle,
        subtrahend: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let a = self.node(minuend)?.clone();
        let b = self.node(subtrahend)?.clone();
        let bounds = a.bounds;
        self.journal.push(MockOp::Difference);
        Ok(self.store(Node {
            shape: Shape::Difference(Box::new(a), Box::new(b)),
            bounds,
        }))
    }

    fn rotate_copy(
        &mut self,
        solid: &SolidHandle,
        center: Point3d,
        angle_deg: f64,
        axis: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        if axis.normalized().is_none() {
            return Err(KernelError::degenerate("rotation axis has zero length"));
        }
        self.journal.push(MockOp::Rotate { angle_deg });
        self.transformed_copy(solid, Transform::rotation(center, axis, angle_deg))
    }

    fn mirror_copy(
        &mut self,
        solid: &SolidHandle,
        plane_point: Point3d,
        plane_normal: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        if plane_normal.normalized().is_none() {
            return Err(KernelError::degenerate("mirror plane normal has zero length"));
        }
        self.journal.push(MockOp::Mirror);
        self.transformed_copy(solid, Transform::reflection(plane_point, plane_normal))
    }

    fn translate_copy(
        &mut self,
        solid: &SolidHandle,
        offset: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        self.journal.push(MockOp::Translate);
        self.transformed_copy(solid, Transform::translation(offset))
    }

    fn delete_solid(&mut self, solid: SolidHandle) {
        self.solids.remove(solid.0);
    }

    fn delete_curve(&mut self, curve: CurveHandle) {
        self.curves.remove(curve.0);
    }

    fn delete_surface(&mut self, surface: SurfaceHandle) {
        self.surfaces.remove(surface.0);
    }

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError> {
        let bounds = self.node(solid)?.bounds;
        self.volume_within(solid, &bounds)
    }

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError> {
        Ok(self.node(solid)?.bounds)
    }

    fn object_count(&self) -> usize {
        self.curves.len() + self.surfaces.len() + self.solids.len()
    }

    fn is_solid_alive(&self, key: SolidKey) -> bool {
        self.solids.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square(z: f64) -> Vec<Point3d> {
        vec![
            Point3d::new(0.0, 0.0, z),
            Point3d::new(1.0, 0.0, z),
            Point3d::new(1.0, 1.0, z),
            Point3d::new(0.0, 1.0, z),
        ]
    }

    fn cube(kernel: &mut MockKernel, size: f64) -> SolidHandle {
        let surface = kernel
            .add_surface_from_points(&[
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(size, 0.0, 0.0),
                Point3d::new(size, size, 0.0),
                Point3d::new(0.0, size, 0.0),
            ])
            .unwrap();
        let rail = kernel
            .add_line(Point3d::ORIGIN, Point3d::new(0.0, 0.0, size))
            .unwrap();
        let solid = kernel.extrude_surface_along_rail(&surface, &rail).unwrap();
        kernel.delete_surface(surface);
        kernel.delete_curve(rail);
        solid
    }

    #[test]
    fn test_extruded_square_volume_and_membership() {
        let mut kernel = MockKernel::with_sample_step(0.25);
        let solid = cube(&mut kernel, 2.0);

        assert_relative_eq!(kernel.volume(&solid).unwrap(), 8.0, epsilon = 1e-9);
        assert!(kernel.contains(&solid, Point3d::new(1.0, 1.0, 1.0)).unwrap());
        assert!(!kernel.contains(&solid, Point3d::new(1.0, 1.0, 2.5)).unwrap());
        assert_eq!(kernel.object_count(), 1);
    }

    #[test]
    fn test_open_polyline_rejected_as_boundary() {
        let mut kernel = MockKernel::new();
        let curve = kernel.add_polyline(&unit_square(0.0)).unwrap();
        let err = kernel.add_planar_surface(&curve).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_non_planar_boundary_rejected() {
        let mut kernel = MockKernel::new();
        let mut pts = unit_square(0.0);
        pts[2].z = 0.5;
        pts.push(pts[0]);
        let curve = kernel.add_polyline(&pts).unwrap();
        let err = kernel.add_planar_surface(&curve).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_rail_parallel_to_surface_rejected() {
        let mut kernel = MockKernel::new();
        let surface = kernel.add_surface_from_points(&unit_square(0.0)).unwrap();
        let rail = kernel.add_line(Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0)).unwrap();
        let err = kernel.extrude_surface_along_rail(&surface, &rail).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_join_surfaces_builds_closed_cube() {
        let mut kernel = MockKernel::with_sample_step(0.1);
        let p = |x: f64, y: f64, z: f64| Point3d::new(x, y, z);
        let quads = [
            [p(0., 0., 0.), p(1., 0., 0.), p(1., 1., 0.), p(0., 1., 0.)],
            [p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.)],
            [p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.), p(0., 0., 1.)],
            [p(0., 1., 0.), p(1., 1., 0.), p(1., 1., 1.), p(0., 1., 1.)],
            [p(0., 0., 0.), p(0., 1., 0.), p(0., 1., 1.), p(0., 0., 1.)],
            [p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.), p(1., 0., 1.)],
        ];
        let surfaces = quads
            .iter()
            .map(|q| kernel.add_surface_from_points(q).unwrap())
            .collect();
        let solid = kernel.join_surfaces(surfaces).unwrap();

        assert_relative_eq!(kernel.volume(&solid).unwrap(), 1.0, epsilon = 1e-9);
        assert!(kernel.contains(&solid, p(0.3, 0.6, 0.2)).unwrap());
        assert!(!kernel.contains(&solid, p(1.3, 0.6, 0.2)).unwrap());
        assert_eq!(kernel.object_count(), 1, "joined surfaces are consumed");
    }

    #[test]
    fn test_join_open_shell_rejected() {
        let mut kernel = MockKernel::new();
        let surfaces = (0..4)
            .map(|i| kernel.add_surface_from_points(&unit_square(i as f64)).unwrap())
            .collect();
        let err = kernel.join_surfaces(surfaces).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_union_consumes_inputs() {
        let mut kernel = MockKernel::new();
        let a = cube(&mut kernel, 1.0);
        let b = kernel.translate_copy(&a, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        let (ka, kb) = (a.key(), b.key());
        let u = kernel.boolean_union(vec![a, b]).unwrap();

        assert!(!kernel.is_solid_alive(ka));
        assert!(!kernel.is_solid_alive(kb));
        assert!(kernel.is_solid_alive(u.key()));
        assert_eq!(kernel.journal().last(), Some(&MockOp::Union { operands: 2 }));
    }

    #[test]
    fn test_difference_is_non_destructive() {
        let mut kernel = MockKernel::with_sample_step(0.25);
        let a = cube(&mut kernel, 2.0);
        let b = kernel.add_cylinder(Point3d::new(1.0, 1.0, -1.0), 4.0, 0.5).unwrap();
        let d = kernel.boolean_difference(&a, &b).unwrap();

        assert!(kernel.is_solid_alive(a.key()));
        assert!(kernel.is_solid_alive(b.key()));
        assert!(!kernel.contains(&d, Point3d::new(1.0, 1.0, 1.0)).unwrap());
        assert!(kernel.volume(&d).unwrap() < kernel.volume(&a).unwrap());
    }

    #[test]
    fn test_mirror_and_rotate_copies_preserve_volume() {
        let mut kernel = MockKernel::with_sample_step(0.25);
        let a = cube(&mut kernel, 2.0);
        let m = kernel.mirror_copy(&a, Point3d::ORIGIN, Vec3::X).unwrap();
        let r = kernel.rotate_copy(&m, Point3d::ORIGIN, 180.0, Vec3::Z).unwrap();

        assert!(kernel.contains(&m, Point3d::new(-1.5, 0.5, 0.5)).unwrap());
        assert!(kernel.contains(&r, Point3d::new(1.5, -0.5, 0.5)).unwrap());
        assert_relative_eq!(kernel.volume(&r).unwrap(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cylinder_volume_close_to_analytic() {
        let mut kernel = MockKernel::with_sample_step(0.05);
        let c = kernel.add_cylinder(Point3d::ORIGIN, 2.0, 1.0).unwrap();
        let expected = std::f64::consts::PI * 2.0;
        assert_relative_eq!(kernel.volume(&c).unwrap(), expected, max_relative = 0.01);
    }
}
