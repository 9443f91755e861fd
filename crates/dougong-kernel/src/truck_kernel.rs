//! TruckKernel — real geometry kernel wrapping truck's API.

use crate::geometry::*;
use crate::primitives::{self, to_matrix4, to_vector3};
use crate::tessellation;
use crate::traits::ModelingKernel;
use crate::types::*;
use slotmap::SlotMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use truck_modeling::builder;
use truck_modeling::topology::{Face, Solid};

/// Tolerance handed to truck's boolean operations (mm).
pub const BOOLEAN_TOLERANCE: f64 = 0.05;
/// Looser tolerance for the last union attempt.
pub const RETRY_TOLERANCE: f64 = 0.1;

/// A planar surface: the face for sweeping plus its outline for sewing.
struct TruckSurface {
    polygon: Vec<Point3d>,
    face: Face,
}

/// Real geometry kernel backed by the truck B-rep library.
pub struct TruckKernel {
    curves: SlotMap<CurveKey, Vec<Point3d>>,
    surfaces: SlotMap<SurfaceKey, TruckSurface>,
    solids: SlotMap<SolidKey, Solid>,
    tolerance: f64,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            curves: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            solids: SlotMap::with_key(),
            tolerance: tessellation::MEASURE_TOLERANCE,
        }
    }

    /// Chord tolerance used when measuring volume and bounds.
    pub fn with_measure_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> SolidHandle {
        SolidHandle(self.solids.insert(solid))
    }

    /// The truck solid behind a handle.
    /// Signed mesh volume. Negative means the solid's faces point inward.
    pub fn signed_volume(&self, solid: &SolidHandle) -> Result<f64, KernelError> {
        let triangles = tessellation::triangles(self.get_solid(solid)?, self.tolerance)?;
        Ok(tessellation::signed_mesh_volume(&triangles))
    }

    pub fn get_solid(&self, handle: &SolidHandle) -> Result<&Solid, KernelError> {
        self.solids.get(handle.0).ok_or(KernelError::StaleHandle {
            kind: ObjectKind::Solid,
        })
    }

    fn get_curve(&self, handle: &CurveHandle) -> Result<&[Point3d], KernelError> {
        self.curves
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(KernelError::StaleHandle {
                kind: ObjectKind::Curve,
            })
    }

    fn insert_surface(&mut self, polygon: Vec<Point3d>) -> Result<SurfaceHandle, KernelError> {
        let normal = newell_normal(&polygon);
        if normal.length() < 1e-9 {
            return Err(KernelError::degenerate("polygon has zero area"));
        }
        if !is_planar(&polygon, normal) {
            return Err(KernelError::degenerate("polygon is not planar"));
        }
        let face = primitives::make_polygon_face(&polygon)?;
        Ok(SurfaceHandle(
            self.surfaces.insert(TruckSurface { polygon, face }),
        ))
    }

    fn transformed_copy(
        &mut self,
        solid: &SolidHandle,
        transform: &Transform,
    ) -> Result<SolidHandle, KernelError> {
        let source = self.get_solid(solid)?;
        let mut copy = builder::transformed(source, to_matrix4(transform));
        // A reflection turns every face inside out.
        if transform.is_reflection() {
            copy.not();
        }
        Ok(self.store_solid(copy))
    }
}

/// Run a truck boolean, turning a panic inside truck into `BooleanFailed`.
fn guarded<T>(operation: &str, f: impl FnOnce() -> T) -> Result<T, KernelError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(operation, %message, "truck boolean panicked");
        KernelError::BooleanFailed {
            reason: format!("truck {operation}() panicked: {message}"),
        }
    })
}

/// Union of two solids. Retries with the operands swapped and then with a
/// looser tolerance, since truck is sensitive to both on touching faces.
fn union_pair(a: &Solid, b: &Solid) -> Result<Solid, KernelError> {
    let attempts = [
        (a, b, BOOLEAN_TOLERANCE),
        (b, a, BOOLEAN_TOLERANCE),
        (a, b, RETRY_TOLERANCE),
    ];
    let mut last = None;
    for (first, second, tolerance) in attempts {
        match guarded("or", || truck_shapeops::or(first, second, tolerance)) {
            Ok(Some(solid)) => return Ok(solid),
            Ok(None) => {
                debug!(tolerance, "truck or() returned None");
                last = Some(KernelError::BooleanFailed {
                    reason: "truck or() returned None".to_string(),
                });
            }
            Err(e) => last = Some(e),
        }
    }
    let error = last.unwrap_or(KernelError::BooleanFailed {
        reason: "truck or() was not attempted".to_string(),
    });
    warn!(%error, "union failed after retries");
    Err(error)
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelingKernel for TruckKernel {
    fn add_polyline(&mut self, points: &[Point3d]) -> Result<CurveHandle, KernelError> {
        if points.len() < 2 {
            return Err(KernelError::degenerate("polyline needs at least 2 points"));
        }
        Ok(CurveHandle(self.curves.insert(points.to_vec())))
    }

    fn add_line(&mut self, start: Point3d, end: Point3d) -> Result<CurveHandle, KernelError> {
        if start.distance_to(&end) < POINT_TOLERANCE {
            return Err(KernelError::degenerate("line has zero length"));
        }
        Ok(CurveHandle(self.curves.insert(vec![start, end])))
    }

    fn add_planar_surface(
        &mut self,
        boundary: &CurveHandle,
    ) -> Result<SurfaceHandle, KernelError> {
        let points = self.get_curve(boundary)?;
        if !is_closed(points) {
            return Err(KernelError::degenerate("boundary curve is not closed"));
        }
        let polygon = open_loop(points).to_vec();
        self.insert_surface(polygon)
    }

    fn add_surface_from_points(
        &mut self,
        corners: &[Point3d],
    ) -> Result<SurfaceHandle, KernelError> {
        if !(3..=4).contains(&corners.len()) {
            return Err(KernelError::degenerate("surface needs 3 or 4 corners"));
        }
        self.insert_surface(open_loop(corners).to_vec())
    }

    fn join_surfaces(&mut self, surfaces: Vec<SurfaceHandle>) -> Result<SolidHandle, KernelError> {
        let mut faces = Vec::with_capacity(surfaces.len());
        for surface in surfaces {
            let stored = self
                .surfaces
                .remove(surface.0)
                .ok_or(KernelError::StaleHandle {
                    kind: ObjectKind::Surface,
                })?;
            faces.push(stored.polygon);
        }
        orient_outward(&mut faces);
        let solid = primitives::sew_polygons(&faces)?;
        debug!(faces = faces.len(), "joined surfaces into closed shell");
        Ok(self.store_solid(solid))
    }

    fn extrude_surface_along_rail(
        &mut self,
        surface: &SurfaceHandle,
        rail: &CurveHandle,
    ) -> Result<SolidHandle, KernelError> {
        let [start, end] = self.get_curve(rail)? else {
            return Err(KernelError::degenerate("rail must be a straight line"));
        };
        let sweep = *end - *start;
        let stored = self
            .surfaces
            .get(surface.0)
            .ok_or(KernelError::StaleHandle {
                kind: ObjectKind::Surface,
            })?;
        let alignment = newell_normal(&stored.polygon).dot(&sweep);
        if alignment.abs() < 1e-12 {
            return Err(KernelError::degenerate("rail is parallel to the surface"));
        }

        let mut solid = builder::tsweep(&stored.face, to_vector3(&sweep));
        // tsweep keeps the face normal; sweeping against it yields an inside-out shell.
        if alignment < 0.0 {
            solid.not();
        }
        Ok(self.store_solid(solid))
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
        let solid = primitives::make_cylinder(&base, height, radius)?;
        Ok(self.store_solid(solid))
    }

    fn boolean_union(&mut self, solids: Vec<SolidHandle>) -> Result<SolidHandle, KernelError> {
        let operands = solids.len();
        let mut inputs = Vec::with_capacity(operands);
        for handle in solids {
            let solid = self.solids.remove(handle.0).ok_or(KernelError::StaleHandle {
                kind: ObjectKind::Solid,
            })?;
            inputs.push(solid);
        }

        let mut iter = inputs.into_iter();
        let mut acc = iter.next().ok_or(KernelError::BooleanFailed {
            reason: "union of no solids".to_string(),
        })?;
        for next in iter {
            acc = union_pair(&acc, &next)?;
        }
        debug!(operands, "boolean union");
        Ok(self.store_solid(acc))
    }

    fn boolean_difference(
        &mut self,
        minuend: &SolidHandle,
        subtrahend: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get_solid(minuend)?;
        let mut solid_b = self.get_solid(subtrahend)?.clone();

        // Difference = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = guarded("and", || truck_shapeops::and(solid_a, &solid_b, BOOLEAN_TOLERANCE))?
            .ok_or_else(|| KernelError::BooleanFailed {
                reason: "truck and() returned None for difference".to_string(),
            })?;
        Ok(self.store_solid(result))
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
        self.transformed_copy(solid, &Transform::rotation(center, axis, angle_deg))
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
        self.transformed_copy(solid, &Transform::reflection(plane_point, plane_normal))
    }

    fn translate_copy(
        &mut self,
        solid: &SolidHandle,
        offset: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        self.transformed_copy(solid, &Transform::translation(offset))
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
        let triangles = tessellation::triangles(self.get_solid(solid)?, self.tolerance)?;
        Ok(tessellation::mesh_volume(&triangles))
    }

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError> {
        let triangles = tessellation::triangles(self.get_solid(solid)?, self.tolerance)?;
        tessellation::mesh_bounds(&triangles)
    }

    fn object_count(&self) -> usize {
        self.curves.len() + self.surfaces.len() + self.solids.len()
    }

    fn is_solid_alive(&self, key: SolidKey) -> bool {
        self.solids.contains_key(key)
    }
}
