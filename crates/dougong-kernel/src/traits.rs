use crate::geometry::{BoundingBox, Point3d, Vec3};
use crate::types::*;

/// Modeling kernel capability consumed by the bracket-set builders.
///
/// Implemented by `TruckKernel` (wraps truck's B-rep modeling) and
/// `MockKernel` (deterministic CSG test double).
///
/// Ownership rules: operations that invalidate an object take its handle by
/// value. Boolean union consumes every input; boolean difference borrows both
/// operands and leaves them alive.
pub trait ModelingKernel {
    /// Create a polyline through `points`. A closed polyline repeats its first point last.
    fn add_polyline(&mut self, points: &[Point3d]) -> Result<CurveHandle, KernelError>;

    /// Create a straight line from `start` to `end`.
    fn add_line(&mut self, start: Point3d, end: Point3d) -> Result<CurveHandle, KernelError>;

    /// Create a planar surface bounded by a closed planar curve.
    fn add_planar_surface(&mut self, boundary: &CurveHandle)
        -> Result<SurfaceHandle, KernelError>;

    /// Create a surface from 3 or 4 corner points, in winding order.
    fn add_surface_from_points(&mut self, corners: &[Point3d])
        -> Result<SurfaceHandle, KernelError>;

    /// Join surfaces into a closed shell and return it as a solid. Consumes the surfaces.
    fn join_surfaces(&mut self, surfaces: Vec<SurfaceHandle>) -> Result<SolidHandle, KernelError>;

    /// Sweep a planar surface along a straight rail.
    fn extrude_surface_along_rail(
        &mut self,
        surface: &SurfaceHandle,
        rail: &CurveHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Capped cylinder standing on `base`, extending `height` along +Z.
    fn add_cylinder(
        &mut self,
        base: Point3d,
        height: f64,
        radius: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean union of all inputs. The inputs are consumed.
    fn boolean_union(&mut self, solids: Vec<SolidHandle>) -> Result<SolidHandle, KernelError>;

    /// Boolean difference `minuend - subtrahend`. Both operands stay alive.
    fn boolean_difference(
        &mut self,
        minuend: &SolidHandle,
        subtrahend: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Rotated copy of `solid` about the axis through `center`.
    fn rotate_copy(
        &mut self,
        solid: &SolidHandle,
        center: Point3d,
        angle_deg: f64,
        axis: Vec3,
    ) -> Result<SolidHandle, KernelError>;

    /// Mirrored copy of `solid` across the plane through `plane_point` with normal `plane_normal`.
    fn mirror_copy(
        &mut self,
        solid: &SolidHandle,
        plane_point: Point3d,
        plane_normal: Vec3,
    ) -> Result<SolidHandle, KernelError>;

    /// Translated copy of `solid`.
    fn translate_copy(&mut self, solid: &SolidHandle, offset: Vec3)
        -> Result<SolidHandle, KernelError>;

    fn delete_solid(&mut self, solid: SolidHandle);

    fn delete_curve(&mut self, curve: CurveHandle);

    fn delete_surface(&mut self, surface: SurfaceHandle);

    /// Enclosed volume in mm³.
    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError>;

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError>;

    /// Number of live curves, surfaces and solids.
    fn object_count(&self) -> usize;

    /// Whether the solid behind `key` still exists.
    fn is_solid_alive(&self, key: SolidKey) -> bool;

    /// Rotate `solid` in place. The input handle is consumed even on failure.
    fn rotate(
        &mut self,
        solid: SolidHandle,
        center: Point3d,
        angle_deg: f64,
        axis: Vec3,
    ) -> Result<SolidHandle, KernelError> {
        let rotated = self.rotate_copy(&solid, center, angle_deg, axis);
        self.delete_solid(solid);
        rotated
    }

    /// Boolean difference that deletes both operands afterwards.
    fn boolean_difference_consuming(
        &mut self,
        minuend: SolidHandle,
        subtrahend: SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let result = self.boolean_difference(&minuend, &subtrahend);
        self.delete_solid(minuend);
        self.delete_solid(subtrahend);
        result
    }
}
