use slotmap::new_key_type;

new_key_type! {
    /// Generational key of a solid in a kernel store. Copyable, unlike the handle.
    pub struct SolidKey;
    /// Generational key of a curve in a kernel store.
    pub struct CurveKey;
    /// Generational key of a surface in a kernel store.
    pub struct SurfaceKey;
}

/// Owned handle to a solid in the modeling kernel.
///
/// Handles are move-only: operations that invalidate a solid (boolean union,
/// deletion) take the handle by value, so a stale handle cannot be used.
/// Valid only for the kernel session that created it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SolidHandle(pub(crate) SolidKey);

impl SolidHandle {
    /// The raw store key, for liveness queries after the handle is consumed.
    pub fn key(&self) -> SolidKey {
        self.0
    }
}

/// Owned handle to a polyline or line curve.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CurveHandle(pub(crate) CurveKey);

impl CurveHandle {
    pub fn key(&self) -> CurveKey {
        self.0
    }
}

/// Owned handle to a planar surface.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub(crate) SurfaceKey);

impl SurfaceHandle {
    pub fn key(&self) -> SurfaceKey {
        self.0
    }
}

/// Which kind of kernel object an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Curve,
    Surface,
    Solid,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("stale {kind:?} handle: object no longer exists")]
    StaleHandle { kind: ObjectKind },

    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

impl KernelError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        KernelError::DegenerateGeometry {
            reason: reason.into(),
        }
    }
}
