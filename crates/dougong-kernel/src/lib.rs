pub mod geometry;
pub mod mock_kernel;
pub mod primitives;
pub mod tessellation;
pub mod traits;
pub mod truck_kernel;
pub mod types;

pub use geometry::{BoundingBox, Point3d, Transform, Vec3};
pub use mock_kernel::{MockKernel, MockOp};
pub use traits::*;
pub use truck_kernel::TruckKernel;
pub use types::*;
