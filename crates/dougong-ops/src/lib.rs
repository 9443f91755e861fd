pub mod primitives;
pub mod symmetry;
pub mod types;

pub use primitives::{add_box, extrude_along};
pub use symmetry::{
    mirror_pair, quad_mirror_object, quad_rotate_object, quad_rotate_point, rotate_pair,
};
pub use types::*;
