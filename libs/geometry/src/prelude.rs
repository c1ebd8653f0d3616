//! A collection of types and traits to glob-import.

pub use crate::cuboid::Cuboid;
pub use crate::dir::{Axis, Dir};
pub use crate::point::Pos;
pub use crate::region::Region;
pub use crate::rotation::Rotation;
pub use crate::transform::{Transform, Transformable};
