//! Rigid transforms: rotation about the origin followed by a translation.

use serde::{Deserialize, Serialize};

use crate::cuboid::Cuboid;
use crate::dir::Dir;
use crate::point::Pos;
use crate::region::Region;
use crate::rotation::Rotation;

/// A rigid transform.
///
/// Applies `rotation` about the origin, then translates by `offset`.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Transform {
    /// The rotation, applied first.
    pub rotation: Rotation,
    /// The translation, applied second.
    pub offset: Pos,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        rotation: Rotation::IDENTITY,
        offset: Pos::zero(),
    };

    /// Creates a transform from a rotation and an offset.
    pub const fn new(rotation: Rotation, offset: Pos) -> Self {
        Self { rotation, offset }
    }

    /// Creates a pure translation.
    pub const fn from_offset(offset: Pos) -> Self {
        Self {
            rotation: Rotation::IDENTITY,
            offset,
        }
    }

    /// Applies this transform to a point.
    pub fn apply(&self, pos: Pos) -> Pos {
        self.rotation.apply(pos) + self.offset
    }

    /// Applies the rotational part of this transform to a direction.
    pub fn apply_dir(&self, dir: Dir) -> Dir {
        self.rotation.rotate_dir(dir)
    }

    /// Returns the transform equivalent to applying `self`, then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            rotation: self.rotation.then(other.rotation),
            offset: other.rotation.apply(self.offset) + other.offset,
        }
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        Transform {
            rotation,
            offset: -rotation.apply(self.offset),
        }
    }
}

/// A value that can be mapped through a rigid [`Transform`].
pub trait Transformable {
    /// Returns this value mapped through `transform`.
    fn transformed(&self, transform: &Transform) -> Self;
}

impl Transformable for Pos {
    fn transformed(&self, transform: &Transform) -> Self {
        transform.apply(*self)
    }
}

impl Transformable for Cuboid {
    fn transformed(&self, transform: &Transform) -> Self {
        self.rotate_about(Pos::zero(), transform.rotation)
            .translate(transform.offset)
    }
}

impl Transformable for Region {
    fn transformed(&self, transform: &Transform) -> Self {
        self.rotate_about(Pos::zero(), transform.rotation)
            .translate(transform.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_matches_sequential_application() {
        let a = Transform::new(Rotation::yaw(1), Pos::new(1, 2, 3));
        let b = Transform::new(Rotation::yaw(2), Pos::new(-4, 0, 5));
        let p = Pos::new(7, -1, 2);
        assert_eq!(a.then(&b).apply(p), b.apply(a.apply(p)));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform::new(Rotation::yaw(3), Pos::new(9, -2, 4));
        let p = Pos::new(-3, 6, 1);
        assert_eq!(t.inverse().apply(t.apply(p)), p);
        assert_eq!(t.then(&t.inverse()), Transform::IDENTITY);
    }
}
