//! 3-D points.

use serde::{Deserialize, Serialize};

use crate::dir::Dir;

/// A point in three-dimensional voxel space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Pos {
    /// The x-coordinate of the point.
    pub x: i32,
    /// The y-coordinate (height) of the point.
    pub y: i32,
    /// The z-coordinate of the point.
    pub z: i32,
}

impl Pos {
    /// Creates a new [`Pos`] from (x, y, z) coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the origin, `(0, 0, 0)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Pos::zero(), Pos::new(0, 0, 0));
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0, z: 0 }
    }

    /// Returns the element-wise minimum of `self` and `other`.
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Returns the element-wise maximum of `self` and `other`.
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Returns the Manhattan (L1) norm of this point, treated as a vector.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Pos::new(1, -2, 3).manhattan(), 6);
    /// ```
    pub fn manhattan(self) -> u32 {
        self.x.unsigned_abs() + self.y.unsigned_abs() + self.z.unsigned_abs()
    }

    /// Returns the Manhattan distance between `self` and `other`.
    pub fn distance(self, other: Self) -> u32 {
        (self - other).manhattan()
    }

    /// Returns this point with its y-coordinate zeroed.
    pub const fn xz(self) -> Self {
        Self::new(self.x, 0, self.z)
    }
}

impl std::ops::Add<Pos> for Pos {
    type Output = Self;
    fn add(self, rhs: Pos) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign<Pos> for Pos {
    fn add_assign(&mut self, rhs: Pos) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl std::ops::Sub<Pos> for Pos {
    type Output = Self;
    fn sub(self, rhs: Pos) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::SubAssign<Pos> for Pos {
    fn sub_assign(&mut self, rhs: Pos) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl std::ops::Neg for Pos {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Mul<i32> for Pos {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Add<Dir> for Pos {
    type Output = Self;
    /// Steps one voxel in the given direction.
    fn add(self, rhs: Dir) -> Self::Output {
        self + rhs.delta()
    }
}

impl From<(i32, i32, i32)> for Pos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<[i32; 3]> for Pos {
    fn from(value: [i32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
