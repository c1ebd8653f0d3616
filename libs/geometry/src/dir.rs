//! Axis-aligned unit directions.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::point::Pos;

/// An enumeration of the three coordinate axes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Axis {
    /// The x-axis.
    X,
    /// The y-axis (vertical).
    Y,
    /// The z-axis.
    Z,
}

impl Axis {
    /// All three axes.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// One of the six axis-aligned unit directions.
///
/// Follows the voxel-world convention: east is +x, up is +y, south is +z.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Towards +x.
    East,
    /// Towards -x.
    West,
    /// Towards +y.
    Up,
    /// Towards -y.
    Down,
    /// Towards +z.
    South,
    /// Towards -z.
    North,
}

impl Dir {
    /// All six directions.
    pub const ALL: [Dir; 6] = [
        Dir::East,
        Dir::West,
        Dir::Up,
        Dir::Down,
        Dir::South,
        Dir::North,
    ];

    /// The four horizontal directions, in +Y quarter-turn order.
    pub const CARDINAL: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    /// Returns the unit vector for this direction.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Dir::East.delta(), Pos::new(1, 0, 0));
    /// assert_eq!(Dir::North.delta(), Pos::new(0, 0, -1));
    /// ```
    pub const fn delta(self) -> Pos {
        match self {
            Dir::East => Pos::new(1, 0, 0),
            Dir::West => Pos::new(-1, 0, 0),
            Dir::Up => Pos::new(0, 1, 0),
            Dir::Down => Pos::new(0, -1, 0),
            Dir::South => Pos::new(0, 0, 1),
            Dir::North => Pos::new(0, 0, -1),
        }
    }

    /// Returns the opposite direction.
    pub const fn opposite(self) -> Self {
        match self {
            Dir::East => Dir::West,
            Dir::West => Dir::East,
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::South => Dir::North,
            Dir::North => Dir::South,
        }
    }

    /// Returns the axis this direction is aligned with.
    pub const fn axis(self) -> Axis {
        match self {
            Dir::East | Dir::West => Axis::X,
            Dir::Up | Dir::Down => Axis::Y,
            Dir::South | Dir::North => Axis::Z,
        }
    }

    /// Returns `true` if this direction is [`Dir::Up`] or [`Dir::Down`].
    pub const fn is_vertical(self) -> bool {
        matches!(self, Dir::Up | Dir::Down)
    }

    /// Recovers a direction from a unit vector, if the vector is one.
    pub fn from_delta(delta: Pos) -> Option<Self> {
        Dir::ALL.into_iter().find(|dir| dir.delta() == delta)
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dir::East => "east",
            Dir::West => "west",
            Dir::Up => "up",
            Dir::Down => "down",
            Dir::South => "south",
            Dir::North => "north",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Dir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "east" => Ok(Dir::East),
            "west" => Ok(Dir::West),
            "up" => Ok(Dir::Up),
            "down" => Ok(Dir::Down),
            "south" => Ok(Dir::South),
            "north" => Ok(Dir::North),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}
