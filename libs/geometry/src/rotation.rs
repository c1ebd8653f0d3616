//! The axis-aligned rotation group.
//!
//! There are exactly 24 rotations that map the six axis directions onto
//! themselves. Each is represented here as a signed permutation matrix;
//! composition and inversion go through lookup tables built once at first
//! use, so rotations themselves are a single byte.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dir::Dir;
use crate::point::Pos;

/// A row-major signed permutation matrix.
type Mat = [[i8; 3]; 3];

const IDENT_MAT: Mat = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

/// Quarter turn about +Y: `(x, y, z) -> (z, y, -x)` (east becomes north).
const YAW_MAT: Mat = [[0, 0, 1], [0, 1, 0], [-1, 0, 0]];

/// Quarter turn about +X: `(x, y, z) -> (x, -z, y)`.
const PITCH_MAT: Mat = [[1, 0, 0], [0, 0, -1], [0, 1, 0]];

/// Matrix product `a · b`: applies `b` first, then `a`.
fn mat_mul(a: Mat, b: Mat) -> Mat {
    let mut out = [[0i8; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

fn mat_apply(m: Mat, p: Pos) -> Pos {
    let v = [p.x, p.y, p.z];
    let row = |r: [i8; 3]| -> i32 { (0..3).map(|k| i32::from(r[k]) * v[k]).sum() };
    Pos::new(row(m[0]), row(m[1]), row(m[2]))
}

struct Tables {
    mats: Vec<Mat>,
    compose: [[u8; 24]; 24],
    inverse: [u8; 24],
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    // Breadth-first closure of the generators; the identity lands at index 0.
    let mut mats: Vec<Mat> = vec![IDENT_MAT];
    let mut index: FxHashMap<Mat, u8> = FxHashMap::default();
    index.insert(IDENT_MAT, 0);
    let mut head = 0;
    while head < mats.len() {
        let m = mats[head];
        head += 1;
        for gen in [YAW_MAT, PITCH_MAT] {
            let next = mat_mul(gen, m);
            if !index.contains_key(&next) {
                index.insert(next, mats.len() as u8);
                mats.push(next);
            }
        }
    }
    assert_eq!(mats.len(), 24, "axis-aligned rotation group has order 24");

    let mut compose = [[0u8; 24]; 24];
    for (a, &ma) in mats.iter().enumerate() {
        for (b, &mb) in mats.iter().enumerate() {
            // `compose[a][b]` applies `a` first, then `b`.
            compose[a][b] = index[&mat_mul(mb, ma)];
        }
    }

    let mut inverse = [0u8; 24];
    for (a, row) in compose.iter().enumerate() {
        inverse[a] = row
            .iter()
            .position(|&c| c == 0)
            .expect("every rotation has an inverse") as u8;
    }

    Tables {
        mats,
        compose,
        inverse,
    }
});

/// One of the 24 axis-aligned rotations.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rotation(u8);

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Rotation = Rotation(0);

    /// Returns all 24 rotations.
    pub fn all() -> impl Iterator<Item = Rotation> {
        (0..24).map(Rotation)
    }

    /// Returns the rotation of `quarter_turns` quarter turns about +Y.
    ///
    /// One quarter turn maps `(x, y, z)` to `(z, y, -x)`, so east becomes
    /// north.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Rotation::yaw(1).rotate_dir(Dir::East), Dir::North);
    /// assert_eq!(Rotation::yaw(4), Rotation::IDENTITY);
    /// ```
    pub fn yaw(quarter_turns: i32) -> Rotation {
        // The yaw generator is the first non-identity element discovered
        // by the breadth-first closure.
        let yaw1 = Rotation(1);
        debug_assert_eq!(TABLES.mats[1], YAW_MAT);
        (0..quarter_turns.rem_euclid(4)).fold(Rotation::IDENTITY, |acc, _| acc.then(yaw1))
    }

    /// Applies this rotation to a point about the origin.
    pub fn apply(self, pos: Pos) -> Pos {
        mat_apply(TABLES.mats[self.0 as usize], pos)
    }

    /// Applies this rotation to a direction.
    pub fn rotate_dir(self, dir: Dir) -> Dir {
        Dir::from_delta(self.apply(dir.delta()))
            .expect("rotations map axis directions to axis directions")
    }

    /// Returns the rotation equivalent to applying `self`, then `other`.
    pub fn then(self, other: Rotation) -> Rotation {
        Rotation(TABLES.compose[self.0 as usize][other.0 as usize])
    }

    /// Returns the inverse rotation.
    pub fn inverse(self) -> Rotation {
        Rotation(TABLES.inverse[self.0 as usize])
    }
}
