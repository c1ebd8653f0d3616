//! Sparse voxel maps for circuit assembly.
//!
//! A [`Schematic`](crate::schematic::Schematic) is a sparse mapping from
//! position to [`Block`](crate::block::Block). Schematics compose by
//! *disjoint overlay*: merging fails if any position is claimed twice,
//! which is how the assembly stage detects collision bugs early.
#![warn(missing_docs)]

pub mod block;
pub mod schematic;

pub use block::Block;
pub use schematic::{OverlapError, Schematic};
