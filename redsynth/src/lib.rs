//! Synthesis of voxel circuits from flat netlists.
//!
//! Given a [`Netlist`](rcir::Netlist) and a [`Library`](crate::library::Library)
//! of pre-built tiles, [`synthesize`](crate::assemble::synthesize) produces
//! an [`Assembly`](crate::assemble::Assembly): a collision-free placement of
//! every instance plus a wire bus realizing every network, composed into one
//! voxel schematic.
//!
//! The pipeline is two cooperating search layers: a global
//! simulated-annealing search over placements (scored by wire-length and,
//! optionally, collision-relaxed routing cost), and a per-network A* wire
//! router that treats placed instances and previously routed busses as
//! obstacles.
//!
//! Everything is single-threaded and deterministic for a fixed seed.
#![warn(missing_docs)]

pub mod assemble;
pub mod codec;
pub mod config;
pub mod error;
pub mod library;
pub mod place;
pub mod render;
pub mod route;


pub use assemble::{synthesize, Assembly};
pub use codec::{JsonCodec, SchematicCodec};
pub use config::{OnUnroutable, SynthConfig};
pub use error::{Error, Result};
pub use library::{Library, Pin, Tile, TilePort};
pub use place::{Placement, Pose};
pub use route::Bus;
