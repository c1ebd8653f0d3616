//! Error types and error handling utilities.

use std::path::PathBuf;
use std::sync::Arc;

use arcstr::ArcStr;
use rcir::{InstanceId, NetworkId, PortName};

/// A result type returning synthesis errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for synthesis functions.
///
/// This is a closed taxonomy: engines map lower-level absences into these
/// variants, and [`Error::Internal`] is never recovered from.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The netlist failed validation, either against the model invariants
    /// or against the tile library.
    #[error("bad netlist: {0}")]
    BadNetlist(#[from] NetlistIssue),
    /// A tile in the library directory could not be loaded.
    #[error("bad tile at {path}: {field}")]
    BadTile {
        /// The offending tile directory or file.
        path: PathBuf,
        /// The missing or malformed field.
        field: String,
    },
    /// The placement engine could not seed a valid initial state.
    #[error("no feasible placement for instance {0}")]
    Infeasible(InstanceId),
    /// The router found no wire path for a network.
    #[error("no path for {network}: {reason}")]
    NoPath {
        /// The unroutable network.
        network: NetworkId,
        /// Why routing failed.
        reason: NoPathReason,
    },
    /// Assembly gave up on a network, per the configured policy.
    #[error("network {0} could not be routed")]
    Unroutable(NetworkId),
    /// A search exceeded its configured budget.
    #[error("{0} exceeded its search budget")]
    OverBudget(&'static str),
    /// An I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] Arc<std::io::Error>),
    /// An invariant violation; indicates a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<rcir::NetlistError> for Error {
    fn from(value: rcir::NetlistError) -> Self {
        Self::BadNetlist(NetlistIssue::Model(value))
    }
}

/// Why the router failed to connect a network.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoPathReason {
    /// An endpoint is itself blocked or outside the search volume.
    Unreachable,
    /// All paths between the endpoints are obstructed.
    Blocked,
    /// The search exceeded its exploration budget.
    OverBudget,
}

impl std::fmt::Display for NoPathReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoPathReason::Unreachable => write!(f, "unreachable"),
            NoPathReason::Blocked => write!(f, "blocked"),
            NoPathReason::OverBudget => write!(f, "over budget"),
        }
    }
}

/// The kinds of netlist validation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NetlistIssue {
    /// The netlist violates the model invariants.
    #[error(transparent)]
    Model(#[from] rcir::NetlistError),
    /// An instance names a tile the library does not contain.
    #[error("instance {instance} references unknown tile {lib}")]
    UnknownTile {
        /// The offending instance.
        instance: InstanceId,
        /// The unknown library key.
        lib: ArcStr,
    },
    /// An instance port does not exist on its tile.
    #[error("instance {instance} port {port} does not exist on its tile")]
    MissingTilePort {
        /// The offending instance.
        instance: InstanceId,
        /// The missing port.
        port: PortName,
    },
    /// An instance port's width disagrees with its tile.
    #[error(
        "instance {instance} port {port} has width {netlist_width}, tile has {tile_width}"
    )]
    PortWidthMismatch {
        /// The offending instance.
        instance: InstanceId,
        /// The offending port.
        port: PortName,
        /// The width declared by the netlist.
        netlist_width: usize,
        /// The width of the tile's pin sequence.
        tile_width: usize,
    },
    /// An instance port's direction disagrees with its tile.
    #[error("instance {instance} port {port} direction disagrees with its tile")]
    PortDirectionMismatch {
        /// The offending instance.
        instance: InstanceId,
        /// The offending port.
        port: PortName,
    },
}
