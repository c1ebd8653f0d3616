//! Assembly: placement, routing, and voxel-map composition.

use indexmap::IndexMap;
use rcir::{Netlist, NetworkId};
use tracing::{info, warn};
use voxel::Schematic;

use crate::config::{OnUnroutable, SynthConfig};
use crate::error::{Error, Result};
use crate::library::Library;
use crate::place::{self, Placement};
use crate::route::{self, Bus, RouteSpace};

/// A fully synthesized circuit: the placement, one bus per routed network,
/// and the composed voxel map.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The pose of every instance.
    pub placement: Placement,
    /// The bus realizing each network, in network-id order. Networks the
    /// router skipped (policy permitting) are absent.
    pub busses: IndexMap<NetworkId, Bus>,
    /// The composed voxel map.
    pub schematic: Schematic,
}

/// Synthesizes a voxel circuit from a netlist and a tile library.
///
/// Validates the netlist against the library, searches for a placement,
/// routes every network in ascending endpoint-bounding-box order, and
/// composes the final schematic by disjoint overlay. Overlap during
/// composition indicates a violated invariant and fails with
/// [`Error::Internal`].
pub fn synthesize(netlist: &Netlist, library: &Library, config: &SynthConfig) -> Result<Assembly> {
    library.validate_netlist(netlist)?;

    let placement = place::place(netlist, library, config)?;
    info!(instances = placement.len(), "placement complete");

    let busses = route_all(netlist, library, &placement, config)?;
    info!(routed = busses.len(), "routing complete");

    let schematic = compose(netlist, library, &placement, &busses)?;
    Ok(Assembly {
        placement,
        busses,
        schematic,
    })
}

/// Routes every network of `netlist` against a fixed placement.
///
/// Networks route in ascending endpoint-bounding-box volume (tight nets
/// first, ties broken by network id); each routed bus becomes an obstacle
/// for the rest. Failures follow
/// [`config.on_unroutable`](crate::config::SynthConfig::on_unroutable):
/// skipped networks are absent from the result, aborting surfaces
/// [`Error::Unroutable`].
pub fn route_all(
    netlist: &Netlist,
    library: &Library,
    placement: &Placement,
    config: &SynthConfig,
) -> Result<IndexMap<NetworkId, Bus>> {
    let endpoints = place::resolve_endpoints(netlist, library)?;
    let mut space = RouteSpace::new(netlist, library, placement, config)?;
    let order = route::routing_order(&endpoints, placement)?;

    let mut busses = IndexMap::new();
    for id in order {
        match route::route_network(id, &endpoints[&id], placement, &space, config) {
            Ok(bus) => {
                space.claim(&bus);
                busses.insert(id, bus);
            }
            Err(Error::NoPath { network, reason }) => match config.on_unroutable {
                OnUnroutable::Skip => {
                    warn!(%network, %reason, "skipping unroutable network");
                }
                OnUnroutable::Abort => return Err(Error::Unroutable(network)),
            },
            Err(other) => return Err(other),
        }
    }
    busses.sort_keys();
    Ok(busses)
}

/// Composes the final voxel map by disjoint overlay of every placed
/// instance schematic and every bus footprint.
fn compose(
    netlist: &Netlist,
    library: &Library,
    placement: &Placement,
    busses: &IndexMap<NetworkId, Bus>,
) -> Result<Schematic> {
    let mut schematic = Schematic::new();
    for (id, pose) in placement.iter() {
        let instance = netlist
            .instance(id)
            .ok_or_else(|| Error::Internal(format!("unknown instance {id}")))?;
        let tile = library
            .get(&instance.lib)
            .ok_or_else(|| Error::Internal(format!("unknown tile {}", instance.lib)))?;
        let fragment = tile.schematic.transformed(&pose.transform());
        schematic
            .merge(&fragment)
            .map_err(|e| Error::Internal(format!("instance {id} overlaps at {}", e.0)))?;
    }
    for (id, bus) in busses {
        schematic
            .merge(&bus.schematic)
            .map_err(|e| Error::Internal(format!("bus {id} overlaps at {}", e.0)))?;
    }
    Ok(schematic)
}
