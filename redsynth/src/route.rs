//! The wire router (bussing).
//!
//! Routes one network at a time: a 1-block-wide wire path from the
//! driver's port mouth to each sink's port mouth, avoiding the occupied
//! regions of all placed instances and the footprints of already-routed
//! busses. Sinks are attacked nearest-first; each leg is an independent A*
//! run rooted at the previous endpoint, with prior legs treated as
//! obstacles.
//!
//! The wire is topological, not electrically faithful: signal strength and
//! repeater spacing are a future router's concern.

use std::collections::BTreeSet;

use geometry::prelude::*;
use indexmap::IndexMap;
use pathfind::{astar, Route, SearchError, SearchLimits, SearchProblem};
use rcir::{Netlist, NetworkId};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};
use voxel::{Block, Schematic};

use crate::config::SynthConfig;
use crate::error::{Error, NoPathReason, Result};
use crate::library::Library;
use crate::place::{self, NetEndpoints, Placement};

/// The routing result for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    /// The network this bus realizes.
    pub network: NetworkId,
    /// The wire's block footprint.
    pub footprint: BTreeSet<Pos>,
    /// The schematic fragment realizing the wire.
    pub schematic: Schematic,
}

impl Bus {
    fn from_cells(network: NetworkId, cells: BTreeSet<Pos>) -> Bus {
        let schematic = cells
            .iter()
            .map(|&pos| (pos, Block::new("minecraft:redstone_wire")))
            .collect();
        Bus {
            network,
            footprint: cells,
            schematic,
        }
    }
}

/// The immovable obstacles one routing session works against.
pub(crate) struct RouteSpace {
    /// Cells claimed by placed instances. Port mouths may be exempted.
    instances: FxHashSet<Pos>,
    /// Cells claimed by already-routed wires. Never exempted.
    wires: FxHashSet<Pos>,
    /// The search volume.
    bounds: Cuboid,
}

impl RouteSpace {
    /// Collects instance obstacles and the search volume for a placement.
    pub fn new(
        netlist: &Netlist,
        library: &Library,
        placement: &Placement,
        config: &SynthConfig,
    ) -> Result<RouteSpace> {
        let regions = place::placement_regions(netlist, library, placement)?;
        let mut instances = FxHashSet::default();
        let mut bounds: Option<Cuboid> = None;
        for (_, region) in &regions {
            instances.extend(region.iter());
            if let Some(bbox) = region.bbox() {
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&bbox),
                    None => bbox,
                });
            }
        }
        let slack = Pos::new(config.route_slack, config.route_slack, config.route_slack);
        let bounds = bounds
            .map(|b| Cuboid::new(Cuboid::min(&b) - slack, Cuboid::max(&b) + slack))
            .unwrap_or_else(|| Cuboid::new(-slack, slack));
        Ok(RouteSpace {
            instances,
            wires: FxHashSet::default(),
            bounds,
        })
    }

    /// Claims a routed bus's cells as wire obstacles.
    pub fn claim(&mut self, bus: &Bus) {
        self.wires.extend(bus.footprint.iter().copied());
    }

    fn blocked(&self, pos: Pos, mouths: &FxHashSet<Pos>) -> bool {
        self.wires.contains(&pos) || (self.instances.contains(&pos) && !mouths.contains(&pos))
    }
}

/// One leg of a wire: a single-goal A* problem over `(position, entering
/// direction)` states.
struct LegProblem<'a> {
    start: Pos,
    goal: Pos,
    space: &'a RouteSpace,
    /// Cells of this network's own prior legs; obstacles like foreign
    /// wires.
    own_wires: &'a FxHashSet<Pos>,
    mouths: &'a FxHashSet<Pos>,
    turn_penalty: u32,
    /// Steiner approximation term: sinks still waiting after this leg.
    remaining_sinks: u32,
    sink_penalty: u32,
}

impl LegProblem<'_> {
    fn blocked(&self, pos: Pos) -> bool {
        self.own_wires.contains(&pos) || self.space.blocked(pos, self.mouths)
    }
}

impl SearchProblem for LegProblem<'_> {
    type State = (Pos, Option<Dir>);
    type Cost = u32;

    fn start(&self) -> Self::State {
        (self.start, None)
    }

    fn is_goal(&self, &(pos, _): &Self::State) -> bool {
        pos == self.goal
    }

    fn neighbors(&self, &(pos, entered): &Self::State) -> Vec<(Self::State, u32)> {
        Dir::ALL
            .into_iter()
            .filter_map(|dir| {
                let next = pos + dir;
                if !self.space.bounds.contains(next) || self.blocked(next) {
                    return None;
                }
                // Headroom: vertical runs need the cell above the
                // destination clear.
                if dir.is_vertical() && self.blocked(next + Dir::Up) {
                    return None;
                }
                let turn = match entered {
                    Some(prev) if prev != dir => self.turn_penalty,
                    _ => 0,
                };
                Some(((next, Some(dir)), 1 + turn))
            })
            .collect()
    }

    fn heuristic(&self, &(pos, _): &Self::State) -> u32 {
        pos.distance(self.goal) + self.sink_penalty * self.remaining_sinks
    }
}

fn classify(space: &RouteSpace, mouths: &FxHashSet<Pos>, goal: Pos) -> NoPathReason {
    if !space.bounds.contains(goal) || space.blocked(goal, mouths) {
        NoPathReason::Unreachable
    } else {
        NoPathReason::Blocked
    }
}

/// Routes one network against the current occupation state.
///
/// Legs run nearest-first from the driver mouth; each finished leg's cells
/// become obstacles for the following ones.
pub(crate) fn route_network(
    network: NetworkId,
    endpoints: &NetEndpoints,
    placement: &Placement,
    space: &RouteSpace,
    config: &SynthConfig,
) -> Result<Bus> {
    let driver_mouth = endpoints.driver.mouth(placement)?;
    let mut remaining: Vec<Pos> = endpoints
        .sinks
        .iter()
        .map(|sink| sink.mouth(placement))
        .collect::<Result<_>>()?;

    let mouths: FxHashSet<Pos> = std::iter::once(driver_mouth)
        .chain(remaining.iter().copied())
        .collect();

    let limits = SearchLimits {
        max_cost: config.max_route_cost,
        max_explored: config.max_explored,
    };

    let mut cells: BTreeSet<Pos> = BTreeSet::new();
    let mut own_wires: FxHashSet<Pos> = FxHashSet::default();
    let mut root = driver_mouth;
    cells.insert(root);

    while !remaining.is_empty() {
        // Nearest sink first; ties resolve to the earliest sink in
        // network order.
        let nearest = remaining
            .iter()
            .enumerate()
            .min_by_key(|(i, &pos)| (root.distance(pos), *i))
            .map(|(i, _)| i)
            .expect("remaining is non-empty");
        let goal = remaining.remove(nearest);

        let problem = LegProblem {
            start: root,
            goal,
            space,
            own_wires: &own_wires,
            mouths: &mouths,
            turn_penalty: config.turn_penalty,
            remaining_sinks: remaining.len() as u32,
            sink_penalty: config.sink_penalty,
        };

        let leg: Route<(Pos, Option<Dir>), u32> = match astar(&problem, &limits) {
            Ok(route) => route,
            Err(SearchError::NoPath) => {
                return Err(Error::NoPath {
                    network,
                    reason: classify(space, &mouths, goal),
                })
            }
            Err(SearchError::OverBudget) => {
                return Err(Error::NoPath {
                    network,
                    reason: NoPathReason::OverBudget,
                })
            }
        };
        trace!(%network, cost = leg.cost, "routed leg");

        for &(pos, _) in &leg.states {
            cells.insert(pos);
            own_wires.insert(pos);
        }
        root = goal;
    }

    Ok(Bus::from_cells(network, cells))
}

/// The assembly routing order: ascending endpoint bounding-box volume,
/// ties broken by network id. Tight nets route first.
pub(crate) fn routing_order(
    endpoints: &IndexMap<NetworkId, NetEndpoints>,
    placement: &Placement,
) -> Result<Vec<NetworkId>> {
    let mut keyed: Vec<(u64, String, NetworkId)> = Vec::with_capacity(endpoints.len());
    for (&id, net) in endpoints {
        let driver = net.driver.mouth(placement)?;
        let mut bbox = Cuboid::from_point(driver);
        for sink in &net.sinks {
            bbox = bbox.union(&Cuboid::from_point(sink.mouth(placement)?));
        }
        keyed.push((bbox.volume(), id.to_string(), id));
    }
    keyed.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(keyed.into_iter().map(|(_, _, id)| id).collect())
}

/// The result of a collision-relaxed routing pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RelaxedRouting {
    /// Total routing cost over all networks that routed.
    pub total_cost: u64,
    /// Number of cells shared between different networks' wires, counted
    /// with multiplicity.
    pub collisions: usize,
    /// Number of networks that failed to route even without wire
    /// obstacles.
    pub failures: usize,
}

/// Routes every network ignoring inter-wire collisions.
///
/// Instance obstacles still apply. Used only to score placements; the
/// final build runs the sequential pass in the assembly stage.
pub(crate) fn relaxed_route_all(
    netlist: &Netlist,
    library: &Library,
    placement: &Placement,
    endpoints: &IndexMap<NetworkId, NetEndpoints>,
    config: &SynthConfig,
) -> RelaxedRouting {
    let space = match RouteSpace::new(netlist, library, placement, config) {
        Ok(space) => space,
        Err(_) => {
            return RelaxedRouting {
                failures: endpoints.len(),
                ..Default::default()
            }
        }
    };

    let mut result = RelaxedRouting::default();
    let mut claimed: rustc_hash::FxHashMap<Pos, usize> = rustc_hash::FxHashMap::default();
    for (&id, net) in endpoints {
        match route_network(id, net, placement, &space, config) {
            Ok(bus) => {
                // Wire length stands in for cost here; per-leg costs are
                // not preserved across the union of footprints.
                result.total_cost += bus.footprint.len() as u64;
                for &pos in &bus.footprint {
                    *claimed.entry(pos).or_default() += 1;
                }
            }
            Err(_) => result.failures += 1,
        }
    }
    result.collisions = claimed.values().filter(|&&count| count > 1).map(|&c| c - 1).sum();
    debug!(?result, "collision-relaxed routing pass");
    result
}
