//! The placement engine.
//!
//! A placement assigns every instance a pose: an anchor position and a
//! cardinal facing (a 90-degree yaw of the tile's local frame, with north
//! as the identity). Placements are searched by simulated annealing: the
//! neighbor operator nudges, turns, or swaps instances and always yields a
//! collision-free state; the energy is total Manhattan wire length, with
//! the collision-relaxed router cost mixed in when
//! [`use_routing_energy`](crate::config::SynthConfig::use_routing_energy)
//! is set.

use geometry::prelude::*;
use indexmap::IndexMap;
use itertools::Itertools;
use pathfind::{anneal, AnnealProblem, Annealed};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rcir::{InstanceId, Netlist, NetworkId};
use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::error::{Error, Result};
use crate::library::{Library, Tile};
use crate::route;

/// Weight of one failed network in the routing-aware energy.
const FAILURE_WEIGHT: f64 = 1_000.0;

/// Weight of one wire-wire collision in the routing-aware energy.
const COLLISION_WEIGHT: f64 = 50.0;

/// Overlap penalty for invalid states. The neighbor operator never
/// produces them; this only stabilizes acceptance if that filter is
/// bypassed.
const OVERLAP_PENALTY: f64 = 1e9;

/// The pose of one placed instance.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Pose {
    /// The world position of the tile's local origin.
    pub anchor: Pos,
    /// The cardinal direction the tile faces; north is the tile's own
    /// frame.
    pub facing: Dir,
}

impl Pose {
    /// Creates a pose.
    pub fn new(anchor: Pos, facing: Dir) -> Self {
        Self { anchor, facing }
    }

    /// The rigid transform from the tile's local frame to the world frame.
    pub fn transform(&self) -> Transform {
        let turns = Dir::CARDINAL
            .iter()
            .position(|&d| d == self.facing)
            .expect("pose facings are cardinal") as i32;
        Transform::new(Rotation::yaw(turns), self.anchor)
    }
}

/// A total assignment of poses to instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    poses: IndexMap<InstanceId, Pose>,
}

impl Placement {
    /// Returns the pose of the given instance.
    pub fn get(&self, id: &InstanceId) -> Option<&Pose> {
        self.poses.get(id)
    }

    /// Sets the pose of an instance.
    pub fn set(&mut self, id: InstanceId, pose: Pose) {
        self.poses.insert(id, pose);
    }

    /// Removes an instance's pose.
    pub fn remove(&mut self, id: &InstanceId) {
        self.poses.shift_remove(id);
    }

    /// Iterates `(instance, pose)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &Pose)> {
        self.poses.iter()
    }

    /// Returns the number of placed instances.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Returns `true` if no instance is placed.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// A network's pin endpoints in tile-local frames, resolved once so the
/// energy loop does no map lookups.
#[derive(Debug, Clone)]
pub(crate) struct NetEndpoints {
    pub driver: LocalPin,
    pub sinks: Vec<LocalPin>,
}

/// A pin's instance plus its local-frame position and face.
#[derive(Debug, Clone)]
pub(crate) struct LocalPin {
    pub instance: InstanceId,
    pub pos: Pos,
    pub face: Dir,
}

impl LocalPin {
    /// The world-frame mouth cell: one voxel out of the pin's face.
    pub fn mouth(&self, placement: &Placement) -> Result<Pos> {
        let pose = placement.get(&self.instance).ok_or_else(|| {
            Error::Internal(format!("instance {} is not placed", self.instance))
        })?;
        let t = pose.transform();
        Ok(t.apply(self.pos) + t.apply_dir(self.face))
    }
}

/// Resolves every network's endpoint pins against the library.
pub(crate) fn resolve_endpoints(
    netlist: &Netlist,
    library: &Library,
) -> Result<IndexMap<NetworkId, NetEndpoints>> {
    let resolve = |pin: &rcir::PinRef| -> Result<LocalPin> {
        let instance = netlist
            .instance(&pin.instance)
            .ok_or_else(|| Error::Internal(format!("unresolved instance in {pin}")))?;
        let tile = library
            .get(&instance.lib)
            .ok_or_else(|| Error::Internal(format!("unresolved tile for {pin}")))?;
        let tile_pin = tile
            .port(&pin.port)
            .and_then(|port| port.pins.get(pin.index))
            .ok_or_else(|| Error::Internal(format!("unresolved pin {pin}")))?;
        Ok(LocalPin {
            instance: pin.instance.clone(),
            pos: tile_pin.pos,
            face: tile_pin.face,
        })
    };

    netlist
        .networks()
        .map(|(id, network)| {
            Ok((
                id,
                NetEndpoints {
                    driver: resolve(network.driver())?,
                    sinks: network.sinks().iter().map(&resolve).collect::<Result<_>>()?,
                },
            ))
        })
        .collect()
}

/// Returns the world-frame occupied region of one placed instance.
pub fn instance_region(
    netlist: &Netlist,
    library: &Library,
    placement: &Placement,
    id: &InstanceId,
) -> Result<Region> {
    let instance = netlist
        .instance(id)
        .ok_or_else(|| Error::Internal(format!("unknown instance {id}")))?;
    let tile = library
        .get(&instance.lib)
        .ok_or_else(|| Error::Internal(format!("unknown tile {}", instance.lib)))?;
    let pose = placement
        .get(id)
        .ok_or_else(|| Error::Internal(format!("instance {id} is not placed")))?;
    Ok(tile.occupied.transformed(&pose.transform()))
}

/// Returns every placed instance's occupied region.
pub fn placement_regions(
    netlist: &Netlist,
    library: &Library,
    placement: &Placement,
) -> Result<Vec<(InstanceId, Region)>> {
    placement
        .iter()
        .map(|(id, _)| Ok((id.clone(), instance_region(netlist, library, placement, id)?)))
        .collect()
}

/// Returns `true` if no two regions intersect.
pub fn regions_disjoint(regions: &[(InstanceId, Region)]) -> bool {
    !regions
        .iter()
        .tuple_combinations()
        .any(|((_, a), (_, b))| a.intersects(b))
}

/// Returns `true` if no already-placed pin's mouth cell lies inside any of
/// the given regions. Buried mouths would force wires into occupied
/// voxels, so they invalidate a placement outright.
fn mouths_clear(
    endpoints: &IndexMap<NetworkId, NetEndpoints>,
    placement: &Placement,
    regions: &[Region],
) -> bool {
    endpoints.values().all(|net| {
        std::iter::once(&net.driver)
            .chain(net.sinks.iter())
            .all(|pin| match pin.mouth(placement) {
                Ok(mouth) => regions.iter().all(|region| !region.contains(mouth)),
                // The pin's instance is not placed yet; nothing to check.
                Err(_) => true,
            })
    })
}

struct PlacementProblem<'a> {
    tiles: &'a IndexMap<InstanceId, &'a Tile>,
    endpoints: &'a IndexMap<NetworkId, NetEndpoints>,
    netlist: &'a Netlist,
    library: &'a Library,
    config: &'a SynthConfig,
    cube: Cuboid,
    initial: Placement,
}

impl PlacementProblem<'_> {
    fn region_of(&self, id: &InstanceId, pose: &Pose) -> Region {
        self.tiles[id].occupied.transformed(&pose.transform())
    }

    fn fits_cube(&self, region: &Region) -> bool {
        region.bbox().is_some_and(|bbox| {
            self.cube.contains(Cuboid::min(&bbox)) && self.cube.contains(Cuboid::max(&bbox))
        })
    }

    fn is_valid(&self, placement: &Placement) -> bool {
        let regions: Vec<Region> = placement
            .iter()
            .map(|(id, pose)| self.region_of(id, pose))
            .collect();
        regions.iter().all(|region| self.fits_cube(region))
            && !regions
                .iter()
                .tuple_combinations()
                .any(|(a, b)| a.intersects(b))
            && mouths_clear(self.endpoints, placement, &regions)
    }

    fn wire_length(&self, placement: &Placement) -> Result<u64> {
        let mut total = 0u64;
        for net in self.endpoints.values() {
            let driver = net.driver.mouth(placement)?;
            for sink in &net.sinks {
                total += u64::from(driver.distance(sink.mouth(placement)?));
            }
        }
        Ok(total)
    }
}

impl AnnealProblem for PlacementProblem<'_> {
    type State = Placement;

    fn initial(&self, _rng: &mut StdRng) -> Placement {
        self.initial.clone()
    }

    fn neighbor(&self, placement: &Placement, rng: &mut StdRng) -> Placement {
        let ids: Vec<InstanceId> = placement.iter().map(|(id, _)| id.clone()).collect();
        for _ in 0..self.config.neighbor_retries {
            let mut candidate = placement.clone();
            match rng.gen_range(0..3u8) {
                // Nudge one instance a single voxel.
                0 => {
                    let id = &ids[rng.gen_range(0..ids.len())];
                    let dir = Dir::ALL[rng.gen_range(0..Dir::ALL.len())];
                    let pose = candidate.poses[id];
                    candidate.set(id.clone(), Pose::new(pose.anchor + dir, pose.facing));
                }
                // Turn one instance a quarter turn about +Y.
                1 => {
                    let id = &ids[rng.gen_range(0..ids.len())];
                    let pose = candidate.poses[id];
                    let turned = Dir::CARDINAL[(Dir::CARDINAL
                        .iter()
                        .position(|&d| d == pose.facing)
                        .expect("pose facings are cardinal")
                        + 1)
                        % 4];
                    candidate.set(id.clone(), Pose::new(pose.anchor, turned));
                }
                // Swap the poses of two instances.
                _ => {
                    if ids.len() < 2 {
                        continue;
                    }
                    let a = rng.gen_range(0..ids.len());
                    let mut b = rng.gen_range(0..ids.len() - 1);
                    if b >= a {
                        b += 1;
                    }
                    let pose_a = candidate.poses[&ids[a]];
                    let pose_b = candidate.poses[&ids[b]];
                    candidate.set(ids[a].clone(), pose_b);
                    candidate.set(ids[b].clone(), pose_a);
                }
            }
            if self.is_valid(&candidate) {
                return candidate;
            }
        }
        placement.clone()
    }

    fn energy(&self, placement: &Placement) -> f64 {
        let mut energy = match self.wire_length(placement) {
            Ok(length) => length as f64,
            Err(_) => return OVERLAP_PENALTY,
        };
        if self.config.use_routing_energy {
            let relaxed = route::relaxed_route_all(
                self.netlist,
                self.library,
                placement,
                self.endpoints,
                self.config,
            );
            energy += relaxed.total_cost as f64
                + FAILURE_WEIGHT * relaxed.failures as f64
                + COLLISION_WEIGHT * relaxed.collisions as f64;
        }
        if !self.is_valid(placement) {
            energy += OVERLAP_PENALTY;
        }
        energy
    }
}

fn random_pose(rng: &mut StdRng, bound: i32) -> Pose {
    Pose::new(
        Pos::new(
            rng.gen_range(0..bound),
            rng.gen_range(0..bound),
            rng.gen_range(0..bound),
        ),
        Dir::CARDINAL[rng.gen_range(0..4)],
    )
}

/// Produces a random collision-free placement, placing instances in
/// descending occupied-volume order and rejection-sampling poses inside
/// the bounding cube.
fn random_placement(
    order: &[InstanceId],
    tiles: &IndexMap<InstanceId, &Tile>,
    endpoints: &IndexMap<NetworkId, NetEndpoints>,
    cube: Cuboid,
    config: &SynthConfig,
    rng: &mut StdRng,
) -> Result<Placement> {
    let mut placement = Placement::default();
    let mut regions: Vec<Region> = Vec::with_capacity(order.len());

    for id in order {
        let tile = tiles[id];
        let mut placed = false;
        for _ in 0..config.max_place_attempts {
            let pose = random_pose(rng, config.bound);
            let region = tile.occupied.transformed(&pose.transform());
            let fits = region
                .bbox()
                .is_some_and(|bbox| cube.contains(Cuboid::min(&bbox)) && cube.contains(Cuboid::max(&bbox)));
            if !fits || regions.iter().any(|other| other.intersects(&region)) {
                continue;
            }
            placement.set(id.clone(), pose);
            regions.push(region);
            if !mouths_clear(endpoints, &placement, &regions) {
                placement.remove(id);
                regions.pop();
                continue;
            }
            placed = true;
            break;
        }
        if !placed {
            return Err(Error::Infeasible(id.clone()));
        }
    }

    Ok(placement)
}

/// Searches for a low-energy placement of every instance.
///
/// Runs `config.workers` independent annealing searches over consecutive
/// seeds and returns the best placement found. Fails with
/// [`Error::Infeasible`] only if no worker can seed a valid initial state.
pub fn place(netlist: &Netlist, library: &Library, config: &SynthConfig) -> Result<Placement> {
    let endpoints = resolve_endpoints(netlist, library)?;

    let mut tiles: IndexMap<InstanceId, &Tile> = IndexMap::new();
    for (id, instance) in netlist.instances() {
        let tile = library
            .get(&instance.lib)
            .ok_or_else(|| Error::Internal(format!("unknown tile {}", instance.lib)))?;
        tiles.insert(id.clone(), tile);
    }

    let mut order: Vec<InstanceId> = tiles.keys().cloned().collect();
    order.sort_by_key(|id| std::cmp::Reverse(tiles[id].volume()));

    let cube = Cuboid::new(
        Pos::zero(),
        Pos::new(config.bound - 1, config.bound - 1, config.bound - 1),
    );

    let mut best: Option<Annealed<Placement>> = None;
    let mut last_error = None;
    for worker in 0..config.workers.max(1) {
        let seed = config.seed.wrapping_add(worker);
        let mut rng = StdRng::seed_from_u64(seed);
        let initial = match random_placement(&order, &tiles, &endpoints, cube, config, &mut rng) {
            Ok(placement) => placement,
            Err(err) => {
                debug!(seed, "worker could not seed a placement");
                last_error = Some(err);
                continue;
            }
        };
        let problem = PlacementProblem {
            tiles: &tiles,
            endpoints: &endpoints,
            netlist,
            library,
            config,
            cube,
            initial,
        };
        let result = anneal(&problem, &config.schedule(), seed);
        debug!(seed, energy = result.energy, "placement worker finished");
        if best.as_ref().map_or(true, |b| result.energy < b.energy) {
            best = Some(result);
        }
    }

    match best {
        Some(result) => {
            info!(energy = result.energy, seed = result.seed, "placement selected");
            Ok(result.state)
        }
        None => Err(last_error.unwrap_or_else(|| Error::Internal("no placement workers ran".into()))),
    }
}
