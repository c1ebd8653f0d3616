//! End-to-end synthesis scenarios on a miniature tile library.

use geometry::prelude::*;
use indexmap::IndexMap;
use rcir::{
    Instance, Netlist, NetlistBuilder, PinRef, PinRole, PortDirection, PortName,
};
use redsynth::place::{placement_regions, regions_disjoint, Placement, Pose};
use redsynth::{
    assemble, synthesize, Error, Library, OnUnroutable, Pin, SynthConfig, Tile, TilePort,
};
use voxel::{Block, Schematic};

/// A 1-voxel tile at the origin with at most one single-pin port.
fn unit_tile(name: &str, port: Option<(&str, PortDirection, PinRole, Dir)>) -> Tile {
    let schematic: Schematic = [(Pos::zero(), Block::new("minecraft:white_wool"))]
        .into_iter()
        .collect();
    let mut ports = IndexMap::new();
    if let Some((port_name, direction, role, face)) = port {
        ports.insert(
            PortName::from(port_name),
            TilePort {
                direction,
                pins: vec![Pin {
                    pos: Pos::zero(),
                    face,
                    role,
                }],
            },
        );
    }
    Tile {
        name: name.into(),
        schematic,
        occupied: Region::cuboid(Pos::zero(), Pos::zero()),
        ports,
    }
}

fn library() -> Library {
    let mut library = Library::new();
    library.insert(unit_tile(
        "src",
        Some(("out", PortDirection::Out, PinRole::Output, Dir::East)),
    ));
    library.insert(unit_tile(
        "snk",
        Some(("in", PortDirection::In, PinRole::Input, Dir::West)),
    ));
    library.insert(unit_tile("blk", None));
    library
}

fn src_instance() -> Instance {
    Instance::new("src").with_port("out", PortDirection::Out, 1)
}

fn snk_instance() -> Instance {
    Instance::new("snk").with_port("in", PortDirection::In, 1)
}

/// One driver, one sink, one network.
fn pair_netlist() -> Netlist {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("a", src_instance());
    builder.add_instance("b", snk_instance());
    builder.add_network(PinRef::new("a", "out", 0), vec![PinRef::new("b", "in", 0)]);
    builder.build().unwrap()
}

fn exact_router_config() -> SynthConfig {
    SynthConfig {
        turn_penalty: 0,
        ..SynthConfig::default()
    }
}

#[test]
fn single_net_synthesizes_compactly() {
    let netlist = pair_netlist();
    let config = SynthConfig {
        seed: 0,
        bound: 8,
        max_steps: 2_000,
        ..SynthConfig::default()
    };
    let assembly = synthesize(&netlist, &library(), &config).unwrap();

    assert_eq!(assembly.busses.len(), 1);
    let bus = assembly.busses.values().next().unwrap();
    assert!(
        bus.footprint.len() <= 4,
        "annealing should pull the pair close, got bus of {} cells",
        bus.footprint.len()
    );

    // Placed occupied regions are pairwise disjoint.
    let regions = placement_regions(&netlist, &library(), &assembly.placement).unwrap();
    assert!(regions_disjoint(&regions));

    // Every bus cell stays clear of every occupied region.
    for &cell in &bus.footprint {
        assert!(regions.iter().all(|(_, region)| !region.contains(cell)));
    }
}

#[test]
fn one_voxel_cube_is_infeasible() {
    let netlist = pair_netlist();
    let config = SynthConfig {
        bound: 1,
        ..SynthConfig::default()
    };
    match synthesize(&netlist, &library(), &config) {
        Err(Error::Infeasible(_)) => {}
        other => panic!("expected Infeasible, got {other:?}"),
    }
}

/// Fixed placements for router-level scenarios.
fn fixed_placement(poses: &[(&str, Pos)]) -> Placement {
    let mut placement = Placement::default();
    for &(id, anchor) in poses {
        placement.set(id.into(), Pose::new(anchor, Dir::North));
    }
    placement
}

#[test]
fn two_sink_net_routes_as_chained_legs() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("d", src_instance());
    builder.add_instance("s1", snk_instance());
    builder.add_instance("s2", snk_instance());
    builder.add_network(
        PinRef::new("d", "out", 0),
        vec![PinRef::new("s1", "in", 0), PinRef::new("s2", "in", 0)],
    );
    let netlist = builder.build().unwrap();

    // Driver mouth (1,0,0); sink mouths (3,0,0) and (3,0,3) in an L.
    let placement = fixed_placement(&[
        ("d", Pos::new(0, 0, 0)),
        ("s1", Pos::new(4, 0, 0)),
        ("s2", Pos::new(4, 0, 3)),
    ]);

    let busses =
        assemble::route_all(&netlist, &library(), &placement, &exact_router_config()).unwrap();
    let bus = busses.values().next().unwrap();

    // Leg 1 covers the 2-cell run to the nearest sink, leg 2 the 3-cell
    // run onward; the shared root cell is counted once.
    assert_eq!(bus.footprint.len(), 2 + 3 + 1);
    assert!(bus.footprint.contains(&Pos::new(1, 0, 0)));
    assert!(bus.footprint.contains(&Pos::new(3, 0, 0)));
    assert!(bus.footprint.contains(&Pos::new(3, 0, 3)));
}

#[test]
fn obstacle_forces_a_two_cell_detour() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("d", src_instance());
    builder.add_instance("s", snk_instance());
    builder.add_instance("wall", Instance::new("blk"));
    builder.add_network(PinRef::new("d", "out", 0), vec![PinRef::new("s", "in", 0)]);
    let netlist = builder.build().unwrap();

    // Mouths at (1,0,0) and (6,0,0), five apart; the blocker sits on the
    // straight line between them.
    let placement = fixed_placement(&[
        ("d", Pos::new(0, 0, 0)),
        ("s", Pos::new(7, 0, 0)),
        ("wall", Pos::new(4, 0, 0)),
    ]);

    let busses =
        assemble::route_all(&netlist, &library(), &placement, &exact_router_config()).unwrap();
    let bus = busses.values().next().unwrap();
    assert_eq!(bus.footprint.len(), 5 + 2 + 1);
    assert!(!bus.footprint.contains(&Pos::new(4, 0, 0)));
}

fn enclosed_sink_netlist_and_placement() -> (Netlist, Placement) {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("d", src_instance());
    builder.add_instance("s", snk_instance());
    for i in 0..5 {
        builder.add_instance(format!("blk{i}"), Instance::new("blk"));
    }
    builder.add_network(PinRef::new("d", "out", 0), vec![PinRef::new("s", "in", 0)]);
    let netlist = builder.build().unwrap();

    // The sink mouth at (9,0,10) is walled in on every open face.
    let placement = fixed_placement(&[
        ("d", Pos::new(0, 0, 0)),
        ("s", Pos::new(10, 0, 10)),
        ("blk0", Pos::new(8, 0, 10)),
        ("blk1", Pos::new(9, 0, 9)),
        ("blk2", Pos::new(9, 0, 11)),
        ("blk3", Pos::new(9, 1, 10)),
        ("blk4", Pos::new(9, -1, 10)),
    ]);
    (netlist, placement)
}

#[test]
fn enclosed_sink_aborts_when_configured() {
    let (netlist, placement) = enclosed_sink_netlist_and_placement();
    let config = SynthConfig {
        on_unroutable: OnUnroutable::Abort,
        ..exact_router_config()
    };
    match assemble::route_all(&netlist, &library(), &placement, &config) {
        Err(Error::Unroutable(_)) => {}
        other => panic!("expected Unroutable, got {other:?}"),
    }
}

#[test]
fn enclosed_sink_is_skipped_when_configured() {
    let (netlist, placement) = enclosed_sink_netlist_and_placement();
    let config = SynthConfig {
        on_unroutable: OnUnroutable::Skip,
        ..exact_router_config()
    };
    let busses = assemble::route_all(&netlist, &library(), &placement, &config).unwrap();
    assert!(busses.is_empty());
}

#[test]
fn routing_over_budget_surfaces_as_unroutable() {
    let netlist = pair_netlist();
    let placement = fixed_placement(&[("a", Pos::new(0, 0, 0)), ("b", Pos::new(7, 0, 0))]);
    let config = SynthConfig {
        max_explored: 1,
        on_unroutable: OnUnroutable::Abort,
        ..exact_router_config()
    };
    match assemble::route_all(&netlist, &library(), &placement, &config) {
        Err(Error::Unroutable(_)) => {}
        other => panic!("expected Unroutable, got {other:?}"),
    }
}

#[test]
fn bus_endpoints_match_pin_mouths() {
    let netlist = pair_netlist();
    let placement = fixed_placement(&[("a", Pos::new(0, 0, 0)), ("b", Pos::new(6, 0, 2))]);
    let busses =
        assemble::route_all(&netlist, &library(), &placement, &exact_router_config()).unwrap();
    let bus = busses.values().next().unwrap();
    // Driver mouth east of "a"; sink mouth west of "b".
    assert!(bus.footprint.contains(&Pos::new(1, 0, 0)));
    assert!(bus.footprint.contains(&Pos::new(5, 0, 2)));
}

#[test]
fn synthesis_is_deterministic_for_a_fixed_seed() {
    let netlist = pair_netlist();
    let config = SynthConfig {
        seed: 7,
        bound: 10,
        max_steps: 600,
        ..SynthConfig::default()
    };
    let first = synthesize(&netlist, &library(), &config).unwrap();
    let second = synthesize(&netlist, &library(), &config).unwrap();
    assert_eq!(first.schematic, second.schematic);
    assert_eq!(first.placement, second.placement);
}

#[test]
fn unknown_tile_fails_validation() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("a", Instance::new("mystery").with_port("out", PortDirection::Out, 1));
    builder.add_instance("b", snk_instance());
    builder.add_network(PinRef::new("a", "out", 0), vec![PinRef::new("b", "in", 0)]);
    let netlist = builder.build().unwrap();

    match synthesize(&netlist, &library(), &SynthConfig::default()) {
        Err(Error::BadNetlist(_)) => {}
        other => panic!("expected BadNetlist, got {other:?}"),
    }
}
