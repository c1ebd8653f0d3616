use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser as ClapParser, Subcommand};
use geometry::prelude::*;
use indexmap::IndexMap;
use rcir::{Instance, NetlistBuilder, PinRef, PinRole, PortDirection, PortName};
use redsynth::place::{Placement, Pose};
use redsynth::render::render_layers;
use redsynth::{
    assemble, synthesize, JsonCodec, Library, OnUnroutable, Pin, SchematicCodec, SynthConfig,
    Tile, TilePort,
};

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

/// Exit codes: 0 success, 2 bad input, 3 infeasible placement,
/// 4 unroutable, 1 internal.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<redsynth::Error>() {
        Some(redsynth::Error::BadNetlist(_)) | Some(redsynth::Error::BadTile { .. }) => 2,
        Some(redsynth::Error::Infeasible(_)) => 3,
        Some(redsynth::Error::Unroutable(_)) | Some(redsynth::Error::NoPath { .. }) => 4,
        _ => 1,
    }
}

#[derive(ClapParser)]
#[command(version, about = "Synthesize voxel circuits from flat netlists")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Place and route a netlist, writing the assembled schematic.
    Synthesize {
        /// The netlist JSON file.
        netlist: PathBuf,
        /// The tile library directory.
        #[arg(short, long)]
        library: PathBuf,
        /// Where to write the assembled schematic.
        #[arg(short, long)]
        out: PathBuf,
        #[command(flatten)]
        knobs: Knobs,
    },
    /// Print an ASCII layer-by-layer view of a schematic.
    Display {
        /// The schematic file to render.
        schematic: PathBuf,
    },
    /// Route a single wire between two anchors in an empty world.
    DebugBussing {
        /// The driver tile anchor, as `x,y,z`.
        #[arg(long, value_parser = parse_pos)]
        from: Pos,
        /// The sink tile anchor, as `x,y,z`.
        #[arg(long, value_parser = parse_pos)]
        to: Pos,
        #[command(flatten)]
        knobs: Knobs,
    },
}

#[derive(clap::Args)]
struct Knobs {
    /// Seed for all randomized search.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Placement annealing starting temperature.
    #[arg(long, default_value_t = 8.0)]
    temperature: f64,
    /// Placement annealing cooling factor.
    #[arg(long, default_value_t = 0.995)]
    alpha: f64,
    /// Placement annealing proposals per run.
    #[arg(long, default_value_t = 2_000)]
    steps: usize,
    /// Policy for networks the router gives up on.
    #[arg(long, default_value = "abort")]
    on_unroutable: OnUnroutable,
}

impl Knobs {
    fn config(&self) -> SynthConfig {
        SynthConfig {
            seed: self.seed,
            initial_temperature: self.temperature,
            alpha: self.alpha,
            max_steps: self.steps,
            on_unroutable: self.on_unroutable,
            ..SynthConfig::default()
        }
    }
}

fn parse_pos(text: &str) -> Result<Pos, String> {
    let parts: Vec<i32> = text
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid position {text:?}: {e}"))?;
    match parts.as_slice() {
        &[x, y, z] => Ok(Pos::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {text:?}")),
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Synthesize {
            netlist,
            library,
            out,
            knobs,
        } => {
            let text = std::fs::read_to_string(&netlist)
                .with_context(|| format!("failed to read {}", netlist.display()))?;
            let netlist = rcir::json::from_json(&text).context("failed to parse netlist")?;
            let library = Library::load(&library, &JsonCodec).context("failed to load library")?;

            let assembly = synthesize(&netlist, &library, &knobs.config())?;
            JsonCodec.write(&assembly.schematic, &out)?;
            println!(
                "placed {} instances, routed {} networks, wrote {}",
                assembly.placement.len(),
                assembly.busses.len(),
                out.display()
            );
            Ok(())
        }
        Command::Display { schematic } => {
            let schematic = JsonCodec.read(&schematic)?;
            print!("{}", render_layers(&schematic));
            Ok(())
        }
        Command::DebugBussing { from, to, knobs } => {
            let (netlist, library, placement) = wire_probe(from, to);
            let busses = assemble::route_all(&netlist, &library, &placement, &knobs.config())?;
            for (id, bus) in &busses {
                println!("{id}: {} cells", bus.footprint.len());
                for pos in &bus.footprint {
                    println!("  {pos}");
                }
                print!("{}", render_layers(&bus.schematic));
            }
            Ok(())
        }
    }
}

/// A throwaway driver/sink pair for `debug-bussing`.
fn wire_probe(from: Pos, to: Pos) -> (rcir::Netlist, Library, Placement) {
    let probe_tile = |name: &str, port: &str, direction, role, face| Tile {
        name: name.into(),
        schematic: voxel::Schematic::new(),
        occupied: Region::cuboid(Pos::zero(), Pos::zero()),
        ports: IndexMap::from([(
            PortName::from(port),
            TilePort {
                direction,
                pins: vec![Pin {
                    pos: Pos::zero(),
                    face,
                    role,
                }],
            },
        )]),
    };

    let mut library = Library::new();
    library.insert(probe_tile(
        "probe_src",
        "out",
        PortDirection::Out,
        PinRole::Output,
        Dir::East,
    ));
    library.insert(probe_tile(
        "probe_snk",
        "in",
        PortDirection::In,
        PinRole::Input,
        Dir::West,
    ));

    let mut builder = NetlistBuilder::new();
    builder.add_instance(
        "from",
        Instance::new("probe_src").with_port("out", PortDirection::Out, 1),
    );
    builder.add_instance(
        "to",
        Instance::new("probe_snk").with_port("in", PortDirection::In, 1),
    );
    builder.add_network(
        PinRef::new("from", "out", 0),
        vec![PinRef::new("to", "in", 0)],
    );
    let netlist = builder.build().expect("probe netlist is well formed");

    let mut placement = Placement::default();
    placement.set("from".into(), Pose::new(from, Dir::North));
    placement.set("to".into(), Pose::new(to, Dir::North));

    (netlist, library, placement)
}
