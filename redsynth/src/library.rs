//! The tile library.
//!
//! A library maps tile names to pre-built [`Tile`]s: a voxel schematic, the
//! region the tile claims, and annotated port pin positions. Libraries load
//! from a directory of tile folders, each holding `tile.schem` (read
//! through the [`SchematicCodec`] seam) and a `meta.json` annotation file.

use std::path::Path;

use arcstr::ArcStr;
use geometry::prelude::{Dir, Pos, Region};
use indexmap::IndexMap;
use rcir::{Netlist, PinRole, PortDirection, PortName};
use serde::Deserialize;
use tracing::info;
use voxel::Schematic;

use crate::codec::SchematicCodec;
use crate::error::{Error, NetlistIssue, Result};

/// One electrical endpoint of a tile, in the tile's local frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// The pin's block position.
    pub pos: Pos,
    /// The face signal enters or leaves through.
    pub face: Dir,
    /// The pin's role.
    pub role: PinRole,
}

impl Pin {
    /// The position one voxel out of the pin's face, where a wire attaches.
    pub fn mouth(&self) -> Pos {
        self.pos + self.face
    }
}

/// A named pin sequence of a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePort {
    /// The port direction.
    pub direction: PortDirection,
    /// The ordered pins of the sequence.
    pub pins: Vec<Pin>,
}

/// A pre-built schematic tile with annotated ports.
#[derive(Debug, Clone)]
pub struct Tile {
    /// The tile's library key.
    pub name: ArcStr,
    /// The tile's blocks, in the local frame.
    pub schematic: Schematic,
    /// The region the tile claims, off-limits to other instances and to
    /// wires.
    pub occupied: Region,
    /// The tile's ports, by name.
    pub ports: IndexMap<PortName, TilePort>,
}

impl Tile {
    /// Returns the port with the given name.
    pub fn port(&self, name: &str) -> Option<&TilePort> {
        self.ports.get(name)
    }

    /// The number of voxels the tile claims.
    pub fn volume(&self) -> u64 {
        self.occupied.len() as u64
    }
}

/// An immutable collection of tiles, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Library {
    tiles: IndexMap<ArcStr, Tile>,
}

impl Library {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tile, keyed by its name.
    pub fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.name.clone(), tile);
    }

    /// Returns the tile with the given key.
    pub fn get(&self, name: &str) -> Option<&Tile> {
        self.tiles.get(name)
    }

    /// Iterates tiles in insertion order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Loads every tile folder under `dir`.
    ///
    /// Each subfolder must contain `tile.schem` and `meta.json`. Unknown
    /// JSON fields are ignored; missing required fields fail with
    /// [`Error::BadTile`] naming the field. Folders are visited in sorted
    /// order so load results are deterministic.
    pub fn load(dir: &Path, codec: &dyn SchematicCodec) -> Result<Library> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        let mut library = Library::new();
        for tile_dir in entries {
            let tile = load_tile(&tile_dir, codec)?;
            info!(tile = %tile.name, path = %tile_dir.display(), "loaded tile");
            library.insert(tile);
        }
        Ok(library)
    }

    /// Checks a netlist against this library: every instance's library key
    /// is known, every referenced port exists with a matching direction,
    /// and port widths agree with the tile's pin sequences.
    pub fn validate_netlist(&self, netlist: &Netlist) -> Result<()> {
        for (id, instance) in netlist.instances() {
            let tile = self.get(&instance.lib).ok_or_else(|| NetlistIssue::UnknownTile {
                instance: id.clone(),
                lib: instance.lib.clone(),
            })?;
            for (name, port) in &instance.ports {
                let tile_port =
                    tile.port(name)
                        .ok_or_else(|| NetlistIssue::MissingTilePort {
                            instance: id.clone(),
                            port: name.clone(),
                        })?;
                if tile_port.pins.len() != port.width {
                    return Err(Error::BadNetlist(NetlistIssue::PortWidthMismatch {
                        instance: id.clone(),
                        port: name.clone(),
                        netlist_width: port.width,
                        tile_width: tile_port.pins.len(),
                    }));
                }
                if tile_port.direction != port.direction {
                    return Err(Error::BadNetlist(NetlistIssue::PortDirectionMismatch {
                        instance: id.clone(),
                        port: name.clone(),
                    }));
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawMeta {
    name: Option<String>,
    ports: Option<Vec<RawPort>>,
    occupied: Option<Vec<RawRegion>>,
}

#[derive(Deserialize)]
struct RawPort {
    name: Option<String>,
    direction: Option<PortDirection>,
    pins: Option<Vec<RawPin>>,
}

#[derive(Deserialize)]
struct RawPin {
    pos: Option<[i32; 3]>,
    face: Option<Dir>,
    role: Option<PinRole>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawRegion {
    Box {
        min: [i32; 3],
        max: [i32; 3],
    },
    Points {
        points: Vec<[i32; 3]>,
    },
    Compound {
        parts: Vec<RawRegion>,
    },
}

impl From<RawRegion> for Region {
    fn from(value: RawRegion) -> Self {
        match value {
            RawRegion::Box { min, max } => Region::cuboid(min.into(), max.into()),
            RawRegion::Points { points } => points.into_iter().map(Pos::from).collect(),
            RawRegion::Compound { parts } => Region::Compound {
                parts: parts.into_iter().map(Region::from).collect(),
            },
        }
    }
}

fn bad_tile(path: &Path, field: impl Into<String>) -> Error {
    Error::BadTile {
        path: path.to_path_buf(),
        field: field.into(),
    }
}

fn load_tile(tile_dir: &Path, codec: &dyn SchematicCodec) -> Result<Tile> {
    let schematic = codec.read(&tile_dir.join("tile.schem"))?;

    let meta_path = tile_dir.join("meta.json");
    let text = std::fs::read_to_string(&meta_path)?;
    let raw: RawMeta = serde_json::from_str(&text)
        .map_err(|e| bad_tile(&meta_path, format!("malformed JSON: {e}")))?;

    let name = raw.name.ok_or_else(|| bad_tile(&meta_path, "name"))?;
    let occupied_parts = raw
        .occupied
        .ok_or_else(|| bad_tile(&meta_path, "occupied"))?;
    let occupied = Region::Compound {
        parts: occupied_parts.into_iter().map(Region::from).collect(),
    };

    let mut ports = IndexMap::new();
    for (i, raw_port) in raw
        .ports
        .ok_or_else(|| bad_tile(&meta_path, "ports"))?
        .into_iter()
        .enumerate()
    {
        let port_name = raw_port
            .name
            .ok_or_else(|| bad_tile(&meta_path, format!("ports[{i}].name")))?;
        let direction = raw_port
            .direction
            .ok_or_else(|| bad_tile(&meta_path, format!("ports[{i}].direction")))?;
        let raw_pins = raw_port
            .pins
            .ok_or_else(|| bad_tile(&meta_path, format!("ports[{i}].pins")))?;

        let mut pins = Vec::with_capacity(raw_pins.len());
        for (j, raw_pin) in raw_pins.into_iter().enumerate() {
            pins.push(Pin {
                pos: raw_pin
                    .pos
                    .ok_or_else(|| bad_tile(&meta_path, format!("ports[{i}].pins[{j}].pos")))?
                    .into(),
                face: raw_pin
                    .face
                    .ok_or_else(|| bad_tile(&meta_path, format!("ports[{i}].pins[{j}].face")))?,
                role: raw_pin
                    .role
                    .ok_or_else(|| bad_tile(&meta_path, format!("ports[{i}].pins[{j}].role")))?,
            });
        }
        ports.insert(PortName::from(port_name), TilePort { direction, pins });
    }

    Ok(Tile {
        name: ArcStr::from(name),
        schematic,
        occupied,
        ports,
    })
}
