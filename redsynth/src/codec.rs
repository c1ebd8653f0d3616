//! The schematic codec seam.
//!
//! Reading and writing the voxel world's on-disk tile format is an external
//! collaborator's job; the engines only need these two operations. A JSON
//! codec ships here for tests and tooling.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use voxel::Schematic;

use crate::error::{Error, Result};

/// Reads and writes voxel schematics in some on-disk format.
pub trait SchematicCodec {
    /// Reads a schematic from `path`.
    fn read(&self, path: &Path) -> Result<Schematic>;

    /// Writes `schematic` to `path`.
    fn write(&self, schematic: &Schematic, path: &Path) -> Result<()>;
}

/// A [`SchematicCodec`] storing schematics as JSON.
#[derive(Debug, Default, Copy, Clone)]
pub struct JsonCodec;

impl SchematicCodec for JsonCodec {
    fn read(&self, path: &Path) -> Result<Schematic> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::BadTile {
            path: path.to_path_buf(),
            field: format!("schematic: {e}"),
        })
    }

    fn write(&self, schematic: &Schematic, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), schematic)
            .map_err(|e| Error::Internal(format!("failed to encode schematic: {e}")))
    }
}
