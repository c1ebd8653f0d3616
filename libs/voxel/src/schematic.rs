//! Sparse voxel schematics.

use std::collections::BTreeMap;

use geometry::prelude::{Cuboid, Pos, Region, Transform};
use serde::{Deserialize, Serialize};

use crate::block::Block;

/// Two schematics claimed the same position during a disjoint overlay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("overlapping schematics at {0}")]
pub struct OverlapError(
    /// The first overlapping position.
    pub Pos,
);

/// A sparse mapping from position to block.
///
/// Iteration order is the ordered key order of the underlying map, so all
/// derived artifacts are deterministic. Serialized as a sequence of
/// `(position, block)` pairs, since JSON map keys must be strings.
#[derive(Debug, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schematic {
    #[serde(with = "block_entries")]
    blocks: BTreeMap<Pos, Block>,
}

mod block_entries {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        blocks: &BTreeMap<Pos, Block>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(blocks.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Pos, Block>, D::Error> {
        use serde::Deserialize;
        Ok(Vec::<(Pos, Block)>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}

impl Schematic {
    /// Creates an empty schematic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the schematic holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Places `block` at `pos`, replacing any previous block there.
    pub fn set(&mut self, pos: Pos, block: Block) {
        self.blocks.insert(pos, block);
    }

    /// Returns the block at `pos`, if any.
    pub fn get(&self, pos: Pos) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    /// Iterates `(position, block)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Block)> {
        self.blocks.iter().map(|(&pos, block)| (pos, block))
    }

    /// Returns the set of occupied positions as a region.
    pub fn footprint(&self) -> Region {
        self.blocks.keys().copied().collect()
    }

    /// Returns the bounding box of the occupied positions, or [`None`] for
    /// an empty schematic.
    pub fn bbox(&self) -> Option<Cuboid> {
        let mut keys = self.blocks.keys();
        let &first = keys.next()?;
        let (min, max) = keys.fold((first, first), |(min, max), &pos| {
            (min.min(pos), max.max(pos))
        });
        Some(Cuboid::new(min, max))
    }

    /// Applies a rigid transform to every block, rotating directional
    /// block state along with positions.
    pub fn transformed(&self, transform: &Transform) -> Schematic {
        Schematic {
            blocks: self
                .blocks
                .iter()
                .map(|(&pos, block)| (transform.apply(pos), block.rotated(transform.rotation)))
                .collect(),
        }
    }

    /// Translates every block by `offset`.
    pub fn translated(&self, offset: Pos) -> Schematic {
        self.transformed(&Transform::from_offset(offset))
    }

    /// Overlays `other` onto this schematic.
    ///
    /// Fails with the first overlapping position (in `other`'s key order)
    /// if the two schematics are not disjoint; `self` is unchanged on
    /// failure.
    pub fn merge(&mut self, other: &Schematic) -> Result<(), OverlapError> {
        if let Some((&pos, _)) = other.blocks.iter().find(|(pos, _)| self.blocks.contains_key(pos))
        {
            return Err(OverlapError(pos));
        }
        self.blocks
            .extend(other.blocks.iter().map(|(&pos, block)| (pos, block.clone())));
        Ok(())
    }

    /// Overlays `other` onto this schematic, letting `other` win at
    /// overlapping positions. Only codecs reconstructing a schematic from
    /// disk should need this.
    pub fn force_merge(&mut self, other: &Schematic) {
        self.blocks
            .extend(other.blocks.iter().map(|(&pos, block)| (pos, block.clone())));
    }
}

impl FromIterator<(Pos, Block)> for Schematic {
    fn from_iter<T: IntoIterator<Item = (Pos, Block)>>(iter: T) -> Self {
        Schematic {
            blocks: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::prelude::*;

    fn single(pos: Pos) -> Schematic {
        [(pos, Block::new("minecraft:white_wool"))].into_iter().collect()
    }

    #[test]
    fn disjoint_merge_succeeds() {
        let mut schem = single(Pos::new(0, 0, 0));
        schem.merge(&single(Pos::new(1, 0, 0))).unwrap();
        assert_eq!(schem.len(), 2);
    }

    #[test]
    fn overlapping_merge_fails_and_preserves_self() {
        let mut schem = single(Pos::new(0, 0, 0));
        let err = schem.merge(&single(Pos::new(0, 0, 0))).unwrap_err();
        assert_eq!(err, OverlapError(Pos::new(0, 0, 0)));
        assert_eq!(schem.len(), 1);
    }

    #[test]
    fn merge_is_order_independent_for_disjoint_inputs() {
        let parts = [
            single(Pos::new(0, 0, 0)),
            single(Pos::new(0, 2, 0)),
            single(Pos::new(0, 0, 2)),
        ];
        let mut forward = Schematic::new();
        for part in &parts {
            forward.merge(part).unwrap();
        }
        let mut backward = Schematic::new();
        for part in parts.iter().rev() {
            backward.merge(part).unwrap();
        }
        assert_eq!(forward, backward);
    }

    #[test]
    fn transform_rotates_blocks_and_positions() {
        let schem: Schematic = [(
            Pos::new(2, 0, 0),
            Block::facing("minecraft:repeater", Dir::East).with_attr("facing", "east"),
        )]
        .into_iter()
        .collect();
        let turned = schem.transformed(&Transform::new(Rotation::yaw(1), Pos::zero()));
        let (pos, block) = turned.iter().next().unwrap();
        assert_eq!(pos, Pos::new(0, 0, -2));
        assert_eq!(block.facing, Some(Dir::North));
        assert_eq!(block.attrs["facing"], "north");
    }

    #[test]
    fn json_round_trip() {
        let schem: Schematic = [
            (Pos::new(0, 0, 0), Block::new("minecraft:redstone_wire")),
            (
                Pos::new(1, 0, 0),
                Block::facing("minecraft:repeater", Dir::East).with_attr("delay", "1"),
            ),
        ]
        .into_iter()
        .collect();
        let text = serde_json::to_string(&schem).unwrap();
        let decoded: Schematic = serde_json::from_str(&text).unwrap();
        assert_eq!(schem, decoded);
    }

    #[test]
    fn force_merge_lets_other_win() {
        let mut schem = single(Pos::new(0, 0, 0));
        let other: Schematic = [(Pos::new(0, 0, 0), Block::new("minecraft:glass"))]
            .into_iter()
            .collect();
        schem.force_merge(&other);
        assert_eq!(schem.get(Pos::new(0, 0, 0)).unwrap().kind, "minecraft:glass");
    }
}
