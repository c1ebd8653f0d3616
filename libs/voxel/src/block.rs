//! Block states.

use std::collections::BTreeMap;

use arcstr::ArcStr;
use geometry::prelude::{Dir, Rotation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Attribute names whose values are direction words and must be rotated
/// with the block, keyed by block kind. Kinds not listed here rotate only
/// their `facing` field.
static DIRECTIONAL_ATTRS: Lazy<BTreeMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        BTreeMap::from([
            ("minecraft:repeater", &["facing"] as &[&str]),
            ("minecraft:comparator", &["facing"]),
            ("minecraft:observer", &["facing"]),
            ("minecraft:piston", &["facing"]),
            ("minecraft:sticky_piston", &["facing"]),
            ("minecraft:lever", &["facing"]),
            ("minecraft:oak_wall_sign", &["facing"]),
        ])
    });

/// A block state: a kind identifier, an optional facing, and a key/value
/// attribute map.
///
/// Equality is structural; blocks are plain values.
#[derive(
    Debug, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Block {
    /// The block kind, e.g. `minecraft:redstone_wire`.
    pub kind: ArcStr,
    /// The block's facing direction, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<Dir>,
    /// Additional key/value attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<ArcStr, ArcStr>,
}

impl Block {
    /// Creates a block with no facing and no attributes.
    pub fn new(kind: impl Into<ArcStr>) -> Self {
        Self {
            kind: kind.into(),
            facing: None,
            attrs: BTreeMap::new(),
        }
    }

    /// Creates a block facing `dir`.
    pub fn facing(kind: impl Into<ArcStr>, dir: Dir) -> Self {
        Self {
            kind: kind.into(),
            facing: Some(dir),
            attrs: BTreeMap::new(),
        }
    }

    /// Adds an attribute, builder-style.
    pub fn with_attr(mut self, key: impl Into<ArcStr>, value: impl Into<ArcStr>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Returns this block with its directional state rotated.
    ///
    /// The `facing` field always rotates; attribute values rotate when the
    /// block kind declares them directional (table-driven). A repeater
    /// facing east rotated one quarter turn about +Y faces north.
    pub fn rotated(&self, rotation: Rotation) -> Block {
        let directional = DIRECTIONAL_ATTRS
            .get(self.kind.as_str())
            .copied()
            .unwrap_or_default();
        let attrs = self
            .attrs
            .iter()
            .map(|(key, value)| {
                let rotated = directional
                    .contains(&key.as_str())
                    .then(|| value.parse::<Dir>().ok())
                    .flatten()
                    .map(|dir| ArcStr::from(rotation.rotate_dir(dir).to_string()));
                (key.clone(), rotated.unwrap_or_else(|| value.clone()))
            })
            .collect();
        Block {
            kind: self.kind.clone(),
            facing: self.facing.map(|dir| rotation.rotate_dir(dir)),
            attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::prelude::*;

    #[test]
    fn repeater_facing_rotates_in_attrs_and_field() {
        let repeater = Block::facing("minecraft:repeater", Dir::East)
            .with_attr("facing", "east")
            .with_attr("delay", "1");
        let rotated = repeater.rotated(Rotation::yaw(1));
        assert_eq!(rotated.facing, Some(Dir::North));
        assert_eq!(rotated.attrs["facing"], "north");
        assert_eq!(rotated.attrs["delay"], "1");
    }

    #[test]
    fn non_directional_kind_keeps_attrs() {
        let wool = Block::new("minecraft:gray_wool").with_attr("facing", "east");
        let rotated = wool.rotated(Rotation::yaw(1));
        assert_eq!(rotated.attrs["facing"], "east");
    }

    #[test]
    fn equality_is_structural() {
        let a = Block::facing("minecraft:repeater", Dir::East).with_attr("delay", "1");
        let b = Block::facing("minecraft:repeater", Dir::East).with_attr("delay", "1");
        assert_eq!(a, b);
    }
}
