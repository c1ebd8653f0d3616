//! Regions: finite sets of voxel positions.
//!
//! A region is one of three tagged variants: an explicit point set, a
//! [`Cuboid`], or a compound union of sub-regions. The intersection test is
//! the hot path during placement; compound regions short-circuit on
//! bounding boxes before recursing.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cuboid::{Cuboid, CuboidIter};
use crate::point::Pos;
use crate::rotation::Rotation;

/// A finite set of voxel positions.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum Region {
    /// An explicit, frozen set of positions.
    Points {
        /// The positions in the region.
        points: BTreeSet<Pos>,
    },
    /// All positions inside an axis-aligned cuboid.
    Cuboid {
        /// The minimum corner, inclusive.
        min: Pos,
        /// The maximum corner, inclusive.
        max: Pos,
    },
    /// The union of several sub-regions.
    Compound {
        /// The sub-regions; they may overlap.
        parts: Vec<Region>,
    },
}

impl Region {
    /// Creates an empty region.
    pub fn empty() -> Region {
        Region::Points {
            points: BTreeSet::new(),
        }
    }

    /// Creates a cuboid region spanning the given corners.
    pub fn cuboid(a: Pos, b: Pos) -> Region {
        let c = Cuboid::new(a, b);
        Region::Cuboid {
            min: Cuboid::min(&c),
            max: Cuboid::max(&c),
        }
    }

    /// Returns `true` if this region contains no positions.
    pub fn is_empty(&self) -> bool {
        match self {
            Region::Points { points } => points.is_empty(),
            Region::Cuboid { .. } => false,
            Region::Compound { parts } => parts.iter().all(Region::is_empty),
        }
    }

    /// Returns `true` if `pos` lies inside this region.
    pub fn contains(&self, pos: Pos) -> bool {
        match self {
            Region::Points { points } => points.contains(&pos),
            Region::Cuboid { min, max } => Cuboid::new(*min, *max).contains(pos),
            Region::Compound { parts } => parts.iter().any(|part| part.contains(pos)),
        }
    }

    /// Returns the bounding box of this region, or [`None`] if it is empty.
    pub fn bbox(&self) -> Option<Cuboid> {
        match self {
            Region::Points { points } => points
                .iter()
                .map(|&p| Cuboid::from_point(p))
                .reduce(|a, b| a.union(&b)),
            Region::Cuboid { min, max } => Some(Cuboid::new(*min, *max)),
            Region::Compound { parts } => parts
                .iter()
                .filter_map(Region::bbox)
                .reduce(|a, b| a.union(&b)),
        }
    }

    /// Returns `true` if the two regions share at least one position.
    pub fn intersects(&self, other: &Region) -> bool {
        match (self.bbox(), other.bbox()) {
            (Some(a), Some(b)) if a.intersects(&b) => {}
            _ => return false,
        }
        match (self, other) {
            (Region::Compound { parts }, _) => parts.iter().any(|part| part.intersects(other)),
            (_, Region::Compound { parts }) => parts.iter().any(|part| self.intersects(part)),
            (Region::Cuboid { min, max }, Region::Cuboid { min: min2, max: max2 }) => {
                Cuboid::new(*min, *max).intersects(&Cuboid::new(*min2, *max2))
            }
            (Region::Points { points }, Region::Points { points: other_points }) => {
                let (small, large) = if points.len() <= other_points.len() {
                    (points, other_points)
                } else {
                    (other_points, points)
                };
                small.iter().any(|p| large.contains(p))
            }
            (Region::Points { points }, Region::Cuboid { min, max })
            | (Region::Cuboid { min, max }, Region::Points { points }) => {
                let cuboid = Cuboid::new(*min, *max);
                points.iter().any(|&p| cuboid.contains(p))
            }
        }
    }

    /// Translates this region by `offset`.
    pub fn translate(&self, offset: Pos) -> Region {
        match self {
            Region::Points { points } => Region::Points {
                points: points.iter().map(|&p| p + offset).collect(),
            },
            Region::Cuboid { min, max } => Region::Cuboid {
                min: *min + offset,
                max: *max + offset,
            },
            Region::Compound { parts } => Region::Compound {
                parts: parts.iter().map(|part| part.translate(offset)).collect(),
            },
        }
    }

    /// Rotates this region about `origin`.
    pub fn rotate_about(&self, origin: Pos, rotation: Rotation) -> Region {
        match self {
            Region::Points { points } => Region::Points {
                points: points
                    .iter()
                    .map(|&p| rotation.apply(p - origin) + origin)
                    .collect(),
            },
            Region::Cuboid { min, max } => {
                let c = Cuboid::new(*min, *max).rotate_about(origin, rotation);
                Region::Cuboid {
                    min: Cuboid::min(&c),
                    max: Cuboid::max(&c),
                }
            }
            Region::Compound { parts } => Region::Compound {
                parts: parts
                    .iter()
                    .map(|part| part.rotate_about(origin, rotation))
                    .collect(),
            },
        }
    }

    /// Iterates the positions in this region.
    ///
    /// Positions of a compound region are yielded once each, even where
    /// sub-regions overlap. Cuboid variants iterate in scanline order.
    pub fn iter(&self) -> RegionIter<'_> {
        let inner = match self {
            Region::Points { points } => Inner::Points(points.iter()),
            Region::Cuboid { min, max } => Inner::Cuboid(Cuboid::new(*min, *max).iter()),
            Region::Compound { parts } => Inner::Compound {
                parts: parts.iter().collect(),
                current: None,
                seen: FxHashSet::default(),
            },
        };
        RegionIter { inner }
    }

    /// Returns the number of distinct positions in this region.
    pub fn len(&self) -> usize {
        match self {
            Region::Points { points } => points.len(),
            Region::Cuboid { min, max } => Cuboid::new(*min, *max).volume() as usize,
            Region::Compound { .. } => self.iter().count(),
        }
    }
}

impl From<Cuboid> for Region {
    fn from(value: Cuboid) -> Self {
        Region::Cuboid {
            min: Cuboid::min(&value),
            max: Cuboid::max(&value),
        }
    }
}

impl FromIterator<Pos> for Region {
    fn from_iter<T: IntoIterator<Item = Pos>>(iter: T) -> Self {
        Region::Points {
            points: iter.into_iter().collect(),
        }
    }
}

enum Inner<'a> {
    Points(std::collections::btree_set::Iter<'a, Pos>),
    Cuboid(CuboidIter),
    Compound {
        parts: Vec<&'a Region>,
        current: Option<Box<RegionIter<'a>>>,
        seen: FxHashSet<Pos>,
    },
}

/// A lazy iterator over the positions of a [`Region`].
pub struct RegionIter<'a> {
    inner: Inner<'a>,
}

impl Iterator for RegionIter<'_> {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        match &mut self.inner {
            Inner::Points(iter) => iter.next().copied(),
            Inner::Cuboid(iter) => iter.next(),
            Inner::Compound {
                parts,
                current,
                seen,
            } => loop {
                if let Some(iter) = current {
                    for pos in iter.by_ref() {
                        if seen.insert(pos) {
                            return Some(pos);
                        }
                    }
                }
                if parts.is_empty() {
                    return None;
                }
                *current = Some(Box::new(parts.remove(0).iter()));
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuboid(min: (i32, i32, i32), max: (i32, i32, i32)) -> Region {
        Region::cuboid(min.into(), max.into())
    }

    #[test]
    fn cuboid_intersection() {
        let a = cuboid((0, 0, 0), (2, 3, 4));
        assert!(a.intersects(&cuboid((2, 3, 4), (3, 4, 5))));
        assert!(!a.intersects(&cuboid((3, 4, 5), (8, 8, 8))));
        assert!(!a.intersects(&cuboid((-2, -2, -2), (-1, -1, -1))));
        assert!(a.intersects(&cuboid((-1, -1, -1), (8, 8, 8))));
    }

    #[test]
    fn compound_intersection_short_circuits_on_bboxes() {
        let composite = Region::Compound {
            parts: vec![cuboid((0, 0, 0), (2, 3, 4)), cuboid((-1, -1, -1), (8, 8, 8))],
        };
        let beyond = Region::Compound {
            parts: vec![cuboid((3, 4, 5), (8, 8, 8)), cuboid((-2, -2, -2), (-1, -1, -1))],
        };
        assert!(composite.intersects(&beyond));
        assert!(!cuboid((0, 0, 0), (2, 3, 4)).intersects(&beyond));
    }

    #[test]
    fn point_set_intersection() {
        let a: Region = [Pos::new(0, 0, 0), Pos::new(1, 1, 1)].into_iter().collect();
        let b: Region = [Pos::new(1, 1, 1)].into_iter().collect();
        let c: Region = [Pos::new(2, 2, 2)].into_iter().collect();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&cuboid((1, 1, 1), (4, 4, 4))));
    }

    #[test]
    fn compound_iteration_deduplicates() {
        let region = Region::Compound {
            parts: vec![cuboid((0, 0, 0), (1, 0, 0)), cuboid((1, 0, 0), (2, 0, 0))],
        };
        assert_eq!(region.iter().count(), 3);
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn tagged_json_representation() {
        let region = Region::cuboid(Pos::zero(), Pos::new(1, 2, 3));
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["type"], "cuboid");
        let decoded: Region = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, region);
    }

    #[test]
    fn transform_preserves_intersection() {
        let a = cuboid((0, 0, 0), (2, 2, 2));
        let b: Region = [Pos::new(2, 2, 2), Pos::new(5, 5, 5)].into_iter().collect();
        let origin = Pos::new(1, 0, -2);
        for rot in Rotation::all() {
            let ta = a.rotate_about(origin, rot).translate(Pos::new(7, -3, 11));
            let tb = b.rotate_about(origin, rot).translate(Pos::new(7, -3, 11));
            assert_eq!(ta.intersects(&tb), a.intersects(&b));
        }
    }
}
