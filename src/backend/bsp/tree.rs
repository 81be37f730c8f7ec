//! Binary space partition behind the reference backend's Boolean engine.
//!
//! The partition is a pure spatial classifier: it keeps facet planes
//! only, never boundary polygons, and a missing child marks a leaf cell
//! (unbounded ahead of the splitter, solid interior behind it). Every
//! Boolean reduces to one primitive — clipping a boundary to the exterior
//! of the other operand — with intersection and difference taken as
//! complements of a union.

use crate::backend::bsp::plane::Plane;
use crate::backend::bsp::polygon::Polygon;

/// Which operand of a Boolean the clipped boundary belongs to.
///
/// Where the two boundaries coincide, the first operand keeps its facets
/// and the second yields, so a shared face survives exactly once in the
/// combined result.
#[derive(Clone, Copy, Debug)]
pub enum Operand {
    First,
    Second,
}

/// One cell subdivision of the partition.
#[derive(Clone, Debug)]
pub struct BspTree {
    splitter: Plane,
    /// Subdivision ahead of the splitter (its normal side); `None` is an
    /// unbounded outside cell.
    outside: Option<Box<BspTree>>,
    /// Subdivision behind the splitter; `None` is a solid interior cell.
    inside: Option<Box<BspTree>>,
}

impl BspTree {
    /// Partition space by the facet planes of a closed polygon soup.
    /// `None` when the soup is empty.
    pub fn build(polygons: &[Polygon]) -> Option<Self> {
        let (seed, rest) = polygons.split_first()?;
        let splitter = seed.plane.clone();

        let mut ahead = Vec::new();
        let mut behind = Vec::new();
        for poly in rest {
            // Facets coplanar with the splitter refine no further cells.
            let (_, _, front, back) = splitter.split_polygon(poly);
            ahead.extend(front);
            behind.extend(back);
        }

        Some(BspTree {
            splitter,
            outside: Self::build(&ahead).map(Box::new),
            inside: Self::build(&behind).map(Box::new),
        })
    }

    /// Clip a boundary against this partition, keeping what reaches an
    /// outside cell and swallowing what reaches the interior.
    ///
    /// Facets that lie on a splitter are settled by ownership: the first
    /// operand's are sent ahead (they face out of the combined solid),
    /// the second operand's behind, where the rest of the partition
    /// decides whether the region is already covered. Facing against the
    /// splitter routes the opposite way.
    pub fn clip_to_exterior(&self, polygons: Vec<Polygon>, operand: Operand) -> Vec<Polygon> {
        let mut ahead = Vec::new();
        let mut behind = Vec::new();

        for poly in &polygons {
            let (with_splitter, against_splitter, front, back) =
                self.splitter.split_polygon(poly);
            match operand {
                Operand::First => {
                    ahead.extend(with_splitter);
                    behind.extend(against_splitter);
                },
                Operand::Second => {
                    behind.extend(with_splitter);
                    ahead.extend(against_splitter);
                },
            }
            ahead.extend(front);
            behind.extend(back);
        }

        let mut survivors = match &self.outside {
            Some(partition) => partition.clip_to_exterior(ahead, operand),
            None => ahead,
        };
        if let Some(partition) = &self.inside {
            survivors.extend(partition.clip_to_exterior(behind, operand));
        }
        survivors
    }
}

/// Boundary of the complement solid: every facet flipped.
pub fn complement(polygons: &[Polygon]) -> Vec<Polygon> {
    polygons
        .iter()
        .map(|poly| {
            let mut flipped = poly.clone();
            flipped.flip();
            flipped
        })
        .collect()
}

/// Union of two polygon soups: each boundary clipped to the other's
/// exterior.
pub fn union_polygons(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    match (BspTree::build(a), BspTree::build(b)) {
        (Some(in_a), Some(in_b)) => {
            let mut merged = in_b.clip_to_exterior(a.to_vec(), Operand::First);
            merged.extend(in_a.clip_to_exterior(b.to_vec(), Operand::Second));
            merged
        },
        (None, _) => b.to_vec(),
        (_, None) => a.to_vec(),
    }
}

/// Intersection, as the complement of the union of complements.
pub fn intersect_polygons(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    complement(&union_polygons(&complement(a), &complement(b)))
}

/// Difference, as the complement of the union of the minuend's complement
/// with the subtrahend.
pub fn difference_polygons(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    complement(&union_polygons(&complement(a), b))
}
