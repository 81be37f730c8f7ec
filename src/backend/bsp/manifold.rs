//! Edge-pairing 2-manifold test for backend solids.

use crate::backend::bsp::polygon::Polygon;
use crate::float_types::Real;
use hashbrown::HashMap;
use nalgebra::Point3;

const QUANTIZATION_FACTOR: Real = 1e7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct QuantizedPoint(i64, i64, i64);

fn quantize_point(p: &Point3<Real>) -> QuantizedPoint {
    QuantizedPoint(
        (p.x * QUANTIZATION_FACTOR).round() as i64,
        (p.y * QUANTIZATION_FACTOR).round() as i64,
        (p.z * QUANTIZATION_FACTOR).round() as i64,
    )
}

/// Whether the polygon soup forms a closed 2-manifold: after triangulation,
/// every undirected edge must be shared by exactly two triangles.
pub fn is_manifold(polygons: &[Polygon]) -> bool {
    let mut edge_counts: HashMap<(QuantizedPoint, QuantizedPoint), u32> = HashMap::new();

    for poly in polygons {
        for tri in poly.triangulate() {
            for &(i0, i1) in &[(0, 1), (1, 2), (2, 0)] {
                let p0 = quantize_point(&tri[i0]);
                let p1 = quantize_point(&tri[i1]);

                // Order the endpoints so both directions share a key.
                let key = if p0 < p1 { (p0, p1) } else { (p1, p0) };
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    !edge_counts.is_empty() && edge_counts.values().all(|&count| count == 2)
}
