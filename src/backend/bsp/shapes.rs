//! Axis-aligned primitives used to seed backend solids in tests and demos.

use crate::backend::bsp::polygon::Polygon;
use crate::backend::bsp::Solid;
use crate::float_types::{Real, TAU};
use nalgebra::Point3;

/// Axis-aligned box spanning `min`..`max`, faces wound outward.
pub fn cuboid(min: Point3<Real>, max: Point3<Real>) -> Solid {
    let (x1, y1, z1) = (min.x, min.y, min.z);
    let (x2, y2, z2) = (max.x, max.y, max.z);
    let p = Point3::new;

    let faces = vec![
        // bottom, -z
        vec![p(x1, y1, z1), p(x1, y2, z1), p(x2, y2, z1), p(x2, y1, z1)],
        // top, +z
        vec![p(x1, y1, z2), p(x2, y1, z2), p(x2, y2, z2), p(x1, y2, z2)],
        // front, -y
        vec![p(x1, y1, z1), p(x2, y1, z1), p(x2, y1, z2), p(x1, y1, z2)],
        // back, +y
        vec![p(x1, y2, z1), p(x1, y2, z2), p(x2, y2, z2), p(x2, y2, z1)],
        // left, -x
        vec![p(x1, y1, z1), p(x1, y1, z2), p(x1, y2, z2), p(x1, y2, z1)],
        // right, +x
        vec![p(x2, y1, z1), p(x2, y2, z1), p(x2, y2, z2), p(x2, y1, z2)],
    ];

    Solid::Mesh(faces.into_iter().filter_map(Polygon::new).collect())
}

/// Cube spanning `[0, size]³`.
pub fn cube(size: Real) -> Solid {
    cuboid(Point3::origin(), Point3::new(size, size, size))
}

/// Z-axis cylinder of radius `radius` spanning `z1..z2`, with `segments`
/// side facets and n-gon caps.
pub fn cylinder(radius: Real, z1: Real, z2: Real, segments: usize) -> Solid {
    let segments = segments.max(3);
    let ring: Vec<(Real, Real)> = (0..segments)
        .map(|i| {
            let theta = TAU * i as Real / segments as Real;
            (radius * theta.cos(), radius * theta.sin())
        })
        .collect();

    let mut polygons = Vec::with_capacity(segments + 2);
    for i in 0..segments {
        let j = (i + 1) % segments;
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        polygons.extend(Polygon::new(vec![
            Point3::new(xi, yi, z1),
            Point3::new(xj, yj, z1),
            Point3::new(xj, yj, z2),
            Point3::new(xi, yi, z2),
        ]));
    }

    let top: Vec<Point3<Real>> = ring.iter().map(|&(x, y)| Point3::new(x, y, z2)).collect();
    let bottom: Vec<Point3<Real>> = ring
        .iter()
        .rev()
        .map(|&(x, y)| Point3::new(x, y, z1))
        .collect();
    polygons.extend(Polygon::new(top));
    polygons.extend(Polygon::new(bottom));

    Solid::Mesh(polygons)
}
