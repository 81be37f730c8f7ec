//! Planar tessellation of closed contour regions: extrusion caps and the
//! 2D-region-to-PolySet conversion route through here.

use crate::contours::ContourSet;
use crate::float_types::{Real, EPSILON};
use crate::polyset::PolySet;
use geo::{Contains, LineString, Point as GeoPoint, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::{Point2, Point3};

/// Rotate `p` by `rot_deg` degrees, with the same convention the side-wall
/// stitcher uses (positive angles rotate clockwise).
pub(crate) fn rotate_point(p: Point2<Real>, rot_deg: Real) -> Point2<Real> {
    let (s, c) = rot_deg.to_radians().sin_cos();
    Point2::new(p.x * c + p.y * s, -p.x * s + p.y * c)
}

/// Append a triangulation of the closed region of `contours` to `ps`.
///
/// Triangle vertices are rotated by `rotation_deg` and placed at height `z`;
/// triangles are wound so their normal faces +z when `up_normals` and −z
/// otherwise. Inner paths are subtracted as holes unless `include_holes` is
/// false. Open paths never contribute.
pub fn tessellate_contours(
    ps: &mut PolySet,
    contours: &ContourSet,
    rotation_deg: Real,
    up_normals: bool,
    include_holes: bool,
    z: Real,
) {
    for poly in assemble_region(contours, include_holes) {
        for tri in poly.earcut_triangles() {
            let pts = [tri.0, tri.1, tri.2]
                .map(|c| rotate_point(Point2::new(c.x, c.y), rotation_deg));
            let area2 = (pts[1].x - pts[0].x) * (pts[2].y - pts[0].y)
                - (pts[2].x - pts[0].x) * (pts[1].y - pts[0].y);
            if area2.abs() < EPSILON {
                continue;
            }
            let mut tri3: Vec<Point3<Real>> =
                pts.iter().map(|p| Point3::new(p.x, p.y, z)).collect();
            if (area2 > 0.0) != up_normals {
                tri3.reverse();
            }
            ps.push_polygon(tri3);
        }
    }
}

/// Assemble the closed paths of `contours` into polygons with holes. Inner
/// paths attach to the first outer contour that contains them.
fn assemble_region(contours: &ContourSet, include_holes: bool) -> Vec<GeoPolygon<Real>> {
    let ring_of = |path: &crate::contours::ContourPath| {
        let mut coords: Vec<(Real, Real)> = path
            .indices
            .iter()
            .map(|&i| (contours.points[i].x, contours.points[i].y))
            .collect();
        coords.push(coords[0]);
        LineString::from(coords)
    };

    let mut polygons: Vec<GeoPolygon<Real>> = Vec::new();
    for path in &contours.paths {
        if !path.is_closed || path.is_inner {
            continue;
        }
        polygons.push(GeoPolygon::new(ring_of(path), vec![]));
    }

    if include_holes {
        for path in &contours.paths {
            if !path.is_closed || !path.is_inner {
                continue;
            }
            let probe = contours.points[path.indices[0]];
            let probe = GeoPoint::new(probe.x, probe.y);
            let ring = ring_of(path);
            match polygons.iter_mut().find(|poly| poly.contains(&probe)) {
                Some(poly) => poly.interiors_push(ring),
                None => log::debug!("hole contour lies outside every outer contour"),
            }
        }
    }

    polygons
}
