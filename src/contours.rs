//! 2D contour data: the intermediate between 2D regions and the extrusion
//! builders, plus its DXF loader.

use crate::errors::ContourLoadError;
use crate::float_types::{Real, TAU};
use crate::fragments::fragments_from_radius;
use dxf::entities::EntityType;
use dxf::Drawing;
use geo::{Contains, LineString, MultiPolygon, Point as GeoPoint, Polygon as GeoPolygon};
use hashbrown::HashMap;
use nalgebra::Point2;
use std::io::BufReader;
use std::path::Path;

/// One polyline of a [`ContourSet`].
///
/// Closed paths do not repeat the first index; consumers wrap modulo the
/// path length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourPath {
    /// Indices into [`ContourSet::points`].
    pub indices: Vec<usize>,
    pub is_closed: bool,
    /// Holes are inner. Outer contours are wound clockwise, holes
    /// counter-clockwise.
    pub is_inner: bool,
}

/// A set of shared 2D points and the paths threaded through them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourSet {
    pub points: Vec<Point2<Real>>,
    pub paths: Vec<ContourPath>,
}

/// Bit-exact point dedup map, keyed on coordinate bit patterns.
type PointIndex = HashMap<(u64, u64), usize>;

/// Twice the signed area of the ring through `points` (positive for
/// counter-clockwise winding).
pub(crate) fn signed_area2(points: &[Point2<Real>]) -> Real {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum
}

impl ContourSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn point_id(&mut self, index: &mut PointIndex, x: Real, y: Real) -> usize {
        *index.entry((x.to_bits(), y.to_bits())).or_insert_with(|| {
            self.points.push(Point2::new(x, y));
            self.points.len() - 1
        })
    }

    /// Append a path, dropping consecutive duplicate points (and the closing
    /// duplicate of a closed ring, if present).
    fn add_path(&mut self, index: &mut PointIndex, pts: &[Point2<Real>], is_closed: bool) {
        let mut indices: Vec<usize> = Vec::with_capacity(pts.len());
        for p in pts {
            let id = self.point_id(index, p.x, p.y);
            if indices.last() == Some(&id) {
                continue;
            }
            indices.push(id);
        }
        if is_closed && indices.len() > 1 && indices.first() == indices.last() {
            indices.pop();
        }
        let minimum = if is_closed { 3 } else { 2 };
        if indices.len() < minimum {
            return;
        }
        self.paths.push(ContourPath {
            indices,
            is_closed,
            is_inner: false,
        });
    }

    /// The points of `path`, in path order.
    pub fn path_points(&self, path: &ContourPath) -> Vec<Point2<Real>> {
        path.indices.iter().map(|&i| self.points[i]).collect()
    }

    /// Build a contour set from a filled region: exterior rings become outer
    /// contours, interior rings holes, with canonical winding.
    pub fn from_multi_polygon(region: &MultiPolygon<Real>) -> Self {
        let mut set = ContourSet::new();
        let mut index = PointIndex::new();
        for poly in region {
            set.add_ring(&mut index, poly.exterior(), false);
            for ring in poly.interiors() {
                set.add_ring(&mut index, ring, true);
            }
        }
        set
    }

    fn add_ring(&mut self, index: &mut PointIndex, ring: &LineString<Real>, is_inner: bool) {
        let pts: Vec<Point2<Real>> = ring.coords().map(|c| Point2::new(c.x, c.y)).collect();
        let before = self.paths.len();
        self.add_path(index, &pts, true);
        if self.paths.len() > before {
            let path = self.paths.last_mut().expect("path was just pushed");
            path.is_inner = is_inner;
            Self::canonicalize(&self.points, path);
        }
    }

    /// Enforce the winding convention: outer contours clockwise, holes
    /// counter-clockwise.
    fn canonicalize(points: &[Point2<Real>], path: &mut ContourPath) {
        let ring: Vec<Point2<Real>> = path.indices.iter().map(|&i| points[i]).collect();
        let ccw = signed_area2(&ring) > 0.0;
        if ccw != path.is_inner {
            path.indices.reverse();
        }
    }

    /// Mark closed paths nested inside an odd number of other closed paths
    /// as holes, then canonicalize winding.
    fn assign_nesting(&mut self) {
        let rings: Vec<Option<GeoPolygon<Real>>> = self
            .paths
            .iter()
            .map(|path| {
                if !path.is_closed {
                    return None;
                }
                let mut coords: Vec<(Real, Real)> = path
                    .indices
                    .iter()
                    .map(|&i| (self.points[i].x, self.points[i].y))
                    .collect();
                coords.push(coords[0]);
                Some(GeoPolygon::new(LineString::from(coords), vec![]))
            })
            .collect();

        for i in 0..self.paths.len() {
            if !self.paths[i].is_closed {
                continue;
            }
            let probe = self.points[self.paths[i].indices[0]];
            let probe = GeoPoint::new(probe.x, probe.y);
            let depth = rings
                .iter()
                .enumerate()
                .filter(|&(j, ring)| j != i && ring.as_ref().is_some_and(|r| r.contains(&probe)))
                .count();
            self.paths[i].is_inner = depth % 2 == 1;
        }

        let points = std::mem::take(&mut self.points);
        for path in &mut self.paths {
            if path.is_closed {
                Self::canonicalize(&points, path);
            }
        }
        self.points = points;
    }

    /// Load contour data from a DXF file.
    ///
    /// Coordinates are stored as `(user − origin) · scale`; circles are
    /// sampled with [`fragments_from_radius`] using `fn_`/`fs`/`fa`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_path(
        path: &Path,
        layername: Option<&str>,
        origin_x: Real,
        origin_y: Real,
        scale: Real,
        fn_: Real,
        fs: Real,
        fa: Real,
    ) -> Result<Self, ContourLoadError> {
        let mut reader = BufReader::new(std::fs::File::open(path)?);
        let drawing = Drawing::load(&mut reader)?;
        Ok(Self::from_drawing(
            &drawing, layername, origin_x, origin_y, scale, fn_, fs, fa,
        ))
    }

    /// Load contour data from in-memory DXF bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn from_bytes(
        bytes: &[u8],
        layername: Option<&str>,
        origin_x: Real,
        origin_y: Real,
        scale: Real,
        fn_: Real,
        fs: Real,
        fa: Real,
    ) -> Result<Self, ContourLoadError> {
        let drawing = Drawing::load(&mut std::io::Cursor::new(bytes))?;
        Ok(Self::from_drawing(
            &drawing, layername, origin_x, origin_y, scale, fn_, fs, fa,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn from_drawing(
        drawing: &Drawing,
        layername: Option<&str>,
        origin_x: Real,
        origin_y: Real,
        scale: Real,
        fn_: Real,
        fs: Real,
        fa: Real,
    ) -> Self {
        let mut set = ContourSet::new();
        let mut index = PointIndex::new();
        let place = |x: Real, y: Real| Point2::new((x - origin_x) * scale, (y - origin_y) * scale);

        for entity in drawing.entities() {
            if layername.is_some_and(|layer| entity.common.layer != layer) {
                continue;
            }
            match &entity.specific {
                EntityType::Line(line) => {
                    let pts = [place(line.p1.x, line.p1.y), place(line.p2.x, line.p2.y)];
                    set.add_path(&mut index, &pts, false);
                },
                EntityType::Polyline(polyline) => {
                    let pts: Vec<Point2<Real>> = polyline
                        .vertices()
                        .map(|v| place(v.location.x, v.location.y))
                        .collect();
                    set.add_path(&mut index, &pts, polyline.get_is_closed());
                },
                EntityType::Circle(circle) => {
                    let r = circle.radius * scale;
                    let n = fragments_from_radius(r, fn_, fs, fa);
                    let center = place(circle.center.x, circle.center.y);
                    let pts: Vec<Point2<Real>> = (0..n)
                        .map(|i| {
                            let theta = TAU * Real::from(i) / Real::from(n);
                            Point2::new(
                                center.x + r * theta.cos(),
                                center.y + r * theta.sin(),
                            )
                        })
                        .collect();
                    set.add_path(&mut index, &pts, true);
                },
                EntityType::Arc(arc) => {
                    let r = arc.radius * scale;
                    let start = arc.start_angle.to_radians();
                    let mut sweep = arc.end_angle.to_radians() - start;
                    if sweep <= 0.0 {
                        sweep += TAU;
                    }
                    let n = fragments_from_radius(r, fn_, fs, fa);
                    let steps = ((Real::from(n) * sweep / TAU).ceil() as u32).max(1);
                    let center = place(arc.center.x, arc.center.y);
                    let pts: Vec<Point2<Real>> = (0..=steps)
                        .map(|i| {
                            let theta = start + sweep * Real::from(i) / Real::from(steps);
                            Point2::new(
                                center.x + r * theta.cos(),
                                center.y + r * theta.sin(),
                            )
                        })
                        .collect();
                    set.add_path(&mut index, &pts, false);
                },
                _ => {
                    log::debug!("skipping unsupported DXF entity");
                },
            }
        }

        set.assign_nesting();
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal ASCII DXF: one open line and one circle on layer 0.
    const LINE_AND_CIRCLE: &str = "0\nSECTION\n2\nENTITIES\n\
        0\nLINE\n8\n0\n10\n0.0\n20\n0.0\n11\n2.0\n21\n0.0\n\
        0\nCIRCLE\n8\n0\n10\n0.0\n20\n0.0\n40\n1.0\n\
        0\nENDSEC\n0\nEOF\n";

    #[test]
    fn loads_lines_and_circles() {
        let set = ContourSet::from_bytes(
            LINE_AND_CIRCLE.as_bytes(),
            None,
            0.0,
            0.0,
            1.0,
            8.0,
            2.0,
            12.0,
        )
        .expect("parse");

        assert_eq!(set.paths.len(), 2);
        let line = &set.paths[0];
        assert!(!line.is_closed);
        assert_eq!(line.indices.len(), 2);

        let circle = &set.paths[1];
        assert!(circle.is_closed);
        assert_eq!(circle.indices.len(), 8);
        for p in set.path_points(circle) {
            assert!((p.coords.norm() - 1.0).abs() < 1e-9);
        }
        // Outer contours come out clockwise.
        assert!(signed_area2(&set.path_points(circle)) < 0.0);
    }

    #[test]
    fn origin_and_scale_transform_points() {
        let set = ContourSet::from_bytes(
            LINE_AND_CIRCLE.as_bytes(),
            None,
            1.0,
            0.0,
            2.0,
            8.0,
            2.0,
            12.0,
        )
        .expect("parse");

        // Line (0,0)→(2,0) under origin (1,0), scale 2 becomes (−2,0)→(2,0).
        let line = set.path_points(&set.paths[0]);
        assert_eq!(line[0], Point2::new(-2.0, 0.0));
        assert_eq!(line[1], Point2::new(2.0, 0.0));
    }

    #[test]
    fn nested_rings_become_holes() {
        let outer: Vec<Point2<Real>> = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .collect();
        let inner: Vec<Point2<Real>> = [(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .collect();

        let mut set = ContourSet::new();
        let mut index = PointIndex::new();
        set.add_path(&mut index, &outer, true);
        set.add_path(&mut index, &inner, true);
        set.assign_nesting();

        assert!(!set.paths[0].is_inner);
        assert!(set.paths[1].is_inner);
        assert!(signed_area2(&set.path_points(&set.paths[0])) < 0.0);
        assert!(signed_area2(&set.path_points(&set.paths[1])) > 0.0);
    }
}
