//! Shell flattener: accumulates the upward-facing half-facets of a planar
//! section into a single 2D region.

use crate::backend::{Boundary, FacetCycle, GeometryBackend, HalfFacet, ShellVisitor};
use crate::contours::signed_area2;
use crate::float_types::Real;
use nalgebra::{Point2, Vector3};

/// Walks the shells of a 3D solid that has been cut to the z=0 plane and
/// builds the union of its upward facets as a 2D region.
///
/// Only facets whose orthogonal direction is exactly `(0,0,1)` contribute;
/// the downward partner of each facet (and the side walls of a slab cut)
/// are skipped so nothing is counted twice. Within a facet, the first
/// proper cycle is the outer contour and is unioned into the accumulator;
/// later cycles are holes and are intersected away. Contours are
/// canonicalized before region construction — outer counter-clockwise,
/// holes clockwise — so the backend's region marks are deterministic.
pub struct Flattener<'a, B: GeometryBackend> {
    backend: &'a B,
    accumulator: B::Nef2,
    up: Vector3<Real>,
}

impl<'a, B: GeometryBackend> Flattener<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Flattener {
            backend,
            accumulator: backend.empty_nef2(),
            up: Vector3::z(),
        }
    }

    /// Transfer the accumulated region to the caller.
    pub fn into_region(self) -> B::Nef2 {
        self.accumulator
    }

    fn combine(&mut self, contour: &[Point2<Real>], hole: bool) {
        match self.backend.nef2_from_contour(contour, Boundary::Included) {
            Ok(region) => {
                let combined = if hole {
                    self.backend.intersect2(&mut self.accumulator, &region)
                } else {
                    self.backend.union2(&mut self.accumulator, &region)
                };
                if let Err(err) = combined {
                    log::warn!("geometry error while flattening a facet contour: {err}");
                }
            },
            // Cycles that collapse in projection contribute nothing.
            Err(err) => log::debug!("skipping facet cycle: {err}"),
        }
    }
}

impl<B: GeometryBackend> ShellVisitor for Flattener<'_, B> {
    fn half_facet(&mut self, facet: &HalfFacet) {
        if facet.orthogonal_direction != self.up {
            // Down-facing half-facet (or a slab side wall); skipping.
            return;
        }

        let mut contour_counter = 0;
        for cycle in &facet.cycles {
            let FacetCycle::Edges(points) = cycle else {
                // Trivial facet cycle skipped.
                continue;
            };
            let mut contour: Vec<Point2<Real>> =
                points.iter().map(|p| Point2::new(p.x, p.y)).collect();

            let hole = contour_counter != 0;
            orient_contour(&mut contour, hole);
            self.combine(&contour, hole);
            contour_counter += 1;
        }
    }
}

/// Wind `contour` counter-clockwise for outer cycles, clockwise for holes.
fn orient_contour(contour: &mut [Point2<Real>], hole: bool) {
    let ccw = signed_area2(contour) > 0.0;
    if ccw == hole {
        contour.reverse();
    }
}
