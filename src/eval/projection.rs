//! Projection evaluator: flatten 3D bodies onto the XY plane, by cutting
//! with z=0 or by accumulating the whole silhouette.

use crate::backend::{Boundary, FailureBehaviour, GeometryBackend, ScopedBehaviour};
use crate::errors::BackendError;
use crate::eval::flatten::Flattener;
use crate::eval::{EvaluatedChild, Evaluator, ProjectionParams};
use crate::float_types::Real;
use crate::nef::NefSolid;
use crate::polyset::PolySet;
use nalgebra::{Point2, Point3};

/// Absolute tolerance for triangles that collapse in projection.
const DEGENERACY_EPS: Real = 1e-6;

impl<B: GeometryBackend> Evaluator<'_, B> {
    /// Evaluate a projection node over its children. Returns a PolySet in
    /// the z=0 plane, or `None` when the result is empty or unrecoverable.
    pub fn project(
        &self,
        params: &ProjectionParams,
        children: &[EvaluatedChild<B>],
    ) -> Option<PolySet> {
        let sum = self.union_children_3d(children);
        let body = sum.nef3()?;

        if !self.backend().is_simple(body) && !params.cut_mode {
            log::warn!(
                "body of projection(cut = false) isn't a valid 2-manifold, modify your design"
            );
            let mut ps = PolySet::new();
            ps.convexity = params.convexity;
            return Some(ps);
        }

        let region = if params.cut_mode {
            self.project_cut(body)?
        } else {
            self.project_shadow(body)?
        };

        let mut ps = self.backend().nef2_to_polyset(&region);
        ps.convexity = params.convexity;
        Some(ps)
    }

    /// Union the non-background 3D children; 2D children do not contribute.
    ///
    /// The first contributing child is copied, then later children union
    /// in place behind the copy-on-write payload accessor.
    fn union_children_3d(&self, children: &[EvaluatedChild<B>]) -> NefSolid<B> {
        let mut sum = NefSolid::empty();
        for child in children {
            if child.background {
                continue;
            }
            let Some(solid) = child.solid.nef3() else {
                continue;
            };
            if sum.is_empty() {
                sum = child.solid.copy();
            } else if let Some(acc) = sum.nef3_mut() {
                if let Err(err) = self.backend().union3(acc, solid) {
                    log::warn!("geometry error while unioning projection children: {err}");
                    return NefSolid::empty();
                }
            }
        }
        sum
    }

    /// Cut mode: intersect with the z=0 plane (falling back to a thin slab
    /// when that fails) and flatten the shells of the section.
    ///
    /// The backend's failure policy is switched to recoverable for the
    /// duration; the guard restores it on every exit path.
    fn project_cut(&self, sum: &B::Nef3) -> Option<B::Nef2> {
        let _behaviour = ScopedBehaviour::new(self.backend(), FailureBehaviour::Recover);

        let section = match self.backend().plane_intersection(sum) {
            Ok(section) => section,
            Err(err) => {
                log::warn!("geometry error in projection during plane intersection: {err}");
                log::warn!("trying alternative intersection using a very large thin box");
                match self.slab_intersection(sum) {
                    Ok(section) => section,
                    Err(err) => {
                        log::warn!(
                            "geometry error in projection during thin-box intersection: {err}"
                        );
                        return None;
                    },
                }
            },
        };

        let mut flattener = Flattener::new(self.backend());
        if let Err(err) = self.backend().walk_shells(&section, &mut flattener) {
            log::warn!("geometry error in projection while flattening: {err}");
        }
        Some(flattener.into_region())
    }

    /// Intersect `sum` with the convex hull of a very large, very thin box
    /// straddling z=0. The slab stays slightly off the plane: facets that
    /// coincide with z=0 trip defects in exact kernels.
    fn slab_intersection(&self, sum: &B::Nef3) -> Result<B::Nef3, BackendError> {
        const INF: Real = 1e8;
        const EPS: Real = 0.001;
        let (x1, x2) = (-INF, INF);
        let (y1, y2) = (-INF, INF);
        let (z1, z2) = (-EPS, EPS);

        let corners = [
            Point3::new(x1, y1, z1),
            Point3::new(x1, y2, z1),
            Point3::new(x2, y2, z1),
            Point3::new(x2, y1, z1),
            Point3::new(x1, y1, z2),
            Point3::new(x1, y2, z2),
            Point3::new(x2, y2, z2),
            Point3::new(x2, y1, z2),
        ];

        let hull = self.backend().convex_hull3(&corners)?;
        let mut slab = self.backend().nef3_from_polyhedron(hull)?;
        self.backend().intersect3(&mut slab, sum)?;
        Ok(slab)
    }

    /// Shadow mode: project every triangle of the body onto the XY plane
    /// and union the non-degenerate ones.
    fn project_shadow(&self, sum: &B::Nef3) -> Option<B::Nef2> {
        let ps3 = self.backend().nef3_to_polyset(sum)?;
        let mut region: Option<B::Nef2> = None;

        for poly in &ps3.polygons {
            let Some(contour) = shadow_contour(poly) else {
                continue;
            };
            match self.backend().nef2_from_contour(&contour, Boundary::Included) {
                Ok(flat) => match &mut region {
                    None => region = Some(flat),
                    Some(acc) => {
                        if let Err(err) = self.backend().union2(acc, &flat) {
                            log::warn!("geometry error while accumulating a shadow: {err}");
                        }
                    },
                },
                Err(err) => log::debug!("skipping shadow polygon: {err}"),
            }
        }

        Some(region.unwrap_or_else(|| self.backend().empty_nef2()))
    }
}

/// Project a polygon to the XY plane, oriented counter-clockwise, or `None`
/// when it degenerates in projection.
///
/// At the vertex with minimum x, the polar angles of the edges to the next
/// and previous vertices decide both degeneracy (nearly equal angles or
/// vanishing edges collapse to a line) and whether the projected ring needs
/// reversing to run counter-clockwise.
fn shadow_contour(poly: &[Point3<Real>]) -> Option<Vec<Point2<Real>>> {
    let n = poly.len();
    if n < 3 {
        return None;
    }

    let mut min_x_p = 0;
    for (j, v) in poly.iter().enumerate() {
        if v.x < poly[min_x_p].x {
            min_x_p = j;
        }
    }
    let p = poly[min_x_p];
    let next = poly[(min_x_p + 1) % n];
    let prev = poly[(min_x_p + n - 1) % n];

    let (ax, ay) = (next.x - p.x, next.y - p.y);
    let at = ay.atan2(ax);
    let (bx, by) = (prev.x - p.x, prev.y - p.y);
    let bt = by.atan2(bx);

    if (at - bt).abs() < DEGENERACY_EPS
        || (ax.abs() < DEGENERACY_EPS && ay.abs() < DEGENERACY_EPS)
        || (bx.abs() < DEGENERACY_EPS && by.abs() < DEGENERACY_EPS)
    {
        // This triangle is degenerated in projection.
        return None;
    }

    let mut contour: Vec<Point2<Real>> =
        poly.iter().map(|v| Point2::new(v.x, v.y)).collect();
    if at > bt {
        contour.reverse();
    }
    Some(contour)
}
