//! Linear extrusion: caps, optionally twisted side walls, and the slice
//! stitcher the walls are built from.

use crate::backend::GeometryBackend;
use crate::contours::{ContourPath, ContourSet};
use crate::eval::{ContourSource, EvaluatedChild, Evaluator, LinearExtrudeParams};
use crate::float_types::Real;
use crate::polyset::PolySet;
use crate::tess::{rotate_point, tessellate_contours};
use nalgebra::Point3;

impl<B: GeometryBackend> Evaluator<'_, B> {
    /// Evaluate a linear-extrude node: union the 2D children (or load the
    /// DXF source) and extrude the contours. `None` when no contour data
    /// is available.
    pub fn linear_extrude(
        &self,
        params: &LinearExtrudeParams,
        children: &[EvaluatedChild<B>],
    ) -> Option<PolySet> {
        let contours = self.contours_of(&params.source, children, "linear_extrude")?;
        Some(self.extrude_contours(params, &contours))
    }

    /// Extrude a contour set into a closed triangulated PolySet: a bottom
    /// cap at the lower height, a top cap rotated by the full twist, and a
    /// ribbon of side-wall slices in between.
    pub fn extrude_contours(&self, params: &LinearExtrudeParams, contours: &ContourSet) -> PolySet {
        let mut ps = PolySet::new();
        ps.convexity = params.convexity;

        let (h1, h2) = if params.center {
            (-params.height / 2.0, params.height / 2.0)
        } else {
            (0.0, params.height)
        };

        warn_open_paths(contours, &params.source);

        if params.has_twist {
            tessellate_contours(&mut ps, contours, 0.0, false, true, h1);
            tessellate_contours(&mut ps, contours, params.twist, true, true, h2);
            let slices = params.slices.max(1);
            for j in 0..slices {
                let t1 = params.twist * j as Real / slices as Real;
                let t2 = params.twist * (j + 1) as Real / slices as Real;
                let g1 = h1 + (h2 - h1) * j as Real / slices as Real;
                let g2 = h1 + (h2 - h1) * (j + 1) as Real / slices as Real;
                for path in &contours.paths {
                    if !path.is_closed {
                        continue;
                    }
                    add_slice(&mut ps, contours, path, t1, t2, g1, g2);
                }
            }
        } else {
            tessellate_contours(&mut ps, contours, 0.0, false, true, h1);
            tessellate_contours(&mut ps, contours, 0.0, true, true, h2);
            for path in &contours.paths {
                if !path.is_closed {
                    continue;
                }
                add_slice(&mut ps, contours, path, 0.0, 0.0, h1, h2);
            }
        }

        ps
    }

    /// Resolve the contour source of an extrusion node.
    pub(crate) fn contours_of(
        &self,
        source: &ContourSource,
        children: &[EvaluatedChild<B>],
        operation: &str,
    ) -> Option<ContourSet> {
        match &source.filename {
            None => {
                let sum = self.union_children_2d(children, operation);
                let region = sum.nef2()?;
                Some(self.backend().nef2_to_contours(region))
            },
            Some(path) => match ContourSet::from_path(
                path,
                source.layername.as_deref(),
                source.origin_x,
                source.origin_y,
                source.scale,
                source.fn_,
                source.fs,
                source.fa,
            ) {
                Ok(contours) => Some(contours),
                Err(err) => {
                    log::warn!("failed to load \"{}\": {err}", path.display());
                    None
                },
            },
        }
    }
}

/// Emit two triangles per contour edge between two transformed copies of
/// `path` (rotation `rot1`→`rot2` in degrees, height `h1`→`h2`).
///
/// The diagonal follows the sign of `sin(rot2 − rot1)` so twisted walls
/// fold consistently; winding is reversed for outer contours so their wall
/// normals face outward, while holes keep the listed order. Degenerate
/// edges are dropped. The path must be closed.
pub(crate) fn add_slice(
    ps: &mut PolySet,
    contours: &ContourSet,
    path: &ContourPath,
    rot1: Real,
    rot2: Real,
    h1: Real,
    h2: Real,
) {
    let splitfirst = (rot2 - rot1).to_radians().sin() >= 0.0;
    let n = path.indices.len();

    for k in 0..n {
        let j = (k + 1) % n;
        let pk = contours.points[path.indices[k]];
        let pj = contours.points[path.indices[j]];
        if pk == pj {
            continue;
        }

        let k1 = rotate_point(pk, rot1);
        let k2 = rotate_point(pk, rot2);
        let j1 = rotate_point(pj, rot1);
        let j2 = rotate_point(pj, rot2);

        let k1 = Point3::new(k1.x, k1.y, h1);
        let k2 = Point3::new(k2.x, k2.y, h2);
        let j1 = Point3::new(j1.x, j1.y, h1);
        let j2 = Point3::new(j2.x, j2.y, h2);

        let reversed = !path.is_inner;
        if splitfirst {
            ps.push_triangle(k1, j1, j2, reversed);
            ps.push_triangle(k2, k1, j2, reversed);
        } else {
            ps.push_triangle(k1, j1, k2, reversed);
            ps.push_triangle(j2, k2, j1, reversed);
        }
    }
}

/// Report open paths, which contribute neither caps nor side walls, with
/// their endpoints in user coordinates.
fn warn_open_paths(contours: &ContourSet, source: &ContourSource) {
    let mut first_open_path = true;
    for path in &contours.paths {
        if path.is_closed {
            continue;
        }
        if first_open_path {
            log::warn!(
                "open paths in linear extrusion (file = \"{}\", layer = \"{}\"):",
                source
                    .filename
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                source.layername.as_deref().unwrap_or_default()
            );
            first_open_path = false;
        }
        let start = contours.points[path.indices[0]];
        let end = contours.points[*path.indices.last().expect("paths are never empty")];
        log::warn!(
            "   {:9.5} {:10.5} ... {:10.5} {:10.5}",
            start.x / source.scale + source.origin_x,
            start.y / source.scale + source.origin_y,
            end.x / source.scale + source.origin_x,
            end.y / source.scale + source.origin_y,
        );
    }
}
