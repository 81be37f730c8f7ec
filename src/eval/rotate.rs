//! Rotational extrusion: lathe a 2D profile through a full turn.

use crate::backend::GeometryBackend;
use crate::contours::ContourSet;
use crate::eval::{EvaluatedChild, Evaluator, RotateExtrudeParams};
use crate::float_types::{Real, FRAC_PI_2, TAU};
use crate::fragments::fragments_from_radius;
use crate::polyset::PolySet;
use nalgebra::Point3;

impl<B: GeometryBackend> Evaluator<'_, B> {
    /// Evaluate a rotate-extrude node: union the 2D children (or load the
    /// DXF source) and lathe the contours. `None` when no contour data is
    /// available.
    pub fn rotate_extrude(
        &self,
        params: &RotateExtrudeParams,
        children: &[EvaluatedChild<B>],
    ) -> Option<PolySet> {
        let contours = self.contours_of(&params.source, children, "rotate_extrude")?;
        Some(self.rotate_contours(params, &contours))
    }

    /// Lathe every path of `contours` around the vertical axis. Profile
    /// point `(u, v)` at angle `a` lands at `(u·sin a, u·cos a, v)`.
    ///
    /// Each quad between adjacent angular samples is split into two
    /// triangles, and a triangle is emitted only when its diagonal's
    /// endpoints differ bit-exactly. Strips whose samples coincide on the
    /// axis silently drop out.
    pub fn rotate_contours(&self, params: &RotateExtrudeParams, contours: &ContourSet) -> PolySet {
        let mut ps = PolySet::new();
        ps.convexity = params.convexity;

        for path in &contours.paths {
            let count = path.indices.len();
            if count < 2 {
                continue;
            }

            let max_x = path
                .indices
                .iter()
                .fold(0.0, |acc: Real, &i| acc.max(contours.points[i].x));
            let fragments = fragments_from_radius(
                max_x,
                params.source.fn_,
                params.source.fs,
                params.source.fa,
            ) as usize;

            // Dense grid of samples indexed by (angle index, path index).
            let mut points = vec![vec![Point3::origin(); count]; fragments];
            for (j, row) in points.iter_mut().enumerate() {
                // Start on the X axis.
                let a = (j as Real * TAU) / fragments as Real - FRAC_PI_2;
                let (sin_a, cos_a) = a.sin_cos();
                for (k, sample) in row.iter_mut().enumerate() {
                    let p = contours.points[path.indices[k]];
                    *sample = Point3::new(p.x * sin_a, p.x * cos_a, p.y);
                }
            }

            let edges = if path.is_closed { count } else { count - 1 };
            for j in 0..fragments {
                let j1 = (j + 1) % fragments;
                for k in 0..edges {
                    let k1 = (k + 1) % count;
                    if points[j][k] != points[j1][k] {
                        ps.push_polygon(vec![points[j][k], points[j1][k], points[j][k1]]);
                    }
                    if points[j][k1] != points[j1][k1] {
                        ps.push_polygon(vec![points[j][k1], points[j1][k], points[j1][k1]]);
                    }
                }
            }
        }

        ps
    }
}
