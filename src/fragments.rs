//! Facet-count heuristic for circular sampling.

use crate::float_types::{Real, TAU};

/// Radii below this are treated as sitting on the axis and always sample
/// with the minimum fragment count.
const GRID_FINE: Real = 1e-6;

/// Number of angular samples used when discretizing a circle of radius `r`.
///
/// An explicit `fn_ > 0` forces the count (clamped to at least 3). Otherwise
/// the count is the coarser of the angle bound `360/fa` and the segment
/// length bound `r·τ/fs`, never below 5.
pub fn fragments_from_radius(r: Real, fn_: Real, fs: Real, fa: Real) -> u32 {
    if r < GRID_FINE {
        return 3;
    }
    if fn_ > 0.0 {
        return if fn_ < 3.0 { 3 } else { fn_ as u32 };
    }
    ((360.0 / fa).min(r * TAU / fs).max(5.0)).ceil() as u32
}
