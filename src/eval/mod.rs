//! PolySet evaluators: projection, linear extrusion, rotational extrusion
//! and the render pass-through, all driving a [`GeometryBackend`].

mod extrude;
mod flatten;
mod projection;
mod rotate;

pub use flatten::Flattener;

use crate::backend::GeometryBackend;
use crate::float_types::Real;
use crate::nef::NefSolid;
use crate::polyset::PolySet;
use std::path::PathBuf;

/// A scene-graph child after upstream evaluation: the solid it produced,
/// plus whether its instance is marked background (background children do
/// not contribute to sums).
pub struct EvaluatedChild<B: GeometryBackend> {
    pub solid: NefSolid<B>,
    pub background: bool,
}

impl<B: GeometryBackend> EvaluatedChild<B> {
    pub fn new(solid: NefSolid<B>) -> Self {
        EvaluatedChild {
            solid,
            background: false,
        }
    }
}

/// Parameters of a projection node.
#[derive(Clone, Debug)]
pub struct ProjectionParams {
    /// Cut with the z=0 plane instead of projecting the whole silhouette.
    pub cut_mode: bool,
    pub convexity: u32,
}

/// Contour source shared by the extrusion nodes: inline 2D children when
/// `filename` is unset, a DXF file otherwise.
#[derive(Clone, Debug)]
pub struct ContourSource {
    pub filename: Option<PathBuf>,
    pub layername: Option<String>,
    pub origin_x: Real,
    pub origin_y: Real,
    pub scale: Real,
    pub fn_: Real,
    pub fs: Real,
    pub fa: Real,
}

impl Default for ContourSource {
    fn default() -> Self {
        ContourSource {
            filename: None,
            layername: None,
            origin_x: 0.0,
            origin_y: 0.0,
            scale: 1.0,
            fn_: 0.0,
            fs: 2.0,
            fa: 12.0,
        }
    }
}

/// Parameters of a linear-extrude node.
#[derive(Clone, Debug)]
pub struct LinearExtrudeParams {
    pub convexity: u32,
    pub height: Real,
    pub center: bool,
    /// Twist over the full height, in degrees.
    pub twist: Real,
    pub slices: u32,
    pub has_twist: bool,
    pub source: ContourSource,
}

impl Default for LinearExtrudeParams {
    fn default() -> Self {
        LinearExtrudeParams {
            convexity: 1,
            height: 100.0,
            center: false,
            twist: 0.0,
            slices: 1,
            has_twist: false,
            source: ContourSource::default(),
        }
    }
}

/// Parameters of a rotate-extrude node.
#[derive(Clone, Debug, Default)]
pub struct RotateExtrudeParams {
    pub convexity: u32,
    pub source: ContourSource,
}

/// The PolySet evaluator. Owns nothing; every call builds its intermediate
/// solids locally and hands the resulting PolySet to the caller.
pub struct Evaluator<'a, B: GeometryBackend> {
    backend: &'a B,
}

impl<'a, B: GeometryBackend> Evaluator<'a, B> {
    pub const fn new(backend: &'a B) -> Self {
        Evaluator { backend }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    /// Render / advanced-CSG pass-through: convert an evaluated solid to a
    /// PolySet. Warns on a 3D body that is not a 2-manifold, but still
    /// attempts conversion. `None` when the solid is empty or has no
    /// boundary to convert.
    pub fn render(&self, solid: &NefSolid<B>, convexity: u32) -> Option<PolySet> {
        let mut ps = if let Some(n3) = solid.nef3() {
            if !self.backend.is_simple(n3) {
                log::warn!("body of render() isn't a valid 2-manifold, modify your design");
            }
            self.backend.nef3_to_polyset(n3)?
        } else if let Some(n2) = solid.nef2() {
            self.backend.nef2_to_polyset(n2)
        } else {
            return None;
        };
        ps.convexity = convexity;
        Some(ps)
    }

    /// Union the non-background 2D children into a single solid. 3D
    /// children are reported and skipped. Empty when nothing contributes.
    ///
    /// The first contributing child is copied, then later children union
    /// in place behind the copy-on-write payload accessor.
    fn union_children_2d(
        &self,
        children: &[EvaluatedChild<B>],
        operation: &str,
    ) -> NefSolid<B> {
        let mut sum = NefSolid::empty();
        for child in children {
            if child.background || child.solid.is_empty() {
                continue;
            }
            let Some(region) = child.solid.nef2() else {
                log::error!("{operation}() is not defined for 3D child objects");
                continue;
            };
            if sum.is_empty() {
                sum = child.solid.copy();
            } else if let Some(acc) = sum.nef2_mut() {
                if let Err(err) = self.backend.union2(acc, region) {
                    log::warn!("geometry error while unioning {operation}() children: {err}");
                    return NefSolid::empty();
                }
            }
        }
        sum
    }
}
