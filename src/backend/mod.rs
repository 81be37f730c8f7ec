//! The geometry-backend seam: an exact Boolean engine over 2D and 3D
//! solids, a shell walker, and a process-wide failure policy.
//!
//! The evaluators drive this interface only. [`bsp::BspBackend`] is a
//! floating-point reference implementation with the same contract.

use crate::contours::ContourSet;
use crate::errors::BackendError;
use crate::float_types::Real;
use crate::polyset::PolySet;
use nalgebra::{Point2, Point3, Vector3};

pub mod bsp;

/// How the backend reacts to an internal geometric failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureBehaviour {
    /// Failures abort the process.
    Abort,
    /// Failures surface as recoverable [`BackendError`]s.
    Recover,
}

/// Boundary policy for building a 2D region from a contour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Boundary points belong to the closed region.
    Included,
    Excluded,
}

/// One boundary cycle of a half-facet.
#[derive(Clone, Debug)]
pub enum FacetCycle {
    /// A proper half-edge cycle: the chain of vertex points around the facet.
    Edges(Vec<Point3<Real>>),
    /// A trivial loop (isolated vertex); carries no contour.
    Trivial,
}

/// Descriptor of one oriented side of a facet, as yielded by the shell
/// walker. The first proper cycle is the outer contour, later ones are
/// holes.
#[derive(Clone, Debug)]
pub struct HalfFacet {
    /// Direction orthogonal to the facet plane, oriented with this side.
    pub orthogonal_direction: Vector3<Real>,
    pub cycles: Vec<FacetCycle>,
}

/// Visitor over the shell topology of a 3D solid.
///
/// Only the half-facet callback carries the information a flattening pass
/// needs; the remaining callbacks default to no-ops so implementors
/// override exactly what they use.
pub trait ShellVisitor {
    fn vertex(&mut self, _point: &Point3<Real>) {}
    fn half_edge(&mut self) {}
    fn s_half_edge(&mut self) {}
    fn s_half_loop(&mut self) {}
    fn s_face(&mut self) {}
    fn half_facet(&mut self, facet: &HalfFacet);
}

/// Exact Boolean engine over 2D and 3D solids.
pub trait GeometryBackend {
    type Nef3: Clone;
    type Nef2: Clone;
    type Polyhedron;

    /// In-place union of two 3D solids.
    fn union3(&self, lhs: &mut Self::Nef3, rhs: &Self::Nef3) -> Result<(), BackendError>;
    /// In-place intersection of two 3D solids.
    fn intersect3(&self, lhs: &mut Self::Nef3, rhs: &Self::Nef3) -> Result<(), BackendError>;

    /// 2-manifold test; defined for 3D solids only.
    fn is_simple(&self, solid: &Self::Nef3) -> bool;

    /// Intersect `solid` with the plane z=0, keeping only the planar
    /// section.
    fn plane_intersection(&self, solid: &Self::Nef3) -> Result<Self::Nef3, BackendError>;

    /// Walk every shell of every volume of `solid`, firing the visitor
    /// callbacks in topological order.
    fn walk_shells(
        &self,
        solid: &Self::Nef3,
        visitor: &mut dyn ShellVisitor,
    ) -> Result<(), BackendError>;

    /// The empty 2D region.
    fn empty_nef2(&self) -> Self::Nef2;
    /// Build a 2D region from a contour. Counter-clockwise contours mark
    /// their interior; clockwise contours mark the complement of it.
    fn nef2_from_contour(
        &self,
        contour: &[Point2<Real>],
        boundary: Boundary,
    ) -> Result<Self::Nef2, BackendError>;
    fn union2(&self, lhs: &mut Self::Nef2, rhs: &Self::Nef2) -> Result<(), BackendError>;
    fn intersect2(&self, lhs: &mut Self::Nef2, rhs: &Self::Nef2) -> Result<(), BackendError>;

    fn convex_hull3(&self, points: &[Point3<Real>]) -> Result<Self::Polyhedron, BackendError>;
    fn nef3_from_polyhedron(
        &self,
        polyhedron: Self::Polyhedron,
    ) -> Result<Self::Nef3, BackendError>;

    /// Convert a 3D solid to a triangulated PolySet; `None` when the solid
    /// has no boundary representation to convert.
    fn nef3_to_polyset(&self, solid: &Self::Nef3) -> Option<PolySet>;
    /// Tessellate a 2D region into triangles in the z=0 plane.
    fn nef2_to_polyset(&self, region: &Self::Nef2) -> PolySet;
    /// Extract the boundary contours of a 2D region.
    fn nef2_to_contours(&self, region: &Self::Nef2) -> ContourSet;

    fn error_behaviour(&self) -> FailureBehaviour;
    /// Install `behaviour`, returning the previous policy.
    fn set_error_behaviour(&self, behaviour: FailureBehaviour) -> FailureBehaviour;
}

/// Scoped failure-policy override. Restores the previous policy when
/// dropped, on every exit path.
pub struct ScopedBehaviour<'a, B: GeometryBackend + ?Sized> {
    backend: &'a B,
    previous: FailureBehaviour,
}

impl<'a, B: GeometryBackend + ?Sized> ScopedBehaviour<'a, B> {
    pub fn new(backend: &'a B, behaviour: FailureBehaviour) -> Self {
        let previous = backend.set_error_behaviour(behaviour);
        ScopedBehaviour { backend, previous }
    }
}

impl<B: GeometryBackend + ?Sized> Drop for ScopedBehaviour<'_, B> {
    fn drop(&mut self) {
        self.backend.set_error_behaviour(self.previous);
    }
}
