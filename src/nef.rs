//! Shared-ownership handle for backend solids, tagged by dimension.

use crate::backend::GeometryBackend;
use std::rc::Rc;

/// Dimension tag of a [`NefSolid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim {
    Two,
    Three,
}

enum Repr<B: GeometryBackend> {
    Two(Rc<B::Nef2>),
    Three(Rc<B::Nef3>),
}

impl<B: GeometryBackend> Clone for Repr<B> {
    fn clone(&self) -> Self {
        match self {
            Repr::Two(r) => Repr::Two(Rc::clone(r)),
            Repr::Three(r) => Repr::Three(Rc::clone(r)),
        }
    }
}

/// An evaluated solid: empty, a 2D region, or a 3D body. The payload is
/// shared by reference counting; cloning a handle shares it, [`Self::copy`]
/// detaches a deep clone.
pub struct NefSolid<B: GeometryBackend> {
    repr: Option<Repr<B>>,
}

impl<B: GeometryBackend> NefSolid<B> {
    pub const fn empty() -> Self {
        NefSolid { repr: None }
    }

    pub fn from_nef2(region: B::Nef2) -> Self {
        NefSolid {
            repr: Some(Repr::Two(Rc::new(region))),
        }
    }

    pub fn from_nef3(solid: B::Nef3) -> Self {
        NefSolid {
            repr: Some(Repr::Three(Rc::new(solid))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.repr.is_none()
    }

    pub fn dim(&self) -> Option<Dim> {
        match &self.repr {
            Some(Repr::Two(_)) => Some(Dim::Two),
            Some(Repr::Three(_)) => Some(Dim::Three),
            None => None,
        }
    }

    pub fn nef2(&self) -> Option<&B::Nef2> {
        match &self.repr {
            Some(Repr::Two(r)) => Some(r),
            _ => None,
        }
    }

    pub fn nef3(&self) -> Option<&B::Nef3> {
        match &self.repr {
            Some(Repr::Three(r)) => Some(r),
            _ => None,
        }
    }

    /// Exclusive access to a 2D payload for an in-place Boolean, detaching
    /// from shared owners first (copy-on-write).
    pub(crate) fn nef2_mut(&mut self) -> Option<&mut B::Nef2> {
        match &mut self.repr {
            Some(Repr::Two(r)) => Some(Rc::make_mut(r)),
            _ => None,
        }
    }

    /// Exclusive access to a 3D payload for an in-place Boolean, detaching
    /// from shared owners first (copy-on-write).
    pub(crate) fn nef3_mut(&mut self) -> Option<&mut B::Nef3> {
        match &mut self.repr {
            Some(Repr::Three(r)) => Some(Rc::make_mut(r)),
            _ => None,
        }
    }

    /// Deep copy of the payload, detached from every other handle. Callers
    /// take this before mutating in place, preserving what the other
    /// handles observe.
    pub fn copy(&self) -> Self {
        let repr = self.repr.as_ref().map(|repr| match repr {
            Repr::Two(r) => Repr::Two(Rc::new((**r).clone())),
            Repr::Three(r) => Repr::Three(Rc::new((**r).clone())),
        });
        NefSolid { repr }
    }
}

impl<B: GeometryBackend> Clone for NefSolid<B> {
    fn clone(&self) -> Self {
        NefSolid {
            repr: self.repr.clone(),
        }
    }
}

impl<B: GeometryBackend> Default for NefSolid<B> {
    fn default() -> Self {
        Self::empty()
    }
}
