//! Scalar configuration shared across the crate.

/// Our Real scalar type.
pub type Real = f64;

/// Tolerance used for geometric comparisons throughout the crate.
pub const EPSILON: Real = 1e-8;

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// π/2
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;
