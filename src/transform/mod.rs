//! Cartesian → spherical-harmonic transformation module.
//!
//! The grid engine consumes the transform through [`SphericalTransform`];
//! [`SolidHarmonics`] is the libcint-compatible implementation.

pub mod cart2sph;

pub use cart2sph::{SolidHarmonics, SphericalTransform};
