//! Configuration for a grid evaluation call.

use crate::types::{Layout, BLKSIZE, EXPCUTOFF};

/// Numerical settings shared by every block of a driver call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalOptions {
    /// Grid points per block, `1..=MAX_BLKSIZE`. Must match the block size the
    /// screening table was built for.
    pub blksize: usize,
    /// Cartesian or spherical output columns.
    pub layout: Layout,
    /// Primitive screening threshold on `a·r² − log max|c|`.
    ///
    /// The default of 50 drops terms below ~1e-22; `f64::INFINITY` disables
    /// primitive screening altogether.
    pub cutoff: f64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            blksize: BLKSIZE,
            layout: Layout::Spherical,
            cutoff: EXPCUTOFF,
        }
    }
}
