//! gto-grid: screened, block-parallel evaluation of Gaussian-type orbitals on grids.
//!
//! This crate computes the values (and optionally derivatives) of contracted
//! Cartesian or spherical GTOs on large batches of grid points, the inner
//! kernel of numerical integration on DFT grids.
//!
//! # Layout
//! * The basis follows libcint's `atm`/`bas`/`env` tables ([`Basis`]).
//! * The output is a flat `[comp][grid][nao]` buffer; `nao` counts Cartesian
//!   or spherical functions depending on [`Layout`].
//! * Grids are processed in blocks of [`EvalOptions::blksize`] points. An
//!   optional [`ScreeningTable`] (`[block][shell]`) skips shells known to be
//!   negligible on a block; skipped columns are written as exact zeros.
//!
//! ```ignore
//! let engine = GridAo::new(&basis, Deriv::Value).layout(Layout::Cartesian);
//! let ao = engine.eval(&coords, None)?;
//! ```

pub mod types;
pub mod error;
pub mod options;
pub mod screen;
pub mod recur;
pub mod eval;
pub mod transform;
pub mod layout;
pub mod block;
pub mod driver;

// Re-export commonly used types
pub use block::{BlockPlan, Scratch};
pub use driver::GridAo;
pub use error::{ErrorKind, GridError, Result};
pub use eval::{Deriv, Dipole, ShellEvaluator};
pub use options::EvalOptions;
pub use screen::ScreeningTable;
pub use transform::{SolidHarmonics, SphericalTransform};
pub use types::{Basis, Layout, ShellRef};
