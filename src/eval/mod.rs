//! Shell evaluators: Cartesian GTO values (and derived tensors) on a grid block.
//!
//! The block iterator hands each surviving shell to a [`ShellEvaluator`]
//! together with the screened primitive exponentials and the displacements of
//! the block's points from the shell centre. The evaluator writes Cartesian
//! values with layout `[comp][ctr][cart][grid]`; the iterator takes care of
//! the spherical transform and of placing the values in the output.
//!
//! The evaluator is chosen once per driver call and dispatched statically.

pub mod cart;

pub use cart::{Deriv, Dipole};

use crate::screen;
use crate::types::ShellRef;

/// Evaluation of one contracted shell on one grid block.
pub trait ShellEvaluator: Sync {
    /// Number of tensor components written per basis function.
    fn ncomp(&self) -> usize;

    /// Write `ncomp × nctr × ncart(l) × bs` values into `out`.
    ///
    /// * `center` — nuclear coordinate of the shell's atom.
    /// * `eprim`  — `[prim][bs]` output of [`ShellEvaluator::prim_exp`], already
    ///   scaled by the normalisation factor of `l`.
    /// * `coord`  — `[xyz][bs]` displacements of the points from `center`.
    fn eval(
        &self,
        out:    &mut [f64],
        shell:  &ShellRef<'_>,
        center: [f64; 3],
        eprim:  &[f64],
        coord:  &[f64],
        bs:     usize,
    );

    /// Screened primitive exponentials; see [`screen::prim_exp`].
    fn prim_exp(
        &self,
        eprim:  &mut [f64],
        coord:  &[f64],
        shell:  &ShellRef<'_>,
        bs:     usize,
        fac:    f64,
        cutoff: f64,
    ) -> bool {
        screen::prim_exp(eprim, coord, shell.exps, shell.coeffs, shell.nctr, bs, fac, cutoff)
    }
}

impl<E: ShellEvaluator + ?Sized> ShellEvaluator for &E {
    fn ncomp(&self) -> usize { (**self).ncomp() }

    fn eval(
        &self,
        out:    &mut [f64],
        shell:  &ShellRef<'_>,
        center: [f64; 3],
        eprim:  &[f64],
        coord:  &[f64],
        bs:     usize,
    ) {
        (**self).eval(out, shell, center, eprim, coord, bs)
    }

    fn prim_exp(
        &self,
        eprim:  &mut [f64],
        coord:  &[f64],
        shell:  &ShellRef<'_>,
        bs:     usize,
        fac:    f64,
        cutoff: f64,
    ) -> bool {
        (**self).prim_exp(eprim, coord, shell, bs, fac, cutoff)
    }
}
