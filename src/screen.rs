//! Grid screening: the per-block shell table and the primitive exponential screener.
//!
//! Two levels of screening decide whether a shell is evaluated on a block:
//!
//! * [`ScreeningTable`] — an externally computed `[block][shell]` flag table.
//!   A false flag is a hard skip; the shell's columns are zero filled.
//! * [`prim_exp`] — for flagged shells, the exponential `exp(-a·r²)` of each
//!   primitive is only computed where `a·r² − log max|c|` stays below the
//!   cutoff. A shell whose primitives are all screened on every point of the
//!   block is zero filled as well.

use crate::error::{GridError, Result};

/// Boolean `[block][shell]` table marking shells that may be non-zero on a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningTable {
    nblocks: usize,
    nbas:    usize,
    flags:   Vec<bool>,
}

impl ScreeningTable {
    /// Table with every shell enabled on every block.
    pub fn all_true(nblocks: usize, nbas: usize) -> Self {
        ScreeningTable { nblocks, nbas, flags: vec![true; nblocks * nbas] }
    }

    /// Wrap a row-major `nblocks × nbas` flag matrix.
    pub fn from_flags(nblocks: usize, nbas: usize, flags: Vec<bool>) -> Result<Self> {
        if flags.len() != nblocks * nbas {
            return Err(GridError::ScreeningShape {
                rows: if nbas == 0 { 0 } else { flags.len() / nbas },
                cols: nbas,
                need_rows: nblocks,
                need_cols: nbas,
            });
        }
        Ok(ScreeningTable { nblocks, nbas, flags })
    }

    #[inline] pub fn nblocks(&self) -> usize { self.nblocks }
    #[inline] pub fn nbas(&self) -> usize { self.nbas }

    /// Flags of block `ib`, indexed by absolute shell id.
    ///
    /// # Panics
    /// If `ib >= nblocks()`.
    #[inline]
    pub fn row(&self, ib: usize) -> &[bool] {
        &self.flags[ib * self.nbas..(ib + 1) * self.nbas]
    }

    /// Disable (or re-enable) shell `ibas` on block `ib`.
    ///
    /// # Panics
    /// If `ib >= nblocks()` or `ibas >= nbas()`.
    pub fn set(&mut self, ib: usize, ibas: usize, on: bool) {
        assert!(
            ib < self.nblocks && ibas < self.nbas,
            "flag ({ib}, {ibas}) outside a {}x{} screening table",
            self.nblocks,
            self.nbas
        );
        self.flags[ib * self.nbas + ibas] = on;
    }

    pub(crate) fn check_shape(&self, nblk: usize, nbas: usize) -> Result<()> {
        if self.nblocks < nblk || self.nbas != nbas {
            return Err(GridError::ScreeningShape {
                rows: self.nblocks,
                cols: self.nbas,
                need_rows: nblk,
                need_cols: nbas,
            });
        }
        Ok(())
    }
}

/// Screened primitive exponentials for one shell on one block.
///
/// `coord` holds the block's displacements from the shell centre as
/// `[xyz][bs]`; `coeffs` is `nctr × nprim`. On return
/// `eprim[j*bs + i] = fac · exp(-exps[j]·r_i²)` for every primitive that
/// passes the cutoff on point `i`, and exactly `0.0` otherwise.
///
/// Returns `true` when at least one exponential was evaluated.
///
/// `libm::exp` is used for the exponential; it is accurate to within 1 ulp
/// on the whole screened range `[-(cutoff + log max|c|), 0]`, far below the
/// ~1e-22 magnitude of the terms dropped by the cutoff.
#[allow(clippy::too_many_arguments)]
pub fn prim_exp(
    eprim:  &mut [f64],
    coord:  &[f64],
    exps:   &[f64],
    coeffs: &[f64],
    nctr:   usize,
    bs:     usize,
    fac:    f64,
    cutoff: f64,
) -> bool {
    let nprim = exps.len();
    let (gridx, rest) = coord.split_at(bs);
    let (gridy, gridz) = rest.split_at(bs);
    let mut not0 = false;

    for (j, &alpha) in exps.iter().enumerate() {
        // the maximum value of the coefficients for this primitive
        let maxc = (0..nctr).fold(0.0_f64, |m, k| m.max(coeffs[k * nprim + j].abs()));
        let logc = libm::log(maxc);
        let ej = &mut eprim[j * bs..(j + 1) * bs];
        for i in 0..bs {
            let rr = gridx[i] * gridx[i] + gridy[i] * gridy[i] + gridz[i] * gridz[i];
            let arr = alpha * rr;
            if arr - logc < cutoff {
                ej[i] = libm::exp(-arr) * fac;
                not0 = true;
            } else {
                ej[i] = 0.0;
            }
        }
    }
    not0
}
