//! Evaluation of one grid block over a contiguous, atom-aligned shell range.
//!
//! A [`BlockPlan`] is the validated form of a driver call: it checks the
//! shell range and the engine limits once, before any scratch exists, and
//! then evaluates any number of blocks. Per block it
//!
//!   1. computes the grid→atom displacements of every atom in the range,
//!   2. walks the shells in order, consulting the screening flag and the
//!      primitive screener,
//!   3. evaluates surviving shells (plus the spherical transform for l ≥ 2)
//!      and transposes them into the output, or zero fills their columns.

use std::ops::Range;

use crate::error::{GridError, Result};
use crate::eval::ShellEvaluator;
use crate::layout::{set_zero, transpose};
use crate::options::EvalOptions;
use crate::transform::SphericalTransform;
use crate::types::{
    common_fac_sp, ncart, nsph, Basis, Layout,
    LMAX, MAX_BLKSIZE, NCTR_CART, NCTR_SPH, NPRIMAX,
};

/// Per-worker buffers, sized from the engine maxima for one plan.
pub struct Scratch {
    /// `[prim][bs]` screened exponentials.
    eprim:    Vec<f64>,
    /// `[comp][ctr][cart][bs]` evaluator output.
    cart:     Vec<f64>,
    /// `[ctr][sph][bs]` spherical rows of one component.
    sph:      Vec<f64>,
    /// `[atom][xyz][bs]` displacements.
    grid2atm: Vec<f64>,
}

/// Displacements `r_g − R_a` for atoms `atoms`, stored `[atom][xyz][grid]`.
pub fn fill_grid2atm(grid2atm: &mut [f64], coords: &[[f64; 3]], basis: &Basis, atoms: Range<usize>) {
    let bs = coords.len();
    for (buf, ia) in grid2atm.chunks_exact_mut(3 * bs).zip(atoms) {
        let r_atm = basis.atom_coord(ia);
        for (k, axis) in buf.chunks_exact_mut(bs).enumerate() {
            for (d, r) in axis.iter_mut().zip(coords) {
                *d = r[k] - r_atm[k];
            }
        }
    }
}

/// A validated shell range ready to be evaluated block by block.
pub struct BlockPlan<'a, E, T> {
    basis:     &'a Basis,
    evaluator: &'a E,
    transform: &'a T,
    shls:      Range<usize>,
    atoms:     Range<usize>,
    /// First output column of the range.
    col0:      usize,
    nao:       usize,
    ncomp:     usize,
    layout:    Layout,
    cutoff:    f64,
    blksize:   usize,
}

impl<'a, E: ShellEvaluator, T: SphericalTransform> BlockPlan<'a, E, T> {
    /// Validate `shls` against the basis and the engine limits.
    ///
    /// The range must be non-empty and start and end on atom boundaries;
    /// every shell in it must fit the scratch buffers.
    pub fn new(
        basis:     &'a Basis,
        evaluator: &'a E,
        transform: &'a T,
        options:   &EvalOptions,
        shls:      Range<usize>,
    ) -> Result<Self> {
        let EvalOptions { blksize, layout, cutoff } = *options;
        if blksize == 0 || blksize > MAX_BLKSIZE {
            return Err(GridError::InvalidBlockSize { blksize, max: MAX_BLKSIZE });
        }
        if !(cutoff > 0.0) {
            return Err(GridError::InvalidCutoff(cutoff));
        }

        let nbas = basis.nbas();
        let Range { start, end } = shls.clone();
        if start >= end || end > nbas {
            return Err(GridError::ShellRange { start, end, nbas });
        }
        if start > 0 && basis.atom_of(start - 1) == basis.atom_of(start) {
            return Err(GridError::AtomBoundary { shell: start });
        }
        if end < nbas && basis.atom_of(end) == basis.atom_of(end - 1) {
            return Err(GridError::AtomBoundary { shell: end });
        }
        let atm_start = basis.atom_of(start);
        let atm_end = basis.atom_of(end - 1) + 1;

        for ib in start..end {
            let sh = basis.shell(ib);
            if sh.atom < atm_start || sh.atom >= atm_end {
                return Err(GridError::AtomOrder { shell: ib, atom: sh.atom, atm_start, atm_end });
            }
            check_shell_limits(ib, sh.l, sh.nprim, sh.nctr, layout)?;
        }

        let ao_loc = basis.ao_loc(layout);
        Ok(BlockPlan {
            basis,
            evaluator,
            transform,
            shls,
            atoms: atm_start..atm_end,
            col0: ao_loc[start],
            nao: ao_loc[nbas],
            ncomp: evaluator.ncomp(),
            layout,
            cutoff,
            blksize,
        })
    }

    #[inline] pub fn nao(&self) -> usize { self.nao }
    #[inline] pub fn ncomp(&self) -> usize { self.ncomp }
    #[inline] pub fn blksize(&self) -> usize { self.blksize }
    #[inline] pub fn shls(&self) -> Range<usize> { self.shls.clone() }

    /// Fresh scratch for one worker.
    pub fn scratch(&self) -> Scratch {
        let n = self.blksize;
        Scratch {
            eprim: vec![0.0; NPRIMAX * n],
            cart: vec![0.0; NCTR_CART * n * self.ncomp],
            sph: match self.layout {
                Layout::Spherical => vec![0.0; NCTR_SPH * n],
                Layout::Cartesian => Vec::new(),
            },
            grid2atm: vec![0.0; self.atoms.len() * 3 * n],
        }
    }

    /// Evaluate one block with full argument checks.
    ///
    /// `out` holds one slice per tensor component, each covering the block's
    /// `coords.len()` rows of `nao` columns. `non0` is the block's screening
    /// row indexed by absolute shell id (`None` enables every shell).
    pub fn eval_block(
        &self,
        scratch: &mut Scratch,
        out:     &mut [&mut [f64]],
        coords:  &[[f64; 3]],
        non0:    Option<&[bool]>,
    ) -> Result<usize> {
        let bs = coords.len();
        if bs == 0 || bs > self.blksize {
            return Err(GridError::InvalidBlockSize { blksize: bs, max: self.blksize });
        }
        if out.len() != self.ncomp {
            return Err(GridError::OutputSize { expected: self.ncomp, found: out.len() });
        }
        if let Some(ao) = out.iter().find(|ao| ao.len() < bs * self.nao) {
            return Err(GridError::OutputSize { expected: bs * self.nao, found: ao.len() });
        }
        self.check_scratch(scratch, bs)?;
        if let Some(row) = non0 {
            if row.len() != self.basis.nbas() {
                return Err(GridError::ScreeningShape {
                    rows: 1,
                    cols: row.len(),
                    need_rows: 1,
                    need_cols: self.basis.nbas(),
                });
            }
        }
        Ok(self.run_block(scratch, out, coords, non0))
    }

    /// A scratch from another plan may be too small for this one.
    fn check_scratch(&self, scratch: &Scratch, bs: usize) -> Result<()> {
        let need = [
            ("eprim", NPRIMAX * bs, scratch.eprim.len()),
            ("cart", NCTR_CART * bs * self.ncomp, scratch.cart.len()),
            ("grid2atm", self.atoms.len() * 3 * bs, scratch.grid2atm.len()),
            (
                "sph",
                if self.layout == Layout::Spherical { NCTR_SPH * bs } else { 0 },
                scratch.sph.len(),
            ),
        ];
        match need.into_iter().find(|&(_, expected, found)| found < expected) {
            Some((buffer, expected, found)) => Err(GridError::ScratchSize { buffer, expected, found }),
            None => Ok(()),
        }
    }

    /// Block iterator proper; arguments are trusted. Returns the number of
    /// shells that were evaluated rather than zero filled.
    pub(crate) fn run_block(
        &self,
        scratch: &mut Scratch,
        out:     &mut [&mut [f64]],
        coords:  &[[f64; 3]],
        non0:    Option<&[bool]>,
    ) -> usize {
        let bs = coords.len();
        let nao = self.nao;
        let Scratch { eprim, cart, sph, grid2atm } = scratch;
        let grid2atm = &mut grid2atm[..self.atoms.len() * 3 * bs];
        fill_grid2atm(grid2atm, coords, self.basis, self.atoms.clone());

        let mut ao_id = self.col0;
        let mut nevaluated = 0;
        for ib in self.shls.clone() {
            let sh = self.basis.shell(ib);
            let deg = self.layout.degeneracy(sh.l);
            let counts = deg * sh.nctr;
            let off = (sh.atom - self.atoms.start) * 3 * bs;
            let pcoord = &grid2atm[off..off + 3 * bs];
            let eprim = &mut eprim[..sh.nprim * bs];
            let flagged = non0.map_or(true, |row| row[ib]);

            if flagged
                && self.evaluator.prim_exp(eprim, pcoord, &sh, bs, common_fac_sp(sh.l), self.cutoff)
            {
                let nf = ncart(sh.l);
                let comp_len = sh.nctr * nf * bs;
                let cart = &mut cart[..self.ncomp * comp_len];
                let center = self.basis.atom_coord(sh.atom);
                self.evaluator.eval(cart, &sh, center, eprim, pcoord, bs);

                let spherical = self.layout == Layout::Spherical && sh.l >= 2;
                for (pcart, ao) in cart.chunks_exact(comp_len).zip(out.iter_mut()) {
                    if spherical {
                        let sph = &mut sph[..counts * bs];
                        for (gsph, gcart) in sph.chunks_exact_mut(deg * bs).zip(pcart.chunks_exact(nf * bs)) {
                            self.transform.cart2sph(gsph, gcart, bs, sh.l);
                        }
                        transpose(ao, ao_id, nao, sph, bs, counts);
                    } else {
                        transpose(ao, ao_id, nao, pcart, bs, counts);
                    }
                }
                nevaluated += 1;
            } else {
                for ao in out.iter_mut() {
                    set_zero(ao, ao_id, nao, bs, counts);
                }
            }
            ao_id += counts;
        }
        nevaluated
    }
}

fn check_shell_limits(shell: usize, l: usize, nprim: usize, nctr: usize, layout: Layout) -> Result<()> {
    if l > LMAX {
        return Err(GridError::AngularMomentumTooHigh { shell, l, max: LMAX });
    }
    if nprim > NPRIMAX {
        return Err(GridError::TooManyPrimitives { shell, nprim, max: NPRIMAX });
    }
    // Cartesian rows are always produced, even for spherical output.
    let columns = nctr * ncart(l);
    if columns > NCTR_CART {
        return Err(GridError::TooManyContractions {
            shell,
            columns,
            max: NCTR_CART,
            layout: Layout::Cartesian.name(),
        });
    }
    if layout == Layout::Spherical && nctr * nsph(l) > NCTR_SPH {
        return Err(GridError::TooManyContractions {
            shell,
            columns: nctr * nsph(l),
            max: NCTR_SPH,
            layout: layout.name(),
        });
    }
    Ok(())
}
