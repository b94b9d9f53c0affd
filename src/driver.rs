//! Parallel grid driver: block partitioning and scheduling over `rayon`.
//!
//! The grid is cut into blocks of `blksize` points (the last one possibly
//! shorter) and every block is evaluated independently by
//! [`BlockPlan`](crate::block::BlockPlan).
//!
//! # Parallelism safety
//! The output tensor is `[comp][grid][nao]`. For block `ib` the written
//! elements of each component are exactly rows `ib*blksize .. ib*blksize+bs`,
//! and within them only the columns of the requested shell range. The rows
//! are handed out as disjoint `&mut` slices (`chunks_mut`), so workers never
//! alias and no locking is needed. Basis, coordinates and the screening
//! table are shared read-only.
//!
//! Blocks are scheduled one at a time (`with_max_len(1)`): the cost of a block
//! varies with how many shells survive screening, and rayon's work stealing
//! balances that dynamically. Each worker keeps one [`Scratch`] for all the
//! blocks it runs. No arithmetic crosses a block boundary, so the result is
//! bitwise independent of the number of threads.

use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::block::{BlockPlan, Scratch};
use crate::error::{GridError, Result};
use crate::eval::ShellEvaluator;
use crate::options::EvalOptions;
use crate::screen::ScreeningTable;
use crate::transform::{SolidHarmonics, SphericalTransform};
use crate::types::{Basis, Layout};

/// AO evaluation on grids for one basis and one evaluator.
///
/// ```ignore
/// let ao = GridAo::new(&basis, Deriv::Gradient).eval(&coords, None)?;
/// // ao[(comp * ngrids + ig) * nao + iao]
/// ```
pub struct GridAo<'a, E, T = SolidHarmonics> {
    basis:     &'a Basis,
    evaluator: E,
    transform: T,
    options:   EvalOptions,
}

impl<'a, E: ShellEvaluator> GridAo<'a, E> {
    pub fn new(basis: &'a Basis, evaluator: E) -> Self {
        GridAo { basis, evaluator, transform: SolidHarmonics, options: EvalOptions::default() }
    }
}

impl<'a, E: ShellEvaluator, T: SphericalTransform> GridAo<'a, E, T> {
    /// Replace the Cartesian → spherical transform.
    pub fn transform<U: SphericalTransform>(self, transform: U) -> GridAo<'a, E, U> {
        GridAo { basis: self.basis, evaluator: self.evaluator, transform, options: self.options }
    }

    pub fn options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn blksize(mut self, blksize: usize) -> Self {
        self.options.blksize = blksize;
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.options.layout = layout;
        self
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.options.cutoff = cutoff;
        self
    }

    /// Output column count (row stride) for the configured layout.
    pub fn nao(&self) -> usize { self.basis.nao(self.options.layout) }

    pub fn ncomp(&self) -> usize { self.evaluator.ncomp() }

    /// Number of `f64` values in the output for `ngrids` points.
    pub fn output_len(&self, ngrids: usize) -> usize { self.ncomp() * ngrids * self.nao() }

    /// Evaluate all shells on `coords` into a new `[comp][grid][nao]` buffer.
    pub fn eval(&self, coords: &[[f64; 3]], screen: Option<&ScreeningTable>) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.output_len(coords.len())];
        self.eval_into(coords, 0..self.basis.nbas(), screen, &mut out)?;
        Ok(out)
    }

    /// Evaluate the shells `shls` on `coords`, writing their columns of `out`.
    ///
    /// `out` must hold `ncomp × ngrids × nao` values; columns of shells outside
    /// `shls` are left untouched. `screen` row `ib` applies to points
    /// `ib*blksize ..`; `None` evaluates every shell on every block.
    pub fn eval_into(
        &self,
        coords: &[[f64; 3]],
        shls:   Range<usize>,
        screen: Option<&ScreeningTable>,
        out:    &mut [f64],
    ) -> Result<()> {
        let plan = BlockPlan::new(self.basis, &self.evaluator, &self.transform, &self.options, shls)?;
        let ngrids = coords.len();
        let (nao, ncomp, blksize) = (plan.nao(), plan.ncomp(), plan.blksize());

        let expected = ncomp * ngrids * nao;
        if out.len() != expected {
            return Err(GridError::OutputSize { expected, found: out.len() });
        }
        let nblk = ngrids.div_ceil(blksize);
        if let Some(table) = screen {
            table.check_shape(nblk, self.basis.nbas())?;
        }
        if ngrids == 0 || nao == 0 {
            return Ok(());
        }

        debug!(
            ngrids,
            nblk,
            blksize,
            nao,
            ncomp,
            shells = ?plan.shls(),
            layout = ?self.options.layout,
            "evaluating AOs on grid"
        );

        // blocks[ib][comp] = rows of block ib in component comp
        let mut blocks: Vec<Vec<&mut [f64]>> = (0..nblk).map(|_| Vec::with_capacity(ncomp)).collect();
        for comp in out.chunks_mut(ngrids * nao) {
            for (rows, block) in comp.chunks_mut(blksize * nao).zip(blocks.iter_mut()) {
                block.push(rows);
            }
        }

        blocks
            .into_par_iter()
            .enumerate()
            .with_max_len(1)
            .for_each_init(
                || plan.scratch(),
                |scratch: &mut Scratch, (ib, mut rows)| {
                    let ip = ib * blksize;
                    let bs = blksize.min(ngrids - ip);
                    let non0 = screen.map(|t| t.row(ib));
                    let nevaluated = plan.run_block(scratch, &mut rows, &coords[ip..ip + bs], non0);
                    trace!(block = ib, points = bs, nevaluated, "block done");
                },
            );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
