//! Built-in Cartesian shell evaluators.
//!
//! Per grid point the powers `x^n, y^n, z^n` of the displacement from the
//! shell centre are tabulated once; derivatives and shifted origins are then
//! obtained from the polynomial recurrences in [`crate::recur::poly`].

use crate::recur::poly::{nabla1_xyz, x1_xyz};
use crate::types::{ShellRef, CART_TABLES, LMAX};

use super::ShellEvaluator;

/// Powers table length: values need `l`, the Hessian reads up to `l+2`.
const NPOW: usize = LMAX + 3;

/// Which derivatives of the orbitals to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deriv {
    /// φ
    #[default]
    Value,
    /// φ, ∂xφ, ∂yφ, ∂zφ
    Gradient,
    /// φ, ∂x, ∂y, ∂z, ∂xx, ∂xy, ∂xz, ∂yy, ∂yz, ∂zz
    Hessian,
}

/// Position-weighted orbitals `(r − origin)·φ`, one component per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dipole {
    pub origin: [f64; 3],
}

#[inline]
fn fill_powers(p: &mut [[f64; 3]; NPOW], r: [f64; 3], nmax: usize) {
    p[0] = [1.0; 3];
    for n in 1..=nmax {
        for k in 0..3 {
            p[n][k] = p[n - 1][k] * r[k];
        }
    }
}

#[inline]
fn point(coord: &[f64], bs: usize, i: usize) -> [f64; 3] {
    [coord[i], coord[bs + i], coord[2 * bs + i]]
}

/// Contracted radial factor `Σ_j c_kj · eprim_j(i)`.
#[inline]
fn contract(shell: &ShellRef<'_>, eprim: &[f64], bs: usize, k: usize, i: usize) -> f64 {
    let np = shell.nprim;
    let ck = &shell.coeffs[k * np..(k + 1) * np];
    ck.iter().enumerate().map(|(j, &c)| c * eprim[j * bs + i]).sum()
}

impl ShellEvaluator for Deriv {
    fn ncomp(&self) -> usize {
        match self {
            Deriv::Value => 1,
            Deriv::Gradient => 4,
            Deriv::Hessian => 10,
        }
    }

    fn eval(
        &self,
        out:    &mut [f64],
        shell:  &ShellRef<'_>,
        _center: [f64; 3],
        eprim:  &[f64],
        coord:  &[f64],
        bs:     usize,
    ) {
        match self {
            Deriv::Value => eval_value(out, shell, eprim, coord, bs),
            Deriv::Gradient => eval_deriv(out, shell, eprim, coord, bs, false),
            Deriv::Hessian => eval_deriv(out, shell, eprim, coord, bs, true),
        }
    }
}

fn eval_value(out: &mut [f64], shell: &ShellRef<'_>, eprim: &[f64], coord: &[f64], bs: usize) {
    let l = shell.l;
    let cart = CART_TABLES[l];
    let nf = cart.len();
    let mut p = [[0.0; 3]; NPOW];

    for i in 0..bs {
        fill_powers(&mut p, point(coord, bs, i), l);
        for k in 0..shell.nctr {
            let s = contract(shell, eprim, bs, k, i);
            let base = k * nf * bs + i;
            for (n, &[lx, ly, lz]) in cart.iter().enumerate() {
                out[base + n * bs] = s * p[lx as usize][0] * p[ly as usize][1] * p[lz as usize][2];
            }
        }
    }
}

/// Gradient (and optionally Hessian) by applying the derivative recurrence per primitive.
fn eval_deriv(
    out:     &mut [f64],
    shell:   &ShellRef<'_>,
    eprim:   &[f64],
    coord:   &[f64],
    bs:      usize,
    hessian: bool,
) {
    let l = shell.l;
    let cart = CART_TABLES[l];
    let nf = cart.len();
    let np = shell.nprim;
    let nc = shell.nctr;
    let stride = nc * nf * bs;
    let ncomp = if hessian { 10 } else { 4 };
    out[..ncomp * stride].fill(0.0);

    let mut p = [[0.0; 3]; NPOW];
    let mut d1 = [[0.0; 3]; NPOW];
    let mut d2 = [[0.0; 3]; NPOW];

    for i in 0..bs {
        fill_powers(&mut p, point(coord, bs, i), l + 2);
        for (j, &a) in shell.exps.iter().enumerate() {
            let e = eprim[j * bs + i];
            if e == 0.0 {
                continue;
            }
            if hessian {
                nabla1_xyz(&mut d1, &p, l + 1, a);
                nabla1_xyz(&mut d2, &d1, l, a);
            } else {
                nabla1_xyz(&mut d1, &p, l, a);
            }
            for k in 0..nc {
                let ce = shell.coeffs[k * np + j] * e;
                let base = k * nf * bs + i;
                for (n, &[lx, ly, lz]) in cart.iter().enumerate() {
                    let (lx, ly, lz) = (lx as usize, ly as usize, lz as usize);
                    let (px, py, pz) = (p[lx][0], p[ly][1], p[lz][2]);
                    let (gx, gy, gz) = (d1[lx][0], d1[ly][1], d1[lz][2]);
                    let idx = base + n * bs;
                    out[idx]              += ce * px * py * pz;
                    out[idx + stride]     += ce * gx * py * pz;
                    out[idx + 2 * stride] += ce * px * gy * pz;
                    out[idx + 3 * stride] += ce * px * py * gz;
                    if hessian {
                        let (hx, hy, hz) = (d2[lx][0], d2[ly][1], d2[lz][2]);
                        out[idx + 4 * stride] += ce * hx * py * pz;
                        out[idx + 5 * stride] += ce * gx * gy * pz;
                        out[idx + 6 * stride] += ce * gx * py * gz;
                        out[idx + 7 * stride] += ce * px * hy * pz;
                        out[idx + 8 * stride] += ce * px * gy * gz;
                        out[idx + 9 * stride] += ce * px * py * hz;
                    }
                }
            }
        }
    }
}

impl ShellEvaluator for Dipole {
    fn ncomp(&self) -> usize { 3 }

    fn eval(
        &self,
        out:    &mut [f64],
        shell:  &ShellRef<'_>,
        center: [f64; 3],
        eprim:  &[f64],
        coord:  &[f64],
        bs:     usize,
    ) {
        let l = shell.l;
        let cart = CART_TABLES[l];
        let nf = cart.len();
        let stride = shell.nctr * nf * bs;
        // r - O = (r - R) + (R - O)
        let shift = [
            center[0] - self.origin[0],
            center[1] - self.origin[1],
            center[2] - self.origin[2],
        ];
        let mut p = [[0.0; 3]; NPOW];
        let mut t = [[0.0; 3]; NPOW];

        for i in 0..bs {
            fill_powers(&mut p, point(coord, bs, i), l + 1);
            x1_xyz(&mut t, &p, l, shift);
            for k in 0..shell.nctr {
                let s = contract(shell, eprim, bs, k, i);
                let base = k * nf * bs + i;
                for (n, &[lx, ly, lz]) in cart.iter().enumerate() {
                    let (lx, ly, lz) = (lx as usize, ly as usize, lz as usize);
                    let (px, py, pz) = (p[lx][0], p[ly][1], p[lz][2]);
                    let idx = base + n * bs;
                    out[idx]              = s * t[lx][0] * py * pz;
                    out[idx + stride]     = s * px * t[ly][1] * pz;
                    out[idx + 2 * stride] = s * px * py * t[lz][2];
                }
            }
        }
    }
}
