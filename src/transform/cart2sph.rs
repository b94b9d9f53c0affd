//! Cartesian to real spherical harmonic (RSH) transformation.
//!
//! For l ≤ 1 the grid engine never transforms: s and p functions carry their
//! normalisation in `common_fac_sp` and keep the Cartesian (x, y, z) order.
//! For l ≥ 2 each contraction's `ncart(l)` Cartesian rows are contracted into
//! `2l+1` real solid harmonics, ordered m = −l, …, l as in libcint:
//!
//!   d_{-2} = 1.0925 xy
//!   d_{-1} = 1.0925 yz
//!   d_{0}  = 0.6308 zz − 0.3154 (xx + yy)
//!   d_{1}  = 1.0925 xz
//!   d_{2}  = 0.5463 (xx − yy)
//!
//! The coefficients for every l are generated from the Schlegel–Frisch
//! expansion of r^l·Y_lm with the unit-sphere normalisation sqrt((2l+1)/4π),
//! once per process.

use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::types::{ncart, nsph, LMAX};

/// Cartesian → spherical contraction of one shell block.
pub trait SphericalTransform: Sync {
    /// Transform `gcart` (`[ncart(l)][nrow]`) into `gsph` (`[2l+1][nrow]`).
    fn cart2sph(&self, gsph: &mut [f64], gcart: &[f64], nrow: usize, l: usize);
}

/// Real solid harmonics in libcint convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidHarmonics;

/// Sparse rows: for each spherical component, the non-zero `(cart, coeff)` pairs.
type C2sRows = Vec<Vec<(usize, f64)>>;

static C2S_TABLES: OnceLock<Vec<C2sRows>> = OnceLock::new();

fn c2s_tables() -> &'static [C2sRows] {
    C2S_TABLES.get_or_init(|| {
        (0..=LMAX)
            .map(|l| {
                let dense = c2s_matrix(l);
                let nc = ncart(l);
                (0..nsph(l))
                    .map(|s| {
                        (0..nc)
                            .map(|c| (c, dense[s * nc + c]))
                            .filter(|&(_, v)| v.abs() > 1e-14)
                            .collect()
                    })
                    .collect()
            })
            .collect()
    })
}

impl SphericalTransform for SolidHarmonics {
    fn cart2sph(&self, gsph: &mut [f64], gcart: &[f64], nrow: usize, l: usize) {
        if l < 2 {
            let n = nrow * ncart(l);
            gsph[..n].copy_from_slice(&gcart[..n]);
            return;
        }
        for (s, row) in c2s_tables()[l].iter().enumerate() {
            let dst = &mut gsph[s * nrow..(s + 1) * nrow];
            dst.fill(0.0);
            for &(c, coef) in row {
                let src = &gcart[c * nrow..(c + 1) * nrow];
                for (d, &g) in dst.iter_mut().zip(src) {
                    *d += coef * g;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Coefficient generation
// ─────────────────────────────────────────────────────────────────

fn fact(n: usize) -> f64 {
    (1..=n).map(|i| i as f64).product()
}

fn binom(n: usize, k: usize) -> f64 {
    if k > n { 0.0 } else { fact(n) / (fact(k) * fact(n - k)) }
}

/// Position of `x^lx y^ly z^lz` in the libcint Cartesian order of shell `l`.
#[inline]
fn cart_index(l: usize, lx: usize, lz: usize) -> usize {
    (l - lx) * (l - lx + 1) / 2 + lz
}

/// Dense `[2l+1][ncart(l)]` matrix, row `s` ↔ m = s − l.
pub fn c2s_matrix(l: usize) -> Vec<f64> {
    let nc = ncart(l);
    let mut mat = vec![0.0; nsph(l) * nc];
    let norm = ((2 * l + 1) as f64 / (4.0 * PI)).sqrt();

    for (s, row) in mat.chunks_mut(nc).enumerate() {
        let m = s as i64 - l as i64;
        let am = m.unsigned_abs() as usize;
        let pref = if m == 0 { norm } else { norm * 2f64.sqrt() };
        let pi_norm = (fact(l - am) / fact(l + am)).sqrt() / 2f64.powi(l as i32);

        for k in 0..=(l - am) / 2 {
            let zpow = l - 2 * k - am;
            let ck = if k % 2 == 0 { 1.0 } else { -1.0 }
                * binom(l, k) * binom(2 * l - 2 * k, l) * fact(l - 2 * k) / fact(zpow);
            // Re/Im of (x + iy)^|m|: cos or sin of (|m| − p)·π/2
            for p in 0..=am {
                let phase = match ((am - p) % 4, m >= 0) {
                    (0, true) => 1.0,
                    (2, true) => -1.0,
                    (1, false) => 1.0,
                    (3, false) => -1.0,
                    _ => continue,
                };
                let cp = binom(am, p) * phase;
                // r^{2k} = Σ k!/(a!b!c!) x^{2a} y^{2b} z^{2c}
                for a in 0..=k {
                    for b in 0..=(k - a) {
                        let c = k - a - b;
                        let multi = fact(k) / (fact(a) * fact(b) * fact(c));
                        let lx = p + 2 * a;
                        let lz = zpow + 2 * c;
                        row[cart_index(l, lx, lz)] += pref * pi_norm * ck * cp * multi;
                    }
                }
            }
        }
    }
    mat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CART_TABLES;
    use approx::assert_relative_eq;

    fn coeff(l: usize, s: usize, lxyz: [u8; 3]) -> f64 {
        let c = CART_TABLES[l].iter().position(|&t| t == lxyz).unwrap();
        c2s_matrix(l)[s * ncart(l) + c]
    }

    #[test]
    fn d_coefficients_match_libcint() {
        assert_relative_eq!(coeff(2, 0, [1, 1, 0]), 1.092548430592079070, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 1, [0, 1, 1]), 1.092548430592079070, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 2, [2, 0, 0]), -0.315391565252520002, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 2, [0, 2, 0]), -0.315391565252520002, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 2, [0, 0, 2]), 0.630783130505040012, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 3, [1, 0, 1]), 1.092548430592079070, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 4, [2, 0, 0]), 0.546274215296039535, max_relative = 1e-14);
        assert_relative_eq!(coeff(2, 4, [0, 2, 0]), -0.546274215296039535, max_relative = 1e-14);
        assert_eq!(coeff(2, 0, [2, 0, 0]), 0.0);
    }

    #[test]
    fn f_coefficients_match_libcint() {
        let cases: [(usize, [u8; 3], f64); 10] = [
            (0, [2, 1, 0], 1.770130769779930531),
            (0, [0, 3, 0], -0.590043589926643510),
            (1, [1, 1, 1], 2.890611442640554055),
            (2, [0, 1, 2], 1.828183197857862944),
            (2, [2, 1, 0], -0.457045799464465739),
            (3, [0, 0, 3], 0.746352665180230782),
            (3, [2, 0, 1], -1.119528997770346170),
            (4, [1, 0, 2], 1.828183197857862944),
            (5, [0, 2, 1], -1.445305721320277020),
            (6, [1, 2, 0], -1.770130769779930531),
        ];
        for (s, lxyz, want) in cases {
            assert_relative_eq!(coeff(3, s, lxyz), want, max_relative = 1e-13);
        }
    }

    #[test]
    fn harmonics_vanish_under_laplacian_trace() {
        // r^l Y_lm is harmonic, so contracting xx + yy + zz pairs must cancel:
        // for every (l-2) monomial, Σ_axis c[mono + 2·axis] = 0 after weighting
        // by the second-derivative factors.
        for l in 2..=LMAX {
            let mat = c2s_matrix(l);
            let nc = ncart(l);
            for s in 0..nsph(l) {
                for &[ax, ay, az] in CART_TABLES[l - 2] {
                    let (ax, ay, az) = (ax as usize, ay as usize, az as usize);
                    let lap = (ax + 2) as f64 * (ax + 1) as f64 * mat[s * nc + cart_index(l, ax + 2, az)]
                        + (ay + 2) as f64 * (ay + 1) as f64 * mat[s * nc + cart_index(l, ax, az)]
                        + (az + 2) as f64 * (az + 1) as f64 * mat[s * nc + cart_index(l, ax, az + 2)];
                    assert!(lap.abs() < 1e-10, "l={l} s={s} lap={lap}");
                }
            }
        }
    }

    #[test]
    fn transform_contracts_rows() {
        let nrow = 3;
        let mut gcart = vec![0.0; 6 * nrow];
        // xy = 1 on row 0, zz = 2 on row 2
        gcart[nrow] = 1.0;
        gcart[5 * nrow + 2] = 2.0;
        let mut gsph = vec![f64::NAN; 5 * nrow];
        SolidHarmonics.cart2sph(&mut gsph, &gcart, nrow, 2);
        assert_relative_eq!(gsph[0], 1.092548430592079070, max_relative = 1e-14);
        assert_eq!(gsph[1], 0.0);
        assert_relative_eq!(gsph[2 * nrow + 2], 2.0 * 0.630783130505040012, max_relative = 1e-14);
        assert_eq!(gsph[4 * nrow + 2], 0.0);
    }

    #[test]
    fn s_and_p_pass_through() {
        let gcart = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut gsph = [0.0; 6];
        SolidHarmonics.cart2sph(&mut gsph, &gcart, 2, 1);
        assert_eq!(gsph, gcart);
    }
}
