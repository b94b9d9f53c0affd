//! One-centre polynomial recurrences for Cartesian Gaussians on a grid.
//!
//! Along one axis a Cartesian Gaussian factor is `x^n · exp(-a·x²)`. With the
//! powers `f0[i] = x^i` stored in an array, both the derivative and a shift of
//! origin reduce to three-term recurrences over that array:
//!
//!   d/dx [x^n e^{-a x²}] = (n x^{n-1} − 2a x^{n+1}) e^{-a x²}
//!   (x + d) · x^n        = d·x^n + x^{n+1}
//!
//! Each routine writes indices `0..=l` of `out` and reads `0..=l+1` of `inp`;
//! the trailing slot `inp[l+1]` must be filled (zero if unused).

/// Derivative recurrence for exponent `a`:
/// `out[0] = -2a·inp[1]`, `out[i] = i·inp[i-1] - 2a·inp[i+1]`.
#[inline]
pub fn nabla1(out: &mut [f64], inp: &[f64], l: usize, a: f64) {
    let a2 = -2.0 * a;
    out[0] = a2 * inp[1];
    for i in 1..=l {
        out[i] = i as f64 * inp[i - 1] + a2 * inp[i + 1];
    }
}

/// Translation recurrence: `out[i] = d·inp[i] + inp[i+1]`, i.e. multiply by
/// `(x + d)` where `d` is the displacement of the new origin.
#[inline]
pub fn x1(out: &mut [f64], inp: &[f64], l: usize, d: f64) {
    for i in 0..=l {
        out[i] = d * inp[i] + inp[i + 1];
    }
}

/// [`nabla1`] on all three axes.
#[inline]
pub fn nabla1_xyz(out: &mut [[f64; 3]], inp: &[[f64; 3]], l: usize, a: f64) {
    let a2 = -2.0 * a;
    for k in 0..3 {
        out[0][k] = a2 * inp[1][k];
    }
    for i in 1..=l {
        let fi = i as f64;
        for k in 0..3 {
            out[i][k] = fi * inp[i - 1][k] + a2 * inp[i + 1][k];
        }
    }
}

/// [`x1`] on all three axes with displacement `d`.
#[inline]
pub fn x1_xyz(out: &mut [[f64; 3]], inp: &[[f64; 3]], l: usize, d: [f64; 3]) {
    for i in 0..=l {
        for k in 0..3 {
            out[i][k] = d[k] * inp[i][k] + inp[i + 1][k];
        }
    }
}
