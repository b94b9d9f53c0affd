//! Placement of per-shell block results into the grid-major AO buffer.
//!
//! Shell evaluators produce `[orbital][grid]` rows with stride `bs`; the
//! output keeps one row of `nao` orbital columns per grid point. Both
//! routines below touch only columns `offset..offset+counts` of rows
//! `0..bs`, which is what makes per-shell and per-block writes disjoint.

/// Grid points per panel in the tiled transpose.
const TILE: usize = 16;

/// `ao[j*nao + offset + i] = aobuf[i*bs + j]` for `i < counts`, `j < bs`.
pub fn transpose(ao: &mut [f64], offset: usize, nao: usize, aobuf: &[f64], bs: usize, counts: usize) {
    if bs % TILE == 0 {
        for k in (0..bs).step_by(TILE) {
            for i in 0..counts {
                let src = &aobuf[i * bs + k..i * bs + k + TILE];
                for (dj, &v) in src.iter().enumerate() {
                    ao[(k + dj) * nao + offset + i] = v;
                }
            }
        }
    } else {
        for (i, src) in aobuf.chunks_exact(bs).take(counts).enumerate() {
            for (j, &v) in src.iter().enumerate() {
                ao[j * nao + offset + i] = v;
            }
        }
    }
}

/// Write exact zeros to columns `offset..offset+counts` of the first `bs` rows.
pub fn set_zero(ao: &mut [f64], offset: usize, nao: usize, bs: usize, counts: usize) {
    for row in ao.chunks_mut(nao).take(bs) {
        row[offset..offset + counts].fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untranspose(ao: &[f64], offset: usize, nao: usize, bs: usize, counts: usize) -> Vec<f64> {
        let mut buf = vec![0.0; counts * bs];
        for i in 0..counts {
            for j in 0..bs {
                buf[i * bs + j] = ao[j * nao + offset + i];
            }
        }
        buf
    }

    #[test]
    fn round_trip_for_tiled_and_plain_sizes() {
        for &(bs, counts, offset, nao) in &[(96, 7, 3, 12), (32, 1, 0, 1), (37, 5, 4, 9), (1, 3, 2, 5)] {
            let aobuf: Vec<f64> = (0..counts * bs).map(|v| v as f64 * 0.5 - 3.0).collect();
            let mut ao = vec![f64::NAN; bs * nao];
            transpose(&mut ao, offset, nao, &aobuf, bs, counts);
            assert_eq!(untranspose(&ao, offset, nao, bs, counts), aobuf);
            // columns outside the shell are untouched
            for j in 0..bs {
                for c in (0..offset).chain(offset + counts..nao) {
                    assert!(ao[j * nao + c].is_nan());
                }
            }
        }
    }

    #[test]
    fn set_zero_only_touches_its_columns() {
        let (nao, bs) = (6, 4);
        let mut ao = vec![1.5; nao * bs];
        set_zero(&mut ao, 2, nao, bs, 3);
        for j in 0..bs {
            assert_eq!(&ao[j * nao..(j + 1) * nao], &[1.5, 1.5, 0.0, 0.0, 0.0, 1.5]);
        }
    }

    #[test]
    fn last_row_may_be_shorter_than_nao() {
        // A block's last row slice only needs to reach the shell's last column.
        let (nao, bs, offset, counts) = (10, 3, 1, 2);
        let mut ao = vec![7.0; (bs - 1) * nao + offset + counts];
        set_zero(&mut ao, offset, nao, bs, counts);
        transpose(&mut ao, offset, nao, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], bs, counts);
        assert_eq!(ao[2 * nao + offset], 3.0);
        assert_eq!(ao[2 * nao + offset + 1], 6.0);
    }
}
