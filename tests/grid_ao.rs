use approx::{assert_abs_diff_eq, assert_relative_eq};
use gto_grid::transform::cart2sph::c2s_matrix;
use gto_grid::types::{common_fac_sp, ncart, nsph};
use gto_grid::{Basis, Deriv, Dipole, GridAo, Layout, ScreeningTable};

/// Two centres, s/p/d shells with multi-primitive contractions.
fn co_like() -> Basis {
    let mut basis = Basis::new();
    let c = basis.push_atom(6, [0.0, 0.0, 0.0]);
    let o = basis.push_atom(8, [0.0, 0.0, 2.13]);
    for (atom, scale) in [(c, 1.0), (o, 1.4)] {
        basis.push_shell(atom, 0, &[71.6 * scale, 13.0 * scale, 3.53 * scale], &[0.154, 0.535, 0.445]).unwrap();
        basis.push_shell(atom, 0, &[2.94, 0.683, 0.222], &[-0.1, 0.4, 0.7, 0.0, 0.0, 1.0]).unwrap();
        basis.push_shell(atom, 1, &[2.94, 0.683, 0.222], &[0.156, 0.607, 0.392]).unwrap();
        basis.push_shell(atom, 2, &[0.8 * scale], &[1.0]).unwrap();
    }
    basis
}

fn grid(n: usize) -> Vec<[f64; 3]> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            [0.9 * (0.37 * t).sin(), 1.1 * (0.23 * t).cos(), -1.0 + 0.02 * t]
        })
        .collect()
}

#[test]
fn s_function_at_its_centre_is_coefficient_times_norm() {
    let mut basis = Basis::new();
    let a = basis.push_atom(1, [0.3, -0.2, 1.7]);
    basis.push_shell(a, 0, &[0.75], &[0.42]).unwrap();
    for layout in [Layout::Cartesian, Layout::Spherical] {
        let ao = GridAo::new(&basis, Deriv::Value)
            .layout(layout)
            .eval(&[[0.3, -0.2, 1.7]], None)
            .unwrap();
        assert_eq!(ao, vec![0.42 * common_fac_sp(0)]);
    }
}

#[test]
fn false_flags_zero_every_component() {
    let basis = co_like();
    let coords = grid(40);
    let engine = GridAo::new(&basis, Deriv::Gradient).blksize(16);
    let mut table = ScreeningTable::all_true(3, basis.nbas());
    table.set(0, 2, false); // C p shell on block 0
    table.set(2, 7, false); // O d shell on block 2

    let mut ao = vec![f64::NAN; engine.output_len(coords.len())];
    engine.eval_into(&coords, 0..basis.nbas(), Some(&table), &mut ao).unwrap();
    assert!(ao.iter().all(|v| v.is_finite()));

    let nao = engine.nao();
    let ao_loc = basis.ao_loc(Layout::Spherical);
    let ngrids = coords.len();
    for comp in 0..4 {
        for ig in 0..ngrids {
            let row = &ao[(comp * ngrids + ig) * nao..(comp * ngrids + ig + 1) * nao];
            let p_cols = &row[ao_loc[2]..ao_loc[3]];
            let d_cols = &row[ao_loc[7]..ao_loc[8]];
            if ig < 16 {
                assert!(p_cols.iter().all(|&v| v == 0.0));
            } else {
                assert!(p_cols.iter().any(|&v| v != 0.0));
            }
            if ig >= 32 {
                assert!(d_cols.iter().all(|&v| v == 0.0));
            }
        }
    }
}

#[test]
fn shells_screened_on_the_whole_block_are_zero_filled() {
    let basis = co_like();
    // Far from both atoms: every primitive fails the cutoff.
    let coords = vec![[40.0, 0.0, 0.0], [0.0, -45.0, 3.0], [30.0, 30.0, 30.0]];
    let engine = GridAo::new(&basis, Deriv::Hessian).layout(Layout::Cartesian);
    let mut ao = vec![f64::NAN; engine.output_len(coords.len())];
    engine.eval_into(&coords, 0..basis.nbas(), None, &mut ao).unwrap();
    assert!(ao.iter().all(|&v| v == 0.0));
}

#[test]
fn primitive_cutoff_error_is_below_1e_minus_18() {
    let mut basis = Basis::new();
    let a = basis.push_atom(1, [0.0; 3]);
    for l in 0..=2 {
        basis.push_shell(a, l, &[1.0, 0.9], &[1.0, 0.05]).unwrap();
    }
    // r² between 45 and 60: straddles a·r² − log|c| = 50 for both primitives.
    let coords: Vec<[f64; 3]> = (0..64)
        .map(|i| {
            let r = (45.0 + 15.0 * i as f64 / 63.0).sqrt();
            let t = 0.1 * i as f64;
            [r * t.cos() * 0.6, r * t.sin() * 0.6, r * 0.8]
        })
        .collect();
    for deriv in [Deriv::Value, Deriv::Gradient] {
        let screened = GridAo::new(&basis, deriv).layout(Layout::Cartesian);
        let exact = GridAo::new(&basis, deriv).layout(Layout::Cartesian).cutoff(f64::INFINITY);
        let s = screened.eval(&coords, None).unwrap();
        let e = exact.eval(&coords, None).unwrap();
        let mut dropped = 0;
        for (&sv, &ev) in s.iter().zip(&e) {
            assert_abs_diff_eq!(sv, ev, epsilon = 1e-18);
            if sv == 0.0 && ev != 0.0 {
                dropped += 1;
            }
        }
        assert!(dropped > 0, "the grid never crossed the cutoff");
    }
}

#[test]
fn results_do_not_depend_on_block_partition() {
    let basis = co_like();
    let coords = grid(250);
    let big = GridAo::new(&basis, Deriv::Gradient).blksize(96);
    let full = big.eval(&coords, None).unwrap();
    let nao = big.nao();

    let small = GridAo::new(&basis, Deriv::Gradient).blksize(32);
    for range in [0..100, 100..180, 180..250] {
        let part = small.eval(&coords[range.clone()], None).unwrap();
        let n = range.len();
        for comp in 0..4 {
            for (k, ig) in range.clone().enumerate() {
                let got = &part[(comp * n + k) * nao..(comp * n + k + 1) * nao];
                let want = &full[(comp * 250 + ig) * nao..(comp * 250 + ig + 1) * nao];
                for (g, w) in got.iter().zip(want) {
                    assert_relative_eq!(*g, *w, epsilon = 1e-15, max_relative = 1e-14);
                }
            }
        }
    }
}

#[test]
fn atom_ranges_assemble_the_full_matrix() {
    let basis = co_like();
    let coords = grid(70);
    let engine = GridAo::new(&basis, Dipole { origin: [0.1, 0.2, 1.0] }).blksize(24);
    let full = engine.eval(&coords, None).unwrap();

    let mut pieces = vec![f64::NAN; engine.output_len(coords.len())];
    engine.eval_into(&coords, 4..8, None, &mut pieces).unwrap();
    engine.eval_into(&coords, 0..4, None, &mut pieces).unwrap();
    assert_eq!(pieces, full);

    let nao = basis.nao(Layout::Spherical);
    assert_eq!(basis.nao_range(0..4, Layout::Spherical) + basis.nao_range(4..8, Layout::Spherical), nao);
}

#[test]
fn spherical_output_contracts_cartesian_d_functions() {
    let mut basis = Basis::new();
    let a = basis.push_atom(1, [0.2, 0.1, -0.3]);
    basis.push_shell(a, 2, &[1.3, 0.4], &[0.5, 0.6, -0.2, 1.0]).unwrap();
    let coords = grid(20);
    let n = coords.len();
    let cart = GridAo::new(&basis, Deriv::Value).layout(Layout::Cartesian).eval(&coords, None).unwrap();
    let sph = GridAo::new(&basis, Deriv::Value).layout(Layout::Spherical).eval(&coords, None).unwrap();
    let (nc, ns) = (ncart(2), nsph(2));
    let mat = c2s_matrix(2);
    for ig in 0..n {
        for k in 0..2 {
            for s in 0..ns {
                let want: f64 = (0..nc).map(|c| mat[s * nc + c] * cart[ig * 2 * nc + k * nc + c]).sum();
                assert_relative_eq!(sph[ig * 2 * ns + k * ns + s], want, epsilon = 1e-15, max_relative = 1e-12);
            }
        }
    }
}

#[test]
fn thread_count_does_not_change_results() {
    let basis = co_like();
    let coords = grid(500);
    let engine = GridAo::new(&basis, Deriv::Hessian).blksize(48);
    let run = |threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| engine.eval(&coords, None).unwrap())
    };
    assert_eq!(run(1), run(4));
}

#[test]
fn raw_libcint_tables_are_accepted() {
    // Same layout as libcint: coords at env[20..26], exponent env[26], coeff env[27].
    let mut env = vec![0.0_f64; 28];
    env[25] = 1.4;
    env[26] = 1.24;
    env[27] = 1.0;
    let atm = vec![
        1, 20, 1, 0, 0, 0,
        1, 23, 1, 0, 0, 0,
    ];
    let bas = vec![
        0, 0, 1, 1, 0, 26, 27, 0,
        1, 0, 1, 1, 0, 26, 27, 0,
    ];
    let basis = Basis::from_tables(atm, bas, env).unwrap();
    let ao = GridAo::new(&basis, Deriv::Value).eval(&[[0.0, 0.0, 0.7]], None).unwrap();
    let want = common_fac_sp(0) * (-1.24_f64 * 0.49).exp();
    assert_relative_eq!(ao[0], want, max_relative = 1e-14);
    assert_relative_eq!(ao[1], want, max_relative = 1e-14);
}
