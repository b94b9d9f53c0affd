//! Basis-set descriptors in libcint's atm/bas/env layout, plus engine limits.
//!
//! libcint describes a molecule with three flat arrays:
//!   atm[natm][ATM_SLOTS]  — atom data
//!   bas[nbas][BAS_SLOTS]  — shell data
//!   env[]                 — floating-point storage for coordinates/exponents/coefficients
//!
//! [`Basis`] owns validated copies of the three arrays. Every offset stored
//! in `atm`/`bas` is checked once at construction, so the shell and atom
//! views handed to the engine can slice `env` without further checks.

use std::ops::Range;

use crate::error::{GridError, Result};

// ─── env global offsets (cint.h) ────────────────────────────────────────────
pub const PTR_ENV_START:     usize = 20;

// ─── atm slot indices ────────────────────────────────────────────────────────
pub const CHARGE_OF:     usize = 0;
pub const PTR_COORD:     usize = 1;
pub const NUC_MOD_OF:    usize = 2;
pub const ATM_SLOTS:     usize = 6;

// ─── bas slot indices ────────────────────────────────────────────────────────
pub const ATOM_OF:       usize = 0;
pub const ANG_OF:        usize = 1;
pub const NPRIM_OF:      usize = 2;
pub const NCTR_OF:       usize = 3;
pub const PTR_EXP:       usize = 5;
pub const PTR_COEFF:     usize = 6;
pub const BAS_SLOTS:     usize = 8;

// ─── Engine limits ───────────────────────────────────────────────────────────
/// Highest angular momentum with generated Cartesian tables (s..j).
pub const LMAX:        usize = 7;
/// Maximum primitives per shell held in the exponential scratch.
pub const NPRIMAX:     usize = 64;
/// Maximum `nctr × ncart(l)` per shell: 128s 42p 21d 12f 8g 6h 4i 3j.
pub const NCTR_CART:   usize = 128;
/// Maximum `nctr × (2l+1)` per shell in spherical mode: 72s 24p 14d 10f 8g 6h 5i 4j.
pub const NCTR_SPH:    usize = 72;
/// Default number of grid points per block.
pub const BLKSIZE:     usize = 96;
/// Largest accepted block size.
pub const MAX_BLKSIZE: usize = 1024;
/// Default screening threshold on `a·r² − log|c|max`; skipped terms are below ~1e-22.
pub const EXPCUTOFF:   f64 = 50.0;

/// Representation of the angular part of each shell in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `(l+1)(l+2)/2` Cartesian functions per contraction.
    Cartesian,
    /// `2l+1` real solid harmonics per contraction.
    #[default]
    Spherical,
}

impl Layout {
    /// Number of angular components per contraction for angular momentum `l`.
    #[inline]
    pub fn degeneracy(self, l: usize) -> usize {
        match self {
            Layout::Cartesian => ncart(l),
            Layout::Spherical => nsph(l),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Layout::Cartesian => "cartesian",
            Layout::Spherical => "spherical",
        }
    }
}

/// Number of Cartesian GTOs for angular momentum l: (l+1)(l+2)/2
#[inline]
pub fn ncart(l: usize) -> usize { (l + 1) * (l + 2) / 2 }

/// Number of spherical GTOs for angular momentum l: 2l+1
#[inline]
pub fn nsph(l: usize) -> usize { 2 * l + 1 }

/// l-dependent normalisation factor for s and p orbitals.
/// For l≥2 the factor is absorbed into the cart2sph coefficients.
pub fn common_fac_sp(l: usize) -> f64 {
    match l {
        0 => 0.282094791773878143,  // 1/sqrt(4π)
        1 => 0.488602511902919921,  // sqrt(3/(4π))
        _ => 1.0,
    }
}

// Static Cartesian component tables for l = 0..=LMAX, generated by build.rs.
// Provides `CART_TABLES[l] -> &'static [[u8; 3]]`.
include!(concat!(env!("OUT_DIR"), "/cart_tables.rs"));

// ─── Views into the slot tables ──────────────────────────────────────────────

/// Read-only view of one atom row in the `atm` array.
#[derive(Debug, Clone, Copy)]
pub struct AtmSlot<'a> {
    data: &'a [i32],  // ATM_SLOTS elements
}

impl<'a> AtmSlot<'a> {
    #[inline]
    fn new(atm: &'a [i32], iatom: usize) -> Self {
        AtmSlot { data: &atm[iatom * ATM_SLOTS..(iatom + 1) * ATM_SLOTS] }
    }

    #[inline] pub fn charge(&self)    -> i32 { self.data[CHARGE_OF] }
    #[inline] pub fn ptr_coord(&self) -> usize { self.data[PTR_COORD] as usize }
}

/// Read-only view of one basis-shell row in the `bas` array.
#[derive(Debug, Clone, Copy)]
pub struct BasSlot<'a> {
    data: &'a [i32],
}

impl<'a> BasSlot<'a> {
    #[inline]
    fn new(bas: &'a [i32], ibas: usize) -> Self {
        BasSlot { data: &bas[ibas * BAS_SLOTS..(ibas + 1) * BAS_SLOTS] }
    }

    #[inline] pub fn atom_of(&self)  -> usize { self.data[ATOM_OF]  as usize }
    #[inline] pub fn ang_of(&self)   -> usize { self.data[ANG_OF]   as usize }
    #[inline] pub fn nprim_of(&self) -> usize { self.data[NPRIM_OF] as usize }
    #[inline] pub fn nctr_of(&self)  -> usize { self.data[NCTR_OF]  as usize }
    #[inline] pub fn ptr_exp(&self)  -> usize { self.data[PTR_EXP]  as usize }
    #[inline] pub fn ptr_coeff(&self)-> usize { self.data[PTR_COEFF]as usize }
}

/// One contracted shell, resolved against `env`.
#[derive(Debug, Clone, Copy)]
pub struct ShellRef<'a> {
    pub atom:   usize,
    pub l:      usize,
    pub nprim:  usize,
    pub nctr:   usize,
    /// `nprim` exponents.
    pub exps:   &'a [f64],
    /// `nctr × nprim` coefficients, `coeffs[k*nprim + j]`.
    pub coeffs: &'a [f64],
}

// ─── Owned, validated tables ─────────────────────────────────────────────────

/// A molecule's atoms and basis shells in libcint layout.
#[derive(Debug, Clone)]
pub struct Basis {
    atm: Vec<i32>,
    bas: Vec<i32>,
    env: Vec<f64>,
}

impl Default for Basis {
    fn default() -> Self { Self::new() }
}

impl Basis {
    /// Empty basis with the reserved `env` header.
    pub fn new() -> Self {
        Basis { atm: Vec::new(), bas: Vec::new(), env: vec![0.0; PTR_ENV_START] }
    }

    /// Wrap externally built tables after checking every slot offset.
    pub fn from_tables(atm: Vec<i32>, bas: Vec<i32>, env: Vec<f64>) -> Result<Self> {
        if atm.len() % ATM_SLOTS != 0 {
            return Err(GridError::TableShape { table: "atm", len: atm.len(), slots: ATM_SLOTS });
        }
        if bas.len() % BAS_SLOTS != 0 {
            return Err(GridError::TableShape { table: "bas", len: bas.len(), slots: BAS_SLOTS });
        }
        let basis = Basis { atm, bas, env };
        for ia in 0..basis.natm() {
            let a = AtmSlot::new(&basis.atm, ia);
            basis.check_env("PTR_COORD", ia, a.data[PTR_COORD], 3)?;
        }
        for ib in 0..basis.nbas() {
            let b = BasSlot::new(&basis.bas, ib);
            let atom = b.data[ATOM_OF];
            if atom < 0 || atom as usize >= basis.natm() {
                return Err(GridError::SlotOutOfBounds {
                    what: "ATOM_OF",
                    row: ib,
                    index: atom.max(0) as usize,
                    len: basis.natm(),
                });
            }
            for (what, slot) in [("ANG_OF", ANG_OF), ("NPRIM_OF", NPRIM_OF), ("NCTR_OF", NCTR_OF)] {
                if b.data[slot] < 0 {
                    return Err(GridError::SlotOutOfBounds { what, row: ib, index: 0, len: 0 });
                }
            }
            let (np, nc) = (b.nprim_of(), b.nctr_of());
            if np == 0 || nc == 0 {
                return Err(GridError::EmptyShell { shell: ib, nprim: np, nctr: nc });
            }
            basis.check_env("PTR_EXP", ib, b.data[PTR_EXP], np)?;
            basis.check_env("PTR_COEFF", ib, b.data[PTR_COEFF], np * nc)?;
        }
        Ok(basis)
    }

    fn check_env(&self, what: &'static str, row: usize, ptr: i32, count: usize) -> Result<()> {
        let len = self.env.len();
        if ptr < 0 || ptr as usize + count > len {
            return Err(GridError::SlotOutOfBounds {
                what,
                row,
                index: ptr.max(0) as usize + count,
                len,
            });
        }
        Ok(())
    }

    /// Append an atom at `coord` (Bohr); returns its index.
    pub fn push_atom(&mut self, charge: i32, coord: [f64; 3]) -> usize {
        let ptr = self.env.len() as i32;
        self.env.extend_from_slice(&coord);
        self.atm.extend_from_slice(&[charge, ptr, 1, 0, 0, 0]);
        self.natm() - 1
    }

    /// Append a shell on `atom`. `coeffs` holds `nctr × nprim` values,
    /// contraction-major; returns the shell index.
    pub fn push_shell(&mut self, atom: usize, l: usize, exps: &[f64], coeffs: &[f64]) -> Result<usize> {
        let nbas = self.nbas();
        if atom >= self.natm() {
            return Err(GridError::SlotOutOfBounds { what: "ATOM_OF", row: nbas, index: atom, len: self.natm() });
        }
        if exps.is_empty() || coeffs.is_empty() {
            return Err(GridError::EmptyShell {
                shell: nbas,
                nprim: exps.len(),
                nctr: coeffs.len() / exps.len().max(1),
            });
        }
        if coeffs.len() % exps.len() != 0 {
            return Err(GridError::TableShape { table: "coeff", len: coeffs.len(), slots: exps.len() });
        }
        let ptr_exp = self.env.len() as i32;
        self.env.extend_from_slice(exps);
        let ptr_coeff = self.env.len() as i32;
        self.env.extend_from_slice(coeffs);
        let nctr = coeffs.len() / exps.len();
        self.bas.extend_from_slice(&[
            atom as i32, l as i32, exps.len() as i32, nctr as i32, 0, ptr_exp, ptr_coeff, 0,
        ]);
        Ok(nbas)
    }

    #[inline] pub fn natm(&self) -> usize { self.atm.len() / ATM_SLOTS }
    #[inline] pub fn nbas(&self) -> usize { self.bas.len() / BAS_SLOTS }

    pub fn atm(&self) -> &[i32] { &self.atm }
    pub fn bas(&self) -> &[i32] { &self.bas }
    pub fn env(&self) -> &[f64] { &self.env }

    #[inline]
    pub fn atm_slot(&self, iatom: usize) -> AtmSlot<'_> { AtmSlot::new(&self.atm, iatom) }

    #[inline]
    pub fn bas_slot(&self, ibas: usize) -> BasSlot<'_> { BasSlot::new(&self.bas, ibas) }

    /// Nuclear coordinate of atom `iatom`.
    #[inline]
    pub fn atom_coord(&self, iatom: usize) -> [f64; 3] {
        let p = self.atm_slot(iatom).ptr_coord();
        [self.env[p], self.env[p + 1], self.env[p + 2]]
    }

    /// Atom index owning shell `ibas`.
    #[inline]
    pub fn atom_of(&self, ibas: usize) -> usize { self.bas_slot(ibas).atom_of() }

    pub fn shell(&self, ibas: usize) -> ShellRef<'_> {
        let b = self.bas_slot(ibas);
        let (nprim, nctr) = (b.nprim_of(), b.nctr_of());
        ShellRef {
            atom: b.atom_of(),
            l: b.ang_of(),
            nprim,
            nctr,
            exps: &self.env[b.ptr_exp()..b.ptr_exp() + nprim],
            coeffs: &self.env[b.ptr_coeff()..b.ptr_coeff() + nprim * nctr],
        }
    }

    /// Orbital-column offsets: `ao_loc[i]` = columns of shells `0..i`.
    pub fn ao_loc(&self, layout: Layout) -> Vec<usize> {
        let nb = self.nbas();
        let mut ao_loc = vec![0usize; nb + 1];
        for i in 0..nb {
            let b = self.bas_slot(i);
            ao_loc[i + 1] = ao_loc[i] + layout.degeneracy(b.ang_of()) * b.nctr_of();
        }
        ao_loc
    }

    /// Total number of orbital columns.
    pub fn nao(&self, layout: Layout) -> usize { self.nao_range(0..self.nbas(), layout) }

    /// Orbital columns contributed by the shells in `shls`.
    pub fn nao_range(&self, shls: Range<usize>, layout: Layout) -> usize {
        shls.map(|i| {
            let b = self.bas_slot(i);
            layout.degeneracy(b.ang_of()) * b.nctr_of()
        })
        .sum()
    }
}
