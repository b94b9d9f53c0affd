//! Error type for the grid evaluation engine.
//!
//! Every failure is detected while a call is being validated, before any
//! scratch buffer is allocated or any output element is written. Numerical
//! underflow produced by screening is not an error.

use thiserror::Error;

/// Broad classification of a [`GridError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A shell or the requested block size exceeds a fixed engine maximum.
    Configuration,
    /// An index, shell range or table shape is inconsistent with the basis.
    Range,
}

/// The error type for all fallible operations of this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A shell has more primitives than the exponential scratch can hold.
    #[error("shell {shell} has {nprim} primitives (maximum {max})")]
    TooManyPrimitives {
        shell: usize,
        nprim: usize,
        max: usize,
    },

    /// `nctr × degeneracy` of a shell exceeds the scratch width for the layout.
    #[error("shell {shell} needs {columns} {layout} columns (maximum {max})")]
    TooManyContractions {
        shell: usize,
        columns: usize,
        max: usize,
        layout: &'static str,
    },

    #[error("shell {shell} has angular momentum {l} (maximum {max})")]
    AngularMomentumTooHigh { shell: usize, l: usize, max: usize },

    #[error("block size {blksize} outside 1..={max}")]
    InvalidBlockSize { blksize: usize, max: usize },

    #[error("exponent cutoff must be positive, got {0}")]
    InvalidCutoff(f64),

    /// The shell range is empty or reaches past the end of the basis.
    #[error("shell range {start}..{end} is invalid for {nbas} shells")]
    ShellRange {
        start: usize,
        end: usize,
        nbas: usize,
    },

    /// The shell range splits the shells of one atom.
    #[error("shell {shell} does not lie on an atom boundary")]
    AtomBoundary { shell: usize },

    /// A shell inside the range belongs to an atom outside the range's atom span.
    #[error("shell {shell} belongs to atom {atom}, outside atoms {atm_start}..{atm_end}")]
    AtomOrder {
        shell: usize,
        atom: usize,
        atm_start: usize,
        atm_end: usize,
    },

    #[error("{table} table length {len} is not a multiple of {slots} slots")]
    TableShape {
        table: &'static str,
        len: usize,
        slots: usize,
    },

    /// A slot of the `atm`/`bas` tables points outside its target array.
    #[error("{what} of row {row} points outside its table ({index} >= {len})")]
    SlotOutOfBounds {
        what: &'static str,
        row: usize,
        index: usize,
        len: usize,
    },

    #[error("screening table is {rows}x{cols}, need at least {need_rows} rows of {need_cols}")]
    ScreeningShape {
        rows: usize,
        cols: usize,
        need_rows: usize,
        need_cols: usize,
    },

    /// A shell with no primitives or no contractions.
    #[error("shell {shell} has {nprim} primitives and {nctr} contractions")]
    EmptyShell { shell: usize, nprim: usize, nctr: usize },

    #[error("output buffer holds {found} values, expected {expected}")]
    OutputSize { expected: usize, found: usize },

    /// A [`Scratch`](crate::block::Scratch) too small for the plan it is used with.
    #[error("scratch buffer {buffer} holds {found} values, need {expected}")]
    ScratchSize {
        buffer: &'static str,
        expected: usize,
        found: usize,
    },
}

impl GridError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::TooManyPrimitives { .. }
            | GridError::TooManyContractions { .. }
            | GridError::AngularMomentumTooHigh { .. }
            | GridError::InvalidBlockSize { .. }
            | GridError::InvalidCutoff(_) => ErrorKind::Configuration,
            GridError::ShellRange { .. }
            | GridError::AtomBoundary { .. }
            | GridError::AtomOrder { .. }
            | GridError::TableShape { .. }
            | GridError::SlotOutOfBounds { .. }
            | GridError::ScreeningShape { .. }
            | GridError::EmptyShell { .. }
            | GridError::OutputSize { .. }
            | GridError::ScratchSize { .. } => ErrorKind::Range,
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
