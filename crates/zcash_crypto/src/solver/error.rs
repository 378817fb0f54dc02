//! Errors the solver surfaces to callers.
//!
//! Only the `PreconditionViolation` row of the error taxonomy in SPEC_FULL.md
//! §7 becomes a public `Err` value; `OutOfSpace` and `InternalInvariant` are
//! `debug_assert!`/panic-level bugs (the pool is sized statically from fixed
//! constants, so hitting them signals a constant-derivation mistake, not a
//! data-dependent condition), and `CandidateInvalid`/`BucketOverflow` are
//! silently counted or dropped rather than surfaced per-occurrence.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("header must be exactly {expected} bytes, got {actual}")]
    WrongHeaderLength { expected: usize, actual: usize },

    #[error("unsupported Equihash parameters (n={n}, k={k}); only (200,9) is implemented")]
    UnsupportedParams { n: u32, k: u32 },

    #[error("solution must contain exactly {expected} indices, got {actual}")]
    WrongSolutionSize { expected: usize, actual: usize },

    #[error("compact solution encoding must be exactly {expected} bytes, got {actual}")]
    WrongCompactLength { expected: usize, actual: usize },
}
