//! Fixed Equihash(200,9) constants and the runtime-tunable [`SolverConfig`].
//!
//! All values here mirror the derived constants in the original solver's
//! `Const` struct. They are `const`, not `SolverConfig` fields, because
//! changing any of them without re-deriving the others breaks the static
//! relationships checked in the original `static_assert`s (see the
//! `#[test] fn derived_constants_are_consistent` below).

/// Total hash bits (`N`).
pub const N_PARAMETER: u32 = 200;
/// Number of collision rounds (`K`).
pub const K_PARAMETER: u32 = 9;
/// Bits per hash segment.
pub const HASH_SEGMENT_BITS: u32 = N_PARAMETER / (K_PARAMETER + 1);
/// Bytes needed to hold one segment.
pub const HASH_SEGMENT_BYTES: usize = (HASH_SEGMENT_BITS as usize + 7) / 8;
/// Segments per initial string (`K+1`).
pub const TOTAL_SEGMENTS_COUNT: usize = (K_PARAMETER + 1) as usize;
/// Initial string-set size `S = 2^(segBits+1)`.
pub const INITIAL_STRING_SET_SIZE: u64 = 1u64 << (HASH_SEGMENT_BITS + 1);

pub const EXTRA_SPACE_MULTIPLIER: u64 = 7;
pub const EXTRA_SPACE_DIVISOR: u64 = 5;
pub const BUCKET_COUNT_BITS: u32 = 8;
pub const BUCKET_COUNT: usize = 1 << BUCKET_COUNT_BITS;
pub const BUCKET_IN_INDEX_SHIFT: u32 = 26;
pub const TOO_MANY_BASIC_COLLISIONS: u32 = 14;
pub const TOO_MANY_FINAL_COLLISIONS: u32 = 3;

/// Records per bucket, with ~40% headroom over the ideal `S/B`.
pub const ITEMS_PER_BUCKET: u64 =
    INITIAL_STRING_SET_SIZE * EXTRA_SPACE_MULTIPLIER / EXTRA_SPACE_DIVISOR / BUCKET_COUNT as u64;

/// Largest combinatorial index a pair-link can carry.
pub const MAX_COMPRESSED_INDEX_VALUE: u64 =
    ITEMS_PER_BUCKET * (ITEMS_PER_BUCKET - 1) / 2 + ITEMS_PER_BUCKET - 1;

pub const HASH_TABLE_SIZE_BITS: u32 = HASH_SEGMENT_BITS - BUCKET_COUNT_BITS;
pub const HASH_TABLE_SIZE: usize = 1 << HASH_TABLE_SIZE_BITS;
pub const HASH_TABLE_MASK: u32 = (1 << HASH_TABLE_SIZE_BITS) - 1;

pub const PARTITION_COUNT_BITS: u32 = BUCKET_IN_INDEX_SHIFT + BUCKET_COUNT_BITS - 32;
pub const PARTITION_COUNT: usize = 1 << PARTITION_COUNT_BITS;
pub const BUCKETS_PER_PARTITION: usize = BUCKET_COUNT / PARTITION_COUNT;
pub const ITEMS_PER_OUT_PARTITION: u64 = ITEMS_PER_BUCKET / PARTITION_COUNT as u64;

/// Total slots across all buckets (the algorithm's working-set ceiling).
pub const MAXIMUM_STRING_SET_SIZE: u64 =
    INITIAL_STRING_SET_SIZE * EXTRA_SPACE_MULTIPLIER / EXTRA_SPACE_DIVISOR;

pub const SEGMENT_BIT_MASK: u32 = (1u32 << HASH_SEGMENT_BITS) - 1;
pub const BUCKET_NUMBER_MASK: u32 = (1 << BUCKET_COUNT_BITS) - 1;

/// Indices in a published solution.
pub const SOLUTION_SIZE: usize = 1 << K_PARAMETER;

/// Number of pair-link arrays that are ever populated (steps 0..7; step 8's
/// input links are already known to the caller, see DESIGN.md).
pub const PAIR_LINK_ARRAY_COUNT: usize = K_PARAMETER as usize - 1;

/// Length of the powheader a solver run is bound to: a block header through
/// and including its nonce, with no solution bytes appended yet.
pub const POWHEADER_LEN: usize = 140;

/// Chosen Blake2b batching backend, modeling the source's dynamic dispatch
/// over SIMD back-ends as a plain tagged value passed into `Solver::create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Scalar,
    Batch { width: usize },
}

impl Backend {
    pub fn width(self) -> usize {
        match self {
            Backend::Scalar => 1,
            Backend::Batch { width } => width,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Batch { width: 4 }
    }
}

/// Runtime-tunable solver behavior. Replaces the source's process-wide
/// `RunTimeConfig` statics with a plain value passed to [`super::Solver::create`].
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Drop writes that would exceed a bucket's capacity instead of panicking.
    /// Correctness is preserved by `recompute_solution`'s safety net.
    pub check_bucket_overflow: bool,
    /// Regenerate and re-verify every candidate solution from scratch before
    /// accepting it. Off by default, matching the source.
    pub recompute_solution: bool,
    /// Retract an output string whose leading 8 bytes are all zero. Off by
    /// default (see SPEC_FULL.md open questions).
    pub filter_zero_qword_strings: bool,
    /// Suppress consecutive step-8 candidates sharing the same last-two-segment
    /// value within one input bucket.
    pub step8_filter_by_last_segment: bool,
    /// Which Blake2b batching backend to use for initial hash generation.
    pub backend: Backend,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            check_bucket_overflow: true,
            recompute_solution: false,
            filter_zero_qword_strings: false,
            step8_filter_by_last_segment: true,
            backend: Backend::default(),
        }
    }
}

impl SolverConfig {
    /// Rejects any `(n, k)` other than the one pair this crate implements.
    /// Mirrors the solver-function ABI's `(n,k) != (200,9) => -1` contract
    /// (§6), without building the ABI shim itself.
    pub fn validate_params(n: u32, k: u32) -> Result<(), crate::solver::error::SolverError> {
        if n == N_PARAMETER && k == K_PARAMETER {
            Ok(())
        } else {
            Err(crate::solver::error::SolverError::UnsupportedParams { n, k })
        }
    }
}

/// Byte length of a record's hash suffix at reduction step `step` (segments
/// `step..TOTAL_SEGMENTS_COUNT`), in the expanded layout this crate builds.
pub fn hash_length(step: usize) -> usize {
    HASH_SEGMENT_BYTES * (TOTAL_SEGMENTS_COUNT - step)
}

/// Byte length of a full record (pair-link + hash suffix) at `step`.
pub fn record_size(step: usize) -> usize {
    crate::solver::xstring::LINK_BYTES + hash_length(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_constants_are_consistent() {
        assert_eq!(HASH_SEGMENT_BITS * (K_PARAMETER + 1), N_PARAMETER);
        assert_eq!(BUCKET_COUNT, 256);
        assert_eq!(ITEMS_PER_BUCKET, 11468);
        assert_eq!(HASH_TABLE_SIZE, 4096);
        assert_eq!(PARTITION_COUNT, 4);
        assert_eq!(BUCKETS_PER_PARTITION * PARTITION_COUNT, BUCKET_COUNT);
        assert!((1u64 << BUCKET_IN_INDEX_SHIFT) > MAX_COMPRESSED_INDEX_VALUE);
        assert!((1u64 << (BUCKET_IN_INDEX_SHIFT - 1)) <= MAX_COMPRESSED_INDEX_VALUE);
        assert!(ITEMS_PER_OUT_PARTITION * PARTITION_COUNT as u64 <= ITEMS_PER_BUCKET);
    }

    #[test]
    fn record_sizes_shrink_per_step() {
        assert_eq!(hash_length(0), 30);
        assert_eq!(hash_length(8), 6);
        assert_eq!(record_size(0), 34);
    }

    #[test]
    fn rejects_unsupported_params() {
        assert!(SolverConfig::validate_params(200, 9).is_ok());
        assert!(SolverConfig::validate_params(200, 8).is_err());
    }
}
