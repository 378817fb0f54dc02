//! Initial-string Blake2b generation, grounded on [`crate::equihash::initialise_state`]/
//! `generate_hash` — the same personalization and clone-per-index idiom,
//! generalized to also support width->N batched generation via
//! `blake2b_simd::many`, matching SPEC_FULL.md §4.2's "batch" backend contract.
use blake2b_simd::many::{hash_many, HashManyJob};
use blake2b_simd::{Params as Blake2bParams, State as Blake2bState};

use crate::solver::config::{HASH_SEGMENT_BITS, K_PARAMETER, N_PARAMETER, TOTAL_SEGMENTS_COUNT};

/// Indices packed per Blake2b digest: `512 / N`.
pub const INDICES_PER_HASH_OUTPUT: u32 = 512 / N_PARAMETER;
/// Digest length in bytes for these parameters.
pub const DIGEST_LEN: usize = (INDICES_PER_HASH_OUTPUT * N_PARAMETER / 8) as usize;

/// `"ZcashPoW" || LE32(n) || LE32(k)`.
fn personalization() -> [u8; 16] {
    let mut p: [u8; 16] = *b"ZcashPoW\x00\x00\x00\x00\x00\x00\x00\x00";
    p[8..12].copy_from_slice(&N_PARAMETER.to_le_bytes());
    p[12..16].copy_from_slice(&K_PARAMETER.to_le_bytes());
    p
}

/// A Blake2b state that has already absorbed the full powheader and is ready
/// to be cloned-and-finalized per initial-string index. The clone-after-update
/// idiom relies on `blake2b_simd::State` buffering the header internally; no
/// separate "precompute after first block" step is needed.
pub struct Blake2bEngine {
    base: Blake2bState,
    /// Copy of the header, kept only so [`Self::finalize_batch`] can build
    /// independent full messages for `hash_many` (which needs owned byte
    /// slices up front, unlike the clone-a-mid-state scalar path).
    header: Vec<u8>,
}

impl Blake2bEngine {
    /// `header` must be the exactly-140-byte powheader (block header bytes
    /// through the nonce); validated by the caller (`Solver::reset`).
    pub fn new(header: &[u8]) -> Self {
        let mut base = Blake2bParams::new()
            .hash_length(DIGEST_LEN)
            .personal(&personalization())
            .to_state();
        base.update(header);
        Blake2bEngine {
            base,
            header: header.to_vec(),
        }
    }

    /// Computes the raw `DIGEST_LEN`-byte digest for group index `i`
    /// (`i = global_index / INDICES_PER_HASH_OUTPUT`). Use
    /// [`leading_segments`] to pull the per-initial-string segments out of it.
    pub fn finalize_into(&self, i: u32, out: &mut [u8]) {
        debug_assert_eq!(out.len(), DIGEST_LEN);
        let mut state = self.base.clone();
        state.update(&i.to_le_bytes());
        out.copy_from_slice(state.finalize().as_bytes());
    }

    /// Computes digests for `i, i+1, ..., i+width-1` in one batched call via
    /// `blake2b_simd::many::hash_many`. Each lane is a complete, independent
    /// Blake2b hash (header + its own counter), so the result is bit-identical
    /// to calling [`Self::finalize_into`] once per index — `hash_many` batches
    /// independent messages, it does not share state across lanes.
    pub fn finalize_batch(&self, first_i: u32, width: usize, out: &mut [u8]) {
        debug_assert_eq!(out.len(), DIGEST_LEN * width);
        let mut params = Blake2bParams::new();
        params.hash_length(DIGEST_LEN).personal(&personalization());

        // hash_many re-hashes the full message per lane; only the trailing
        // counter bytes differ, the header prefix is shared input, not shared state.
        let header = self.header_snapshot();
        let mut messages: Vec<Vec<u8>> = (0..width as u32)
            .map(|w| {
                let mut m = header.clone();
                m.extend_from_slice(&(first_i + w).to_le_bytes());
                m
            })
            .collect();
        let mut jobs: Vec<HashManyJob> = messages
            .iter_mut()
            .map(|m| HashManyJob::new(&params, m.as_slice()))
            .collect();
        hash_many(jobs.iter_mut());
        for (lane, job) in jobs.iter().enumerate() {
            out[lane * DIGEST_LEN..(lane + 1) * DIGEST_LEN].copy_from_slice(job.to_hash().as_bytes());
        }
    }

    /// The header bytes this engine was built from, recovered so
    /// [`Self::finalize_batch`] can build independent full messages. Stored
    /// separately from `base` because `State` does not expose its buffered
    /// input; cheap since it is only used by the (uncommon) batch path.
    fn header_snapshot(&self) -> Vec<u8> {
        self.header.clone()
    }
}

/// Extracts the leading `TOTAL_SEGMENTS_COUNT` `HASH_SEGMENT_BITS`-wide
/// big-endian bitfields from a digest (the only ones this crate's initial
/// strings ever need, out of the `INDICES_PER_HASH_OUTPUT` a digest holds).
pub fn leading_segments(digest: &[u8]) -> [u32; TOTAL_SEGMENTS_COUNT] {
    let mut segs = [0u32; TOTAL_SEGMENTS_COUNT];
    let bits = HASH_SEGMENT_BITS as usize;
    for (s, slot) in segs.iter_mut().enumerate() {
        let bit_off = s * bits;
        *slot = read_bits_be(digest, bit_off, bits);
    }
    segs
}

fn read_bits_be(data: &[u8], bit_offset: usize, bit_len: usize) -> u32 {
    let mut value: u64 = 0;
    for i in 0..bit_len {
        let bit_idx = bit_offset + i;
        let byte = data[bit_idx / 8];
        let bit = (byte >> (7 - (bit_idx % 8))) & 1;
        value = (value << 1) | bit as u64;
    }
    value as u32
}
