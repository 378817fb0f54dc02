//! 32-bit pair-link ancestry encoding (SPEC_FULL.md §4.9), grounded on the
//! original `PairLink::set`/`Translate`.
use crate::solver::config::{BUCKET_IN_INDEX_SHIFT, ITEMS_PER_BUCKET, ITEMS_PER_OUT_PARTITION};

const LINK_SHIFT: u32 = BUCKET_IN_INDEX_SHIFT;
const LINK_MASK: u32 = (1 << LINK_SHIFT) - 1;
const PART_BITS: u32 = LINK_SHIFT + 8 - 32;

/// Encodes the ancestry of an output string: its two parent positions
/// (`larger`, `smaller`, both taken modulo `ITEMS_PER_BUCKET`) within their
/// common source `bucket`.
pub fn encode(larger: u64, smaller: u64, bucket: u32) -> u32 {
    debug_assert!(smaller < larger);
    debug_assert!(larger < ITEMS_PER_BUCKET);
    let c = larger * (larger - 1) / 2 + smaller;
    debug_assert!(c <= crate::solver::config::MAX_COMPRESSED_INDEX_VALUE);
    (c as u32 & LINK_MASK) | (bucket << LINK_SHIFT)
}

/// A single initial string just carries its own global index; no pair to decode.
pub fn encode_single(index: u32) -> u32 {
    index
}

/// Recovers the two absolute parent positions `(smaller_abs, larger_abs)`
/// encoded in `link`, given the absolute position of the string carrying it
/// (used to recover the bucket-id bits the link itself doesn't carry).
pub fn translate(link: u32, link_position: u64) -> (u64, u64) {
    let c = (link & LINK_MASK) as u64;
    let mut larger = (((2.0 * c as f64 + 1.0).sqrt()) as u64).max(1);
    if c.saturating_sub(larger * (larger - 1) / 2) >= larger {
        larger += 1;
    }
    let smaller = c - larger * (larger - 1) / 2;

    let partition = ((link_position % ITEMS_PER_BUCKET) / ITEMS_PER_OUT_PARTITION) as u32
        & ((1 << PART_BITS) - 1);
    let bucket = (partition << (32 - LINK_SHIFT)) | (link >> LINK_SHIFT);

    let base = ITEMS_PER_BUCKET * bucket as u64;
    (base + smaller, base + larger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_for_legal_triples() {
        // Cover a spread of positions/buckets, not every one of the ~1.3e8 triples.
        for &bucket in &[0u32, 1, 17, 200, 255] {
            for &larger in &[1u64, 2, 50, 5000, ITEMS_PER_BUCKET - 1] {
                for &smaller in &[0u64, 1, larger.saturating_sub(1)] {
                    if smaller >= larger {
                        continue;
                    }
                    let link = encode(larger, smaller, bucket);
                    // `encode` keeps only the bucket's low (32-LINK_SHIFT) bits
                    // in the link itself, so `translate` must recover the rest
                    // from the partition: partition = bucket's high PART_BITS
                    // bits (see §4.9).
                    let partition = bucket >> (8 - PART_BITS);
                    let link_position =
                        ITEMS_PER_BUCKET * bucket as u64 + partition as u64 * ITEMS_PER_OUT_PARTITION;
                    let (small_pos, large_pos) = translate(link, link_position);
                    let base = ITEMS_PER_BUCKET * bucket as u64;
                    assert_eq!(small_pos, base + smaller);
                    assert_eq!(large_pos, base + larger);
                }
            }
        }
    }

    #[test]
    fn single_index_passthrough() {
        assert_eq!(encode_single(123456), 123456);
    }
}
