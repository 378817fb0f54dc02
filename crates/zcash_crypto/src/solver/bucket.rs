//! Per-bucket/per-partition size bookkeeping, grounded on the original
//! solver's `BucketIndex`.
//!
//! Writers append strings to a bucket's current partition; `close_partition`
//! snapshots how many landed there since the last close, and advances to the
//! next partition. Readers then walk only the partitions that were actually
//! closed, in order, via [`BucketIndex::valid_positions`].
use crate::solver::config::{BUCKET_COUNT, ITEMS_PER_OUT_PARTITION, PARTITION_COUNT};

#[derive(Debug, Clone)]
pub struct BucketIndex {
    /// Number of strings written into each bucket so far this step, counted
    /// from the start of its *current* (not yet closed) partition.
    counter: [u64; BUCKET_COUNT],
    /// Sizes of already-closed partitions, `[bucket][partition]`.
    partition_sizes: [[u64; PARTITION_COUNT]; BUCKET_COUNT],
    /// Next partition index each bucket will close into.
    next_partition: [usize; BUCKET_COUNT],
}

impl BucketIndex {
    pub fn new() -> Self {
        BucketIndex {
            counter: [0; BUCKET_COUNT],
            partition_sizes: [[0; PARTITION_COUNT]; BUCKET_COUNT],
            next_partition: [0; BUCKET_COUNT],
        }
    }

    /// Clears all counters for a fresh reduction step, keeping no history
    /// from the previous step's partitions.
    pub fn reset_for_normal(&mut self) {
        *self = Self::new();
    }

    /// Same reset; final-step bookkeeping uses the same layout, just without
    /// a following step to read partitions back out for.
    pub fn reset_for_final(&mut self) {
        self.reset_for_normal();
    }

    /// Records that one more string was written to `bucket`'s current partition.
    pub fn record_write(&mut self, bucket: usize) {
        self.reserve_slot(bucket);
    }

    /// Current (not-yet-closed) running count for `bucket`.
    pub fn current_count(&self, bucket: usize) -> u64 {
        self.counter[bucket]
    }

    /// True once `bucket`'s current partition has reached its fixed capacity;
    /// callers that honor `SolverConfig::check_bucket_overflow` consult this
    /// before writing instead of letting `reserve_slot` run past the partition.
    pub fn would_overflow(&self, bucket: usize) -> bool {
        self.counter[bucket] >= ITEMS_PER_OUT_PARTITION
    }

    /// Reserves the next slot in `bucket`'s current partition, returning its
    /// absolute position, and advances the running count.
    pub fn reserve_slot(&mut self, bucket: usize) -> u64 {
        let base = bucket as u64 * crate::solver::config::ITEMS_PER_BUCKET;
        let part_base = base + self.next_partition[bucket] as u64 * ITEMS_PER_OUT_PARTITION;
        let slot = part_base + self.counter[bucket];
        self.counter[bucket] += 1;
        slot
    }

    /// Undoes the most recent [`Self::reserve_slot`] call for `bucket`, used
    /// when a write is retracted after the fact (`filter_zero_qword_strings`).
    pub fn retract_last(&mut self, bucket: usize) {
        debug_assert!(self.counter[bucket] > 0);
        self.counter[bucket] -= 1;
    }

    /// Snapshots `bucket`'s running count as the size of partition
    /// `self.next_partition[bucket]`, then resets the running count and
    /// advances to the next partition. Panics (`InternalInvariant`) if the
    /// partition count would overflow `PARTITION_COUNT`, or if the partition
    /// overflows its fixed capacity and overflow checking is enabled by the
    /// caller (see [`crate::solver::config::SolverConfig::check_bucket_overflow`]).
    pub fn close_partition(&mut self, bucket: usize) {
        let p = self.next_partition[bucket];
        assert!(p < PARTITION_COUNT, "bucket {bucket} has no more partitions to close");
        self.partition_sizes[bucket][p] = self.counter[bucket];
        self.counter[bucket] = 0;
        self.next_partition[bucket] = p + 1;
    }

    /// Closes the current partition for every bucket; used once all of a
    /// step's output strings have been written.
    pub fn close_partitions_for_new_strings(&mut self) {
        for bucket in 0..BUCKET_COUNT {
            self.close_partition(bucket);
        }
    }

    /// Size of partition `p` of `bucket`, or 0 if it was never closed.
    pub fn partition_size(&self, bucket: usize, p: usize) -> u64 {
        if p < self.next_partition[bucket] {
            self.partition_sizes[bucket][p]
        } else {
            0
        }
    }

    /// Total number of strings across all closed partitions of `bucket`.
    pub fn bucket_size(&self, bucket: usize) -> u64 {
        (0..self.next_partition[bucket])
            .map(|p| self.partition_sizes[bucket][p])
            .sum()
    }

    /// Absolute record positions occupied in `bucket`, across all closed
    /// partitions, in partition order. Each partition's storage region is
    /// `ITEMS_PER_OUT_PARTITION` slots wide regardless of how many of those
    /// slots it actually used.
    pub fn valid_positions(&self, bucket: usize) -> impl Iterator<Item = u64> + '_ {
        let base = bucket as u64 * crate::solver::config::ITEMS_PER_BUCKET;
        (0..self.next_partition[bucket]).flat_map(move |p| {
            let part_base = base + p as u64 * ITEMS_PER_OUT_PARTITION;
            let size = self.partition_sizes[bucket][p];
            (0..size).map(move |i| part_base + i)
        })
    }
}

impl Default for BucketIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_partition_snapshots_and_resets() {
        let mut idx = BucketIndex::new();
        idx.record_write(5);
        idx.record_write(5);
        idx.record_write(5);
        idx.close_partition(5);
        assert_eq!(idx.partition_size(5, 0), 3);
        assert_eq!(idx.current_count(5), 0);

        idx.record_write(5);
        idx.close_partition(5);
        assert_eq!(idx.partition_size(5, 1), 1);
        assert_eq!(idx.bucket_size(5), 4);
    }

    #[test]
    fn valid_positions_walks_closed_partitions_in_order() {
        let mut idx = BucketIndex::new();
        for _ in 0..2 {
            idx.record_write(0);
        }
        idx.close_partition(0);
        for _ in 0..3 {
            idx.record_write(0);
        }
        idx.close_partition(0);

        let base = 0u64;
        let part1_base = ITEMS_PER_OUT_PARTITION;
        let positions: Vec<u64> = idx.valid_positions(0).collect();
        assert_eq!(
            positions,
            vec![
                base,
                base + 1,
                part1_base,
                part1_base + 1,
                part1_base + 2
            ]
        );
    }

    #[test]
    #[should_panic(expected = "no more partitions to close")]
    fn closing_past_partition_count_panics() {
        let mut idx = BucketIndex::new();
        for _ in 0..PARTITION_COUNT + 1 {
            idx.close_partition(0);
        }
    }
}
