//! Bucketed XOR-collision reduction, grounded on the original solver's
//! `Algorithm::BasicStep`/`OutputString`. Steps 0..7 use [`run_step`]; the
//! final step (segment 9 has no further step to bucket on) uses
//! [`run_final_step`].
use crate::solver::bucket::BucketIndex;
use crate::solver::config::{
    BUCKET_COUNT, BUCKET_COUNT_BITS, BUCKET_NUMBER_MASK, HASH_TABLE_MASK, HASH_TABLE_SIZE,
    ITEMS_PER_BUCKET, ITEMS_PER_OUT_PARTITION, PARTITION_COUNT, TOO_MANY_BASIC_COLLISIONS,
    TOO_MANY_FINAL_COLLISIONS,
};
use crate::solver::pairlink;
use crate::solver::xstring;

const BUCKETS_PER_OUTER_PARTITION: usize = BUCKET_COUNT / PARTITION_COUNT;

/// A step's worth of fixed-size string records, one array covering every
/// bucket's full (`ITEMS_PER_BUCKET`-wide) slot range.
pub struct RecordStore {
    record_size: usize,
    data: Vec<u8>,
}

impl RecordStore {
    pub fn new(record_size: usize) -> Self {
        let total = BUCKET_COUNT as u64 * ITEMS_PER_BUCKET * record_size as u64;
        RecordStore {
            record_size,
            data: vec![0u8; total as usize],
        }
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn record_at(&self, abs_pos: u64) -> &[u8] {
        let off = abs_pos as usize * self.record_size;
        &self.data[off..off + self.record_size]
    }

    pub fn record_at_mut(&mut self, abs_pos: u64) -> &mut [u8] {
        let off = abs_pos as usize * self.record_size;
        &mut self.data[off..off + self.record_size]
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StepStats {
    pub emitted: u64,
    pub dropped_overflow: u64,
    pub dropped_zero_qword: u64,
}

fn group_hash(step: usize, record: &[u8]) -> u32 {
    let seg = xstring::get_segment(record, step, step);
    (seg >> BUCKET_COUNT_BITS) & HASH_TABLE_MASK
}

/// Groups the valid (non-discarded-as-too-large) positions of `bucket`'s
/// input strings by their grouping hash, mirroring the `count`/`cum_sum`/
/// `collisions` branchless-scatter discipline: a single forward pass counts
/// group sizes, a prefix sum assigns each valid group a contiguous output
/// range (index 0 reserved as the scratch sink for oversized/singleton
/// groups), and a second pass scatters positions into those ranges.
fn collect_groups(
    step: usize,
    bucket: u32,
    input: &RecordStore,
    input_index: &BucketIndex,
    too_many: u32,
) -> Vec<Vec<u64>> {
    let positions: Vec<u64> = input_index.valid_positions(bucket as usize).collect();
    let mut count = vec![0u32; HASH_TABLE_SIZE];
    let mut hash_of = vec![0u32; positions.len()];
    for (i, &pos) in positions.iter().enumerate() {
        let h = group_hash(step, input.record_at(pos));
        hash_of[i] = h;
        count[h as usize] += 1;
    }

    let mut cum_sum = vec![0u32; HASH_TABLE_SIZE];
    let mut running = 1u32;
    for h in 0..HASH_TABLE_SIZE {
        if count[h] >= 2 && count[h] < too_many {
            cum_sum[h] = running;
            running += count[h];
        }
    }

    let mut collisions = vec![0u64; running as usize];
    let mut cursor = cum_sum.clone();
    for (i, &pos) in positions.iter().enumerate() {
        let h = hash_of[i] as usize;
        if cum_sum[h] > 0 {
            collisions[cursor[h] as usize] = pos;
            cursor[h] += 1;
        }
    }

    let mut groups = Vec::new();
    for h in 0..HASH_TABLE_SIZE {
        if cum_sum[h] > 0 {
            let start = cum_sum[h] as usize;
            let end = cursor[h] as usize;
            groups.push(collisions[start..end].to_vec());
        }
    }
    groups
}

/// Runs reduction step `step` (`0..=7`), writing step `step+1`'s strings into
/// `output` and snapshotting every input string's own pair-link into
/// `pair_link_out` (the array later reconstruction reads as "level `step`").
pub fn run_step(
    step: usize,
    input: &RecordStore,
    input_index: &BucketIndex,
    output: &mut RecordStore,
    output_index: &mut BucketIndex,
    pair_link_out: &mut [u32],
    config: &crate::solver::SolverConfig,
) -> StepStats {
    let mut stats = StepStats::default();
    output_index.reset_for_normal();

    for op in 0..PARTITION_COUNT {
        let lo = op * BUCKETS_PER_OUTER_PARTITION;
        let hi = lo + BUCKETS_PER_OUTER_PARTITION;
        for bucket in lo..hi {
            let bucket = bucket as u32;
            for pos in input_index.valid_positions(bucket as usize) {
                pair_link_out[pos as usize] = xstring::get_link(input.record_at(pos));
            }

            let groups = collect_groups(step, bucket, input, input_index, TOO_MANY_BASIC_COLLISIONS);
            for group in &groups {
                for i in 0..group.len() {
                    for j in (i + 1)..group.len() {
                        output_string(
                            step, bucket, group[i], group[j], input, output, output_index, config,
                            &mut stats,
                        );
                    }
                }
            }
        }
        for bucket in 0..BUCKET_COUNT {
            output_index.close_partition(bucket);
        }
    }
    stats
}

fn output_string(
    step: usize,
    input_bucket: u32,
    pos_a: u64,
    pos_b: u64,
    input: &RecordStore,
    output: &mut RecordStore,
    output_index: &mut BucketIndex,
    config: &crate::solver::SolverConfig,
    stats: &mut StepStats,
) {
    let seg_a = xstring::get_segment(input.record_at(pos_a), step, step + 1);
    let seg_b = xstring::get_segment(input.record_at(pos_b), step, step + 1);
    let out_bucket = (seg_a ^ seg_b) & BUCKET_NUMBER_MASK;

    if config.check_bucket_overflow && output_index.would_overflow(out_bucket as usize) {
        stats.dropped_overflow += 1;
        return;
    }

    let local_a = (pos_a % ITEMS_PER_BUCKET, pos_a);
    let local_b = (pos_b % ITEMS_PER_BUCKET, pos_b);
    let (smaller, larger) = if local_a.0 < local_b.0 {
        (local_a.0, local_b.0)
    } else {
        (local_b.0, local_a.0)
    };
    assert!(smaller < larger, "step {step}: colliding positions collapsed to one slot");
    let link = pairlink::encode(larger, smaller, input_bucket);

    let out_pos = output_index.reserve_slot(out_bucket as usize);
    let out_record = output.record_at_mut(out_pos);
    xstring::set_link(out_record, link);
    for seg in (step + 1)..crate::solver::config::TOTAL_SEGMENTS_COUNT {
        let xa = xstring::get_segment(input.record_at(pos_a), step, seg);
        let xb = xstring::get_segment(input.record_at(pos_b), step, seg);
        xstring::set_segment(out_record, step + 1, seg, xa ^ xb);
    }

    if config.filter_zero_qword_strings {
        let out_record = output.record_at(out_pos);
        if out_record[xstring::LINK_BYTES..].iter().take(8).all(|&b| b == 0) {
            stats.dropped_zero_qword += 1;
            output_index.retract_last(out_bucket as usize);
            return;
        }
    }
    stats.emitted += 1;
}

/// One surviving step-8 candidate: the pair-links and positions of its two
/// step-8 *input* strings (step 7's outputs), not yet translated further.
#[derive(Debug, Clone, Copy)]
pub struct SolutionCandidate {
    pub link_left: u32,
    pub link_right: u32,
    pub pos_left: u64,
    pub pos_right: u64,
}

/// Runs the final step: instead of emitting new strings, emits
/// [`SolutionCandidate`]s wherever a pair's last two segments agree exactly
/// (the full 40-bit remainder XORs to zero).
pub fn run_final_step(
    input: &RecordStore,
    input_index: &BucketIndex,
    config: &crate::solver::SolverConfig,
) -> Vec<SolutionCandidate> {
    let step = crate::solver::config::TOTAL_SEGMENTS_COUNT - 2; // step 7's output segment index == 8
    let mut out = Vec::new();

    for bucket in 0..BUCKET_COUNT as u32 {
        let groups = collect_groups(step, bucket, input, input_index, TOO_MANY_FINAL_COLLISIONS);
        let mut last_last_two: Option<u64> = None;
        for group in &groups {
            // TOO_MANY_FINAL_COLLISIONS == 3, so a valid group here always has
            // exactly 2 members (2 <= size < 3).
            debug_assert_eq!(group.len(), 2);
            let (pos_a, pos_b) = (group[0], group[1]);
            let rec_a = input.record_at(pos_a);
            let rec_b = input.record_at(pos_b);
            let seg8_a = xstring::get_segment(rec_a, step, step);
            let seg8_b = xstring::get_segment(rec_b, step, step);
            let seg9_a = xstring::get_segment(rec_a, step, step + 1);
            let seg9_b = xstring::get_segment(rec_b, step, step + 1);
            if seg8_a != seg8_b || seg9_a != seg9_b {
                continue;
            }

            if config.step8_filter_by_last_segment {
                let last_two = ((seg8_a as u64) << 32) | seg9_a as u64;
                if last_last_two == Some(last_two) {
                    continue;
                }
                last_last_two = Some(last_two);
            }

            out.push(SolutionCandidate {
                link_left: xstring::get_link(rec_a),
                link_right: xstring::get_link(rec_b),
                pos_left: pos_a,
                pos_right: pos_b,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::config::{hash_length, record_size};

    fn make_store(step: usize) -> RecordStore {
        RecordStore::new(record_size(step))
    }

    #[test]
    fn record_store_round_trips() {
        let store = make_store(0);
        let _ = hash_length(0);
        assert_eq!(store.record_at(0).len(), record_size(0));
    }

    #[test]
    fn run_step_links_colliding_pair() {
        let step = 0;
        let mut input = make_store(step);
        let mut input_index = BucketIndex::new();

        // Two strings landing in bucket 5, sharing segment 0 (so they group
        // together) and differing only in segment 1 (so the output bucket is
        // deterministic and their XOR isn't trivially zero everywhere).
        let pos0 = input_index.reserve_slot(5);
        {
            let rec = input.record_at_mut(pos0);
            xstring::set_link(rec, pairlink::encode_single(100));
            xstring::set_segment(rec, step, 0, 5); // bucket 5
            xstring::set_segment(rec, step, 1, 0xAAAA);
        }
        let pos1 = input_index.reserve_slot(5);
        {
            let rec = input.record_at_mut(pos1);
            xstring::set_link(rec, pairlink::encode_single(101));
            xstring::set_segment(rec, step, 0, 5);
            xstring::set_segment(rec, step, 1, 0xAAAB);
        }
        input_index.close_partitions_for_new_strings();

        let mut output = make_store(step + 1);
        let mut output_index = BucketIndex::new();
        let mut pair_link_out = vec![0u32; (BUCKET_COUNT as u64 * ITEMS_PER_BUCKET) as usize];
        let config = crate::solver::SolverConfig::default();

        let stats = run_step(
            step,
            &input,
            &input_index,
            &mut output,
            &mut output_index,
            &mut pair_link_out,
            &config,
        );
        assert_eq!(stats.emitted, 1);
        assert_eq!(pair_link_out[pos0 as usize], pairlink::encode_single(100));
        assert_eq!(pair_link_out[pos1 as usize], pairlink::encode_single(101));

        let expected_bucket = (0xAAAAu32 ^ 0xAAABu32) & BUCKET_NUMBER_MASK;
        assert_eq!(output_index.bucket_size(expected_bucket as usize), 1);
    }
}
