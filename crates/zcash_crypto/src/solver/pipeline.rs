//! [`Solver`]: the top-level facade driving initial string generation, the
//! eight reduction steps, the final step, and solution reconstruction.
use tracing::{debug, info};

use crate::solver::bucket::BucketIndex;
use crate::solver::config::{
    record_size, BUCKET_COUNT, BUCKET_NUMBER_MASK, ITEMS_PER_BUCKET, INITIAL_STRING_SET_SIZE,
    N_PARAMETER, POWHEADER_LEN, TOTAL_SEGMENTS_COUNT,
};
use crate::solver::error::SolverError;
use crate::solver::reduction::{self, RecordStore};
use crate::solver::solution::{self, PairLinkArrays};
use crate::solver::{blake, pairlink, xstring, SolverConfig};

/// Total address space every `RecordStore`/`PairLinkArrays` level spans:
/// every bucket's full `ITEMS_PER_BUCKET` slot range, whether or not a given
/// run actually fills it.
const TOTAL_CAPACITY: u64 = BUCKET_COUNT as u64 * ITEMS_PER_BUCKET;

/// A single in-process Equihash(200,9) solver run. Not reused across
/// concurrent headers: call [`Solver::reset`] before each [`Solver::run`].
pub struct Solver {
    config: SolverConfig,
    header: Vec<u8>,
    engine: Option<blake::Blake2bEngine>,
    solutions: Vec<Vec<u32>>,
    invalid_solutions: u64,
}

impl Solver {
    pub fn create(config: SolverConfig) -> Self {
        Solver {
            config,
            header: Vec::new(),
            engine: None,
            solutions: Vec::new(),
            invalid_solutions: 0,
        }
    }

    /// Binds this solver to a new 140-byte powheader, clearing any solutions
    /// from a previous run.
    pub fn reset(&mut self, header: &[u8]) -> Result<(), SolverError> {
        if header.len() != POWHEADER_LEN {
            return Err(SolverError::WrongHeaderLength {
                expected: POWHEADER_LEN,
                actual: header.len(),
            });
        }
        self.engine = Some(blake::Blake2bEngine::new(header));
        self.header = header.to_vec();
        self.solutions.clear();
        self.invalid_solutions = 0;
        Ok(())
    }

    pub fn solutions(&self) -> &[Vec<u32>] {
        &self.solutions
    }

    pub fn invalid_solutions(&self) -> u64 {
        self.invalid_solutions
    }

    /// Re-verifies `indices` as a solution for the currently bound header,
    /// independent of whatever pipeline produced them.
    pub fn validate_solution(&self, indices: &[u32]) -> bool {
        solution::recompute_and_verify(&self.header, indices)
    }

    /// Runs the full pipeline once and returns the number of solutions found,
    /// or `-1` if [`Solver::reset`] has not yet succeeded.
    pub fn run(&mut self) -> i64 {
        let Some(engine) = self.engine.as_ref() else {
            return -1;
        };
        info!("generating initial strings");
        let (mut cur_store, mut cur_index) = generate_initial_strings(engine, &self.config);

        let mut pair_links = PairLinkArrays::new(TOTAL_CAPACITY);

        for step in 0..TOTAL_SEGMENTS_COUNT - 2 {
            let mut next_store = RecordStore::new(record_size(step + 1));
            let mut next_index = BucketIndex::new();
            let stats = reduction::run_step(
                step,
                &cur_store,
                &cur_index,
                &mut next_store,
                &mut next_index,
                pair_links.level_mut(step),
                &self.config,
            );
            debug!(
                step,
                emitted = stats.emitted,
                dropped_overflow = stats.dropped_overflow,
                dropped_zero_qword = stats.dropped_zero_qword,
                "reduction step complete"
            );
            cur_store = next_store;
            cur_index = next_index;
        }

        let candidates = reduction::run_final_step(&cur_store, &cur_index, &self.config);
        info!(candidates = candidates.len(), "final step complete");

        for candidate in &candidates {
            match solution::extract_solution(candidate, &pair_links) {
                Some(mut sol) => {
                    solution::reorder_solution(&mut sol);
                    if self.config.recompute_solution && !solution::recompute_and_verify(&self.header, &sol) {
                        self.invalid_solutions += 1;
                        continue;
                    }
                    self.solutions.push(sol);
                }
                None => self.invalid_solutions += 1,
            }
        }

        self.solutions.len() as i64
    }
}

/// Builds the `2 * (INITIAL_STRING_SET_SIZE / 2)` initial strings (§4.5):
/// each Blake2b group digest splits into two `N`-bit halves, each becoming
/// one initial string bucketed on its own leading segment.
fn generate_initial_strings(
    engine: &blake::Blake2bEngine,
    config: &SolverConfig,
) -> (RecordStore, BucketIndex) {
    let half_len = (N_PARAMETER / 8) as usize;
    let mut store = RecordStore::new(record_size(0));
    let mut index = BucketIndex::new();

    let total_groups = INITIAL_STRING_SET_SIZE / 2;
    let width = config.backend.width();
    let mut digest_buf = vec![0u8; blake::DIGEST_LEN * width.max(1)];

    let mut g: u64 = 0;
    while g < total_groups {
        let batch = width.min((total_groups - g) as usize).max(1);
        if batch > 1 {
            engine.finalize_batch(g as u32, batch, &mut digest_buf[..blake::DIGEST_LEN * batch]);
        } else {
            engine.finalize_into(g as u32, &mut digest_buf[..blake::DIGEST_LEN]);
        }

        for w in 0..batch {
            let digest = &digest_buf[w * blake::DIGEST_LEN..(w + 1) * blake::DIGEST_LEN];
            for half in 0..2u64 {
                let global_index = 2 * (g + w as u64) + half;
                let half_bytes = &digest[half as usize * half_len..(half as usize + 1) * half_len];
                let segs = blake::leading_segments(half_bytes);
                let bucket = segs[0] & BUCKET_NUMBER_MASK;

                let pos = index.reserve_slot(bucket as usize);
                let rec = store.record_at_mut(pos);
                xstring::set_link(rec, pairlink::encode_single(global_index as u32));
                for (seg, &value) in segs.iter().enumerate() {
                    xstring::set_segment(rec, 0, seg, value);
                }
            }
        }
        g += batch as u64;
    }

    index.close_partitions_for_new_strings();
    (store, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Vec<u8> {
        (0u8..140).collect()
    }

    #[test]
    fn reset_rejects_wrong_header_length() {
        let mut solver = Solver::create(SolverConfig::default());
        assert!(solver.reset(&[0u8; 10]).is_err());
    }

    #[test]
    fn run_before_reset_returns_negative_one() {
        let mut solver = Solver::create(SolverConfig::default());
        assert_eq!(solver.run(), -1);
    }

    #[test]
    fn generate_initial_strings_covers_all_buckets_worth_of_indices() {
        let header = sample_header();
        let engine = blake::Blake2bEngine::new(&header);
        let config = SolverConfig {
            backend: crate::solver::Backend::Scalar,
            ..SolverConfig::default()
        };
        let (_, index) = generate_initial_strings(&engine, &config);
        let total: u64 = (0..BUCKET_COUNT).map(|b| index.bucket_size(b)).sum();
        assert_eq!(total, INITIAL_STRING_SET_SIZE);
    }
}
