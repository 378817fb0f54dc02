//! Solution reconstruction: walks a step-8 [`SolutionCandidate`]'s ancestry
//! back through the pair-link arrays to its 512 original indices, rejects
//! duplicates, optionally re-verifies from scratch, and canonicalises.
use crate::solver::config::{PAIR_LINK_ARRAY_COUNT, SOLUTION_SIZE};
use crate::solver::pairlink;
use crate::solver::reduction::SolutionCandidate;
use crate::solver::wire;

/// Snapshots of every input string's own pair-link, one per reduction step
/// `0..=7`, captured by [`crate::solver::reduction::run_step`] as it ran.
/// Level 0 holds `single_index` values (direct lookup, no `translate`);
/// levels `1..=7` hold combinatorial links requiring `translate`.
pub struct PairLinkArrays {
    levels: Vec<Vec<u32>>,
}

impl PairLinkArrays {
    pub fn new(slots_per_level: u64) -> Self {
        PairLinkArrays {
            levels: (0..PAIR_LINK_ARRAY_COUNT)
                .map(|_| vec![0u32; slots_per_level as usize])
                .collect(),
        }
    }

    pub fn level_mut(&mut self, level: usize) -> &mut [u32] {
        &mut self.levels[level]
    }

    pub fn level(&self, level: usize) -> &[u32] {
        &self.levels[level]
    }
}

/// Translates a step-8 candidate all the way back to its 512 original
/// indices. Returns `None` if the candidate's immediate parents overlap
/// (the cheap pre-check from SPEC_FULL.md §4.8) or if the final index set
/// contains a duplicate.
pub fn extract_solution(candidate: &SolutionCandidate, links: &PairLinkArrays) -> Option<Vec<u32>> {
    let (p0, p1) = pairlink::translate(candidate.link_left, candidate.pos_left);
    let (p2, p3) = pairlink::translate(candidate.link_right, candidate.pos_right);
    if p0 == p2 || p0 == p3 || p1 == p2 || p1 == p3 {
        return None;
    }

    let mut positions = vec![p0, p1, p2, p3];
    for level in (1..PAIR_LINK_ARRAY_COUNT).rev() {
        let arr = links.level(level);
        let mut next = Vec::with_capacity(positions.len() * 2);
        for pos in positions {
            let link = arr[pos as usize];
            let (smaller, larger) = pairlink::translate(link, pos);
            next.push(smaller);
            next.push(larger);
        }
        positions = next;
    }
    debug_assert_eq!(positions.len(), SOLUTION_SIZE);

    let level0 = links.level(0);
    let solution: Vec<u32> = positions.iter().map(|&pos| level0[pos as usize]).collect();

    if has_duplicate(&solution) {
        return None;
    }
    Some(solution)
}

/// Whether `indices` contains any repeated value. Most false candidates are
/// eliminated here, before the optional (and much costlier) recompute pass.
fn has_duplicate(indices: &[u32]) -> bool {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[0] == w[1])
}

/// Regenerates the 512 original strings from `header` via the same Blake2b
/// engine and verifies the solution independently of the reduction pipeline
/// that produced it, by round-tripping it through the existing Equihash
/// verifier. Used when `SolverConfig::recompute_solution` is set.
pub fn recompute_and_verify(header: &[u8], indices: &[u32]) -> bool {
    match wire::compact_from_indices(indices) {
        Ok(minimal) => crate::equihash::verify_equihash_solution(header, &minimal).is_ok(),
        Err(_) => false,
    }
}

/// Canonicalises a solution in place: for every level `l = 0..9`, for each
/// contiguous sibling block of width `2^(l+1)`, swaps the two halves if the
/// left half's first index is not already less than the right half's.
pub fn reorder_solution(solution: &mut [u32]) {
    debug_assert_eq!(solution.len(), SOLUTION_SIZE);
    for level in 0..9 {
        let width = 1usize << (level + 1);
        let half = width / 2;
        let mut start = 0;
        while start < solution.len() {
            if solution[start] >= solution[start + half] {
                let (left, right) = solution[start..start + width].split_at_mut(half);
                left.swap_with_slice(right);
            }
            start += width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_swaps_out_of_order_leaf_pairs() {
        let mut solution: Vec<u32> = (0..SOLUTION_SIZE as u32).collect();
        solution.swap(0, 1);
        reorder_solution(&mut solution);
        assert!(solution[0] < solution[1]);
    }

    #[test]
    fn extract_solution_rejects_overlapping_immediate_parents() {
        let links = PairLinkArrays::new(16);
        let candidate = SolutionCandidate {
            link_left: pairlink::encode(2, 1, 0),
            link_right: pairlink::encode(2, 0, 0),
            pos_left: 0,
            pos_right: 0,
        };
        assert!(extract_solution(&candidate, &links).is_none());
    }

    #[test]
    fn has_duplicate_flags_a_repeated_index() {
        let mut indices: Vec<u32> = (0..SOLUTION_SIZE as u32).collect();
        assert!(!has_duplicate(&indices));
        indices[100] = indices[200];
        assert!(has_duplicate(&indices));
    }

    #[test]
    fn reorder_is_idempotent_on_an_already_canonical_solution() {
        let canonical: Vec<u32> = (0..SOLUTION_SIZE as u32).collect();
        let mut permuted = canonical.clone();
        // Swap the two halves of the level-3 sibling block covering indices
        // 0..16 (width 2^4): positions 0..8 vs 8..16.
        let (left, right) = permuted[0..16].split_at_mut(8);
        left.swap_with_slice(right);
        assert_ne!(permuted, canonical);

        reorder_solution(&mut permuted);
        assert_eq!(permuted, canonical);
    }
}
