//! Minimal (compact) <-> expanded (512 big-endian `u32` index array) solution
//! codec, grounded on [`crate::equihash`]'s `expand_array`/`indices_from_minimal`
//! (themselves ports of zcashd's `ExpandArray`/`GetIndicesFromMinimal`). This
//! module supplies the missing inverse, `CompressArray`, needed to go from a
//! freshly-solved index array back to the wire encoding.
use crate::equihash::{indices_from_minimal, Params};
use crate::solver::config::{HASH_SEGMENT_BITS, SOLUTION_SIZE};
use crate::solver::error::SolverError;

/// Inverse of `crate::equihash`'s private `expand_array`: packs a big-endian,
/// byte-padded fixed-width array back down to a bit-packed minimal array.
fn compress_array(vin: &[u8], bit_len: usize, byte_pad: usize) -> Vec<u8> {
    assert!(bit_len >= 8);
    assert!((u32::BITS as usize) >= 7 + bit_len);

    let in_width = bit_len.div_ceil(8) + byte_pad;
    let out_len = bit_len * vin.len() / (8 * in_width);
    let mut vout = vec![0u8; out_len];
    let bit_len_mask: u32 = (1 << bit_len) - 1;

    let mut acc_bits = 0usize;
    let mut acc_value: u32 = 0;
    let mut j = 0usize;

    for byte in vout.iter_mut() {
        if acc_bits < 8 {
            acc_value <<= bit_len;
            for x in byte_pad..in_width {
                acc_value |= (u32::from(vin[j + x])
                    & ((bit_len_mask >> (8 * (in_width - x - 1))) & 0xFF))
                    << (8 * (in_width - x - 1));
            }
            j += in_width;
            acc_bits += bit_len;
        }
        acc_bits -= 8;
        *byte = ((acc_value >> acc_bits) & 0xFF) as u8;
    }
    vout
}

/// Packs a 512-index solution into Zcash's minimal on-wire encoding.
pub fn compact_from_indices(indices: &[u32]) -> Result<Vec<u8>, SolverError> {
    if indices.len() != SOLUTION_SIZE {
        return Err(SolverError::WrongSolutionSize {
            expected: SOLUTION_SIZE,
            actual: indices.len(),
        });
    }
    let digit_bits = HASH_SEGMENT_BITS as usize + 1;
    let digit_bytes = digit_bits.div_ceil(8);
    let byte_pad = core::mem::size_of::<u32>() - digit_bytes;

    let mut expanded = Vec::with_capacity(indices.len() * 4);
    for &idx in indices {
        expanded.extend_from_slice(&idx.to_be_bytes());
    }
    Ok(compress_array(&expanded, digit_bits, byte_pad))
}

/// Unpacks Zcash's minimal on-wire encoding back into 512 big-endian indices.
pub fn indices_from_compact(n: u32, k: u32, compact: &[u8]) -> Result<Vec<u32>, SolverError> {
    let p = Params::new(n, k).ok_or(SolverError::UnsupportedParams { n, k })?;
    let expected = (SOLUTION_SIZE * (HASH_SEGMENT_BITS as usize + 1)) / 8;
    if compact.len() != expected {
        return Err(SolverError::WrongCompactLength {
            expected,
            actual: compact.len(),
        });
    }
    indices_from_minimal(p, compact).ok_or(SolverError::WrongCompactLength {
        expected,
        actual: compact.len(),
    })
}
