//! # Proof-of-Work Arithmetic
//!
//! Compact target decoding and per-block work, in the classic `nBits` form.
//!
//! ```text
//! bits = [exponent: 8][sign: 1][mantissa: 23]
//! target = mantissa * 256^(exponent - 3)
//! work   = 2^256 / (target + 1)
//! ```

use crate::entities::{BlockHeader, Hash, U256};

/// Compact bits of the easiest target on private test networks.
pub const REGTEST_POW_LIMIT_BITS: u32 = 0x207f_ffff;

/// Compact bits of the easiest target on the main network.
pub const MAINNET_POW_LIMIT_BITS: u32 = 0x1d00_ffff;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Decodes a compact target.
///
/// Returns `None` for negative, zero or overflowing encodings.
pub fn target_from_compact(bits: u32) -> Option<U256> {
    let exponent = (bits >> 24) as usize;
    let mantissa = bits & MANTISSA_MASK;

    if mantissa == 0 || bits & SIGN_BIT != 0 {
        return None;
    }
    if exponent > 34 || (mantissa > 0xff && exponent > 33) || (mantissa > 0xffff && exponent > 32)
    {
        return None;
    }

    let target = if exponent <= 3 {
        U256::from(mantissa >> (8 * (3 - exponent)))
    } else {
        U256::from(mantissa) << (8 * (exponent - 3))
    };

    if target.is_zero() {
        None
    } else {
        Some(target)
    }
}

/// Expected number of hashes needed to meet `target`.
///
/// Computed as `~target / (target + 1) + 1`, which equals
/// `2^256 / (target + 1)` without needing 257-bit arithmetic.
pub fn block_proof(target: U256) -> U256 {
    (!target / target.saturating_add(U256::one())) + U256::one()
}

/// Interprets a header hash as a little-endian 256-bit number.
pub fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_little_endian(hash)
}

/// True if the hash satisfies the proof-of-work target.
pub fn hash_meets_target(hash: &Hash, target: U256) -> bool {
    hash_to_u256(hash) <= target
}

/// Grinds the nonce until the header meets its own target.
///
/// Only practical for easy targets such as regtest. Returns `false` if the
/// bits are invalid or the nonce space is exhausted.
pub fn solve_header(header: &mut BlockHeader) -> bool {
    let Some(target) = target_from_compact(header.bits) else {
        return false;
    };
    loop {
        if hash_meets_target(&header.block_hash(), target) {
            return true;
        }
        match header.nonce.checked_add(1) {
            Some(next) => header.nonce = next,
            None => return false,
        }
    }
}
