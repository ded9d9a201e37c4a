//! Two-lane 32-bit multiplicative mixing hash.
//!
//! Output must stay bit-identical across platforms and releases: persisted
//! fingerprints are compared against freshly computed ones.

const SEED_HIGH: u32 = 0x41c6_ce57;
const SEED_LOW: u32 = 0xdead_beef;

/// Hash `token` into `(high, low)` 32-bit words. Byte order matters.
pub fn hash_token(token: &str) -> (u32, u32) {
    let mut h1 = SEED_LOW;
    let mut h2 = SEED_HIGH;
    for b in token.bytes() {
        let b = u32::from(b);
        h1 = (h1 ^ b).wrapping_mul(2_654_435_761);
        h2 = (h2 ^ b).wrapping_mul(1_597_334_677);
    }
    h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507) ^ (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
    h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507) ^ (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);
    (h2, h1)
}

/// [`hash_token`] packed into one `u64` with the high word on top.
#[inline]
pub fn hash_token_u64(token: &str) -> u64 {
    let (high, low) = hash_token(token);
    (u64::from(high) << 32) | u64::from(low)
}
