//! 64-bit content fingerprints (frequency-weighted SimHash).

use crate::hash::hash_token_u64;
use crate::tokenizer::{term_frequencies, tokenize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const FINGERPRINT_BITS: u32 = 64;
const HEX_LEN: usize = 16;

/// A 64-bit similarity fingerprint stored as two 32-bit words.
///
/// Bit `i` of the fingerprint is bit `i` of `(high << 32) | low`. Not suitable
/// for anything security related.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    pub high: u32,
    pub low: u32,
}

impl Fingerprint {
    pub const ZERO: Self = Self { high: 0, low: 0 };

    pub fn new(high: u32, low: u32) -> Self {
        Self { high, low }
    }

    pub fn from_u64(value: u64) -> Self {
        Self {
            high: (value >> 32) as u32,
            low: value as u32,
        }
    }

    pub fn as_u64(&self) -> u64 {
        (u64::from(self.high) << 32) | u64::from(self.low)
    }

    /// True for the canonical "no tokens" fingerprint and for unparseable
    /// persisted values. Callers treat it as "no similarity data".
    pub fn is_zero(&self) -> bool {
        self.high == 0 && self.low == 0
    }

    /// XOR + popcount per half.
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        (self.high ^ other.high).count_ones() + (self.low ^ other.low).count_ones()
    }

    pub fn similarity(&self, other: &Self) -> u8 {
        distance_to_similarity(self.hamming_distance(other))
    }

    /// LSH bucket: top 8 bits of the high word.
    pub fn bucket_key(&self) -> u8 {
        (self.high >> 24) as u8
    }

    pub fn to_hex(&self) -> String {
        format!("{:08x}{:08x}", self.high, self.low)
    }

    /// Exact inverse of [`Fingerprint::to_hex`]; `None` unless the input is
    /// exactly 16 hex digits.
    pub fn parse_hex(s: &str) -> Option<Self> {
        if s.len() != HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let high = u32::from_str_radix(&s[..8], 16).ok()?;
        let low = u32::from_str_radix(&s[8..], 16).ok()?;
        Some(Self { high, low })
    }

    /// Lenient parse for persisted values: anything malformed becomes
    /// [`Fingerprint::ZERO`].
    pub fn from_hex(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or_else(|| {
            tracing::warn!(len = s.len(), "unparseable fingerprint, using zero");
            Self::ZERO
        })
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}{:08x}", self.high, self.low)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_hex(&s))
    }
}

/// Fingerprint arbitrary text. Never fails; text without usable tokens yields
/// [`Fingerprint::ZERO`].
pub fn fingerprint(text: &str) -> Fingerprint {
    fingerprint_tokens(&tokenize(text))
}

/// Fingerprint an already tokenized text.
pub fn fingerprint_tokens(tokens: &[String]) -> Fingerprint {
    if tokens.is_empty() {
        return Fingerprint::ZERO;
    }
    let mut acc = [0i64; FINGERPRINT_BITS as usize];
    for (token, count) in term_frequencies(tokens) {
        let bits = hash_token_u64(token);
        let weight = i64::from(count);
        for (i, slot) in acc.iter_mut().enumerate() {
            if (bits >> i) & 1 == 1 {
                *slot += weight;
            } else {
                *slot -= weight;
            }
        }
    }
    let mut out = 0u64;
    for (i, &v) in acc.iter().enumerate() {
        // A tie (v == 0) stays 0. Persisted fingerprints depend on this.
        if v > 0 {
            out |= 1u64 << i;
        }
    }
    Fingerprint::from_u64(out)
}

pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> u32 {
    a.hamming_distance(b)
}

/// `round((1 - d / 64) * 100)`, clamped to `0..=100`.
pub fn distance_to_similarity(distance: u32) -> u8 {
    let d = distance.min(FINGERPRINT_BITS) as f64;
    ((1.0 - d / FINGERPRINT_BITS as f64) * 100.0).round() as u8
}

pub fn fingerprint_to_hex(fp: &Fingerprint) -> String {
    fp.to_hex()
}

pub fn hex_to_fingerprint(s: &str) -> Fingerprint {
    Fingerprint::from_hex(s)
}
