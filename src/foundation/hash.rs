use crate::foundation::core::{Affine, Point};
use crate::foundation::quantize::{quantize_affine, quantize_point, quantized_int};
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6a09e667f3bcc908;

/// 128-bit content fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint128 {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

/// Order-sensitive xxh3 hasher over quantized values.
///
/// Floats are never hashed by bit pattern; callers pass them through a quantization step first.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_len(&mut self, n: usize) {
        self.write_u64(n as u64);
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_quantized(&mut self, v: f64, step: f64) {
        self.write_i64(quantized_int(v, step));
    }

    pub(crate) fn write_point(&mut self, p: Point) {
        for q in quantize_point(p) {
            self.write_i64(q);
        }
    }

    pub(crate) fn write_affine(&mut self, m: Affine) {
        for q in quantize_affine(m) {
            self.write_i64(q);
        }
    }

    pub(crate) fn finish(self) -> Fingerprint128 {
        let v = self.inner.digest128();
        Fingerprint128 {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/hash.rs"]
mod tests;
