//! Stable float → integer-grid mapping.
//!
//! Every cache key and every equality-sensitive hash in the crate goes through this module, so
//! that sub-epsilon float noise (e.g. `1e-12` drift from matrix products) never produces two keys
//! for what is semantically the same value.

use crate::foundation::core::{Affine, Point};

/// Grid step for matrix coefficients and path coordinates.
pub const COORD_STEP: f64 = 1.0 / 1024.0;
/// Grid step for stroke widths.
pub const STROKE_WIDTH_STEP: f64 = 1.0 / 8.0;
/// Two keyframe times closer than this are the same instant.
pub const KEYFRAME_TIME_EPSILON: f64 = 0.001;
/// Grid step for frames used as path-sampling-cache keys.
pub const CACHE_FRAME_STEP: f64 = 1.0 / 1000.0;
/// Differences at or above this are always preserved by quantization.
pub const NEARLY_EQUAL_EPSILON: f64 = 0.001;

const NAN_KEY: i64 = i64::MIN;
const POS_INF_KEY: i64 = i64::MAX;
const NEG_INF_KEY: i64 = i64::MIN + 1;

/// `round(v / step)`. Non-finite inputs map to fixed sentinels so they still hash stably.
pub fn quantized_int(v: f64, step: f64) -> i64 {
    if v.is_nan() {
        return NAN_KEY;
    }
    if v == f64::INFINITY {
        return POS_INF_KEY;
    }
    if v == f64::NEG_INFINITY {
        return NEG_INF_KEY;
    }
    let q = (v / step).round();
    // Saturate instead of wrapping for absurdly large values.
    q.clamp((NEG_INF_KEY + 1) as f64, (POS_INF_KEY - 1) as f64) as i64
}

/// Quantized coordinate key.
pub fn quantize_coord(v: f64) -> i64 {
    quantized_int(v, COORD_STEP)
}

/// Quantized point key.
pub fn quantize_point(p: Point) -> [i64; 2] {
    [quantize_coord(p.x), quantize_coord(p.y)]
}

/// Quantized affine key over all six coefficients.
pub fn quantize_affine(m: Affine) -> [i64; 6] {
    m.as_coeffs().map(quantize_coord)
}

/// Quantized stroke width key.
pub fn quantize_stroke_width(w: f64) -> i64 {
    quantized_int(w, STROKE_WIDTH_STEP)
}

/// Quantized frame key used by the path sampling cache.
pub fn quantize_frame(frame: f64) -> i64 {
    quantized_int(frame, CACHE_FRAME_STEP)
}

/// Approximate float equality at [`NEARLY_EQUAL_EPSILON`].
pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < NEARLY_EQUAL_EPSILON
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/quantize.rs"]
mod tests;
