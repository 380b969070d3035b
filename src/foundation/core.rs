use crate::foundation::error::{AnimirError, AnimirResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Canvas or composition size in scene units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in scene units.
    pub width: f64,
    /// Height in scene units.
    pub height: f64,
}

impl Canvas {
    /// Rectangle `[0, width] x [0, height]`.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Half-open frame window `[in_point, out_point)` in composition-local time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameWindow {
    /// Inclusive start frame.
    pub in_point: f64,
    /// Exclusive end frame.
    pub out_point: f64,
}

impl FrameWindow {
    /// Create a validated window with `in_point <= out_point`.
    pub fn new(in_point: f64, out_point: f64) -> AnimirResult<Self> {
        if !in_point.is_finite() || out_point.is_nan() {
            return Err(AnimirError::validation("FrameWindow bounds must be numbers"));
        }
        if in_point > out_point {
            return Err(AnimirError::validation(
                "FrameWindow in_point must be <= out_point",
            ));
        }
        Ok(Self {
            in_point,
            out_point,
        })
    }

    /// Return `true` when `frame` is inside `[in_point, out_point)`.
    pub fn contains(self, frame: f64) -> bool {
        self.in_point <= frame && frame < self.out_point
    }
}

/// Straight-alpha RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 0.0,
        }
    }

    /// Rec. 709 luminance of the color channels (alpha ignored).
    pub fn luma(self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Parse a `#rrggbb` hex string (Lottie solid color). Returns `None` on malformed input.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| -> Option<f64> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| f64::from(v) / 255.0)
        };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: 1.0,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
