use crate::foundation::core::{Affine, Vec2};
use crate::foundation::quantize::NEARLY_EQUAL_EPSILON;

/// Determinants smaller than this are treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Extra operations on [`kurbo::Affine`] in "apply self, then other" vocabulary.
///
/// kurbo composes column-vector style (`a * b` applies `b` first). Scene code reads more naturally
/// left-to-right, so `a.concatenating(b)` means "apply `a`, then `b`", i.e. `b * a`.
pub trait AffineExt: Sized {
    /// Apply `self`, then `other`.
    fn concatenating(self, other: Self) -> Self;
    /// Coefficient-wise comparison at [`NEARLY_EQUAL_EPSILON`].
    fn approx_eq(self, other: Self) -> bool;
    /// `true` when the determinant is (numerically) zero.
    fn is_singular(self) -> bool;
    /// Inverse, or `None` for singular matrices.
    fn checked_inverse(self) -> Option<Self>;
}

impl AffineExt for Affine {
    fn concatenating(self, other: Self) -> Self {
        other * self
    }

    fn approx_eq(self, other: Self) -> bool {
        self.as_coeffs()
            .iter()
            .zip(other.as_coeffs().iter())
            .all(|(a, b)| (a - b).abs() < NEARLY_EQUAL_EPSILON)
    }

    fn is_singular(self) -> bool {
        let det = self.determinant();
        !det.is_finite() || det.abs() < SINGULAR_DETERMINANT
    }

    fn checked_inverse(self) -> Option<Self> {
        if self.is_singular() {
            return None;
        }
        let inv = self.inverse();
        inv.as_coeffs().iter().all(|c| c.is_finite()).then_some(inv)
    }
}

/// Lottie/AE layer transform: `T(position) * R(rotation) * S(scale) * T(-anchor)`.
///
/// `scale` is a plain factor (already divided by 100), rotation is in degrees.
pub fn layer_matrix(position: Vec2, anchor: Vec2, scale: Vec2, rotation_deg: f64) -> Affine {
    let t_position = Affine::translate(position);
    let t_rotate = Affine::rotate(rotation_deg.to_radians());
    let t_scale = Affine::scale_non_uniform(scale.x, scale.y);
    let t_unanchor = Affine::translate(-anchor);

    // Canonical order:
    // T(position) * R(rot) * S(scale) * T(-anchor)
    t_position * t_rotate * t_scale * t_unanchor
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/affine.rs"]
mod tests;
