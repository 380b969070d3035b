//! Cubic-bezier easing (CSS / After Effects speed-graph form).

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 24;
const DERIVATIVE_EPSILON: f64 = 1e-7;
const SOLVE_EPSILON: f64 = 1e-9;

/// Easing tangent pair attached to a keyframe segment.
///
/// `(out_x, out_y)` is the first control point (the out tangent of the segment's start keyframe),
/// `(in_x, in_y)` the second one (the in tangent of the segment's end keyframe).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EaseCurve {
    /// First control point x.
    pub out_x: f64,
    /// First control point y.
    pub out_y: f64,
    /// Second control point x.
    pub in_x: f64,
    /// Second control point y.
    pub in_y: f64,
}

impl EaseCurve {
    /// Linear curve.
    pub const LINEAR: Self = Self {
        out_x: 0.0,
        out_y: 0.0,
        in_x: 1.0,
        in_y: 1.0,
    };

    /// Map normalized progress `x` to eased progress.
    pub fn apply(self, x: f64) -> f64 {
        solve(x, self.out_x, self.out_y, self.in_x, self.in_y)
    }
}

/// Solve the cubic bezier `(0,0) (x1,y1) (x2,y2) (1,1)` for `x` and return its `y`.
///
/// Always returns a finite value in `[0, 1]`, whatever the control points.
pub fn solve(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // Monotonic x requires x control points in [0,1]. Non-finite points degrade to linear.
    let x1 = finite_or(x1, 0.0).clamp(0.0, 1.0);
    let x2 = finite_or(x2, 1.0).clamp(0.0, 1.0);
    let y1 = finite_or(y1, 0.0);
    let y2 = finite_or(y2, 1.0);

    let t = match solve_curve_x(x, x1, x2) {
        Some(t) => t,
        None => x,
    };

    let y = sample_curve(y1, y2, t);
    if y.is_finite() { y.clamp(0.0, 1.0) } else { x }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
    let omt = 1.0 - t;
    3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
}

fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
    let omt = 1.0 - t;
    3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
}

/// Find `t` such that `bx(t) == x`. `None` when the root cannot be bracketed.
fn solve_curve_x(x: f64, x1: f64, x2: f64) -> Option<f64> {
    // Newton-Raphson first: converges in a handful of steps for well-behaved curves.
    let mut t = x;
    for _ in 0..NEWTON_ITERATIONS {
        let err = sample_curve(x1, x2, t) - x;
        if err.abs() < SOLVE_EPSILON {
            return Some(t);
        }
        let d = sample_curve_derivative(x1, x2, t);
        if d.abs() < DERIVATIVE_EPSILON {
            break;
        }
        t = (t - err / d).clamp(0.0, 1.0);
    }

    // Bisection fallback over [0,1].
    let mut lo = 0.0;
    let mut hi = 1.0;
    let f_lo = sample_curve(x1, x2, lo) - x;
    let f_hi = sample_curve(x1, x2, hi) - x;
    if !(f_lo <= 0.0 && f_hi >= 0.0) {
        return None;
    }
    t = 0.5;
    for _ in 0..BISECTION_ITERATIONS {
        let v = sample_curve(x1, x2, t);
        if (v - x).abs() < SOLVE_EPSILON {
            return Some(t);
        }
        if v < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }
    Some(t)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/ease.rs"]
mod tests;
