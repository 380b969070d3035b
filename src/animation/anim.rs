use crate::foundation::core::{Rgba, Vec2};
use crate::foundation::quantize::KEYFRAME_TIME_EPSILON;
use crate::geometry::ease::EaseCurve;

/// Linear blend between two values of the same type.
pub trait Lerp: Sized {
    /// Blend `a` toward `b` by `t` (not clamped).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Rgba {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            r: f64::lerp(&a.r, &b.r, t),
            g: f64::lerp(&a.g, &b.g, t),
            b: f64::lerp(&a.b, &b.b, t),
            a: f64::lerp(&a.a, &b.a, t),
        }
    }
}

/// A property that is either constant or keyframed.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum AnimatedValue<T> {
    /// Constant value.
    Static(T),
    /// Keyframes sorted by time; never empty.
    Keyframed(Vec<Keyframe<T>>),
}

/// One keyframe of an [`AnimatedValue`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Keyframe<T> {
    /// Frame of the keyframe, in the owning composition's local time.
    pub time: f64,
    /// Value at `time`.
    pub value: T,
    /// Hold: the value freezes until the next keyframe.
    pub hold: bool,
    /// Easing of the segment toward the next keyframe; linear when absent.
    pub ease: Option<EaseCurve>,
}

/// Where a frame falls relative to a keyframe list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyframeSpan {
    /// Use the value of keyframe `idx` unchanged.
    At(usize),
    /// Blend keyframe `from` toward `from + 1` with eased progress `t`.
    Between {
        /// Index of the segment's start keyframe.
        from: usize,
        /// Eased progress in `[0, 1]`.
        t: f64,
    },
}

/// Locate `frame` in a sorted keyframe list.
///
/// Shared by every keyframed resource so that values and paths agree on timing semantics.
pub fn locate<T>(keys: &[Keyframe<T>], frame: f64) -> Option<KeyframeSpan> {
    let last = keys.len().checked_sub(1)?;
    if frame.is_nan() || frame <= keys[0].time + KEYFRAME_TIME_EPSILON {
        return Some(KeyframeSpan::At(0));
    }
    if frame >= keys[last].time - KEYFRAME_TIME_EPSILON {
        return Some(KeyframeSpan::At(last));
    }

    let idx = keys.partition_point(|k| k.time <= frame);
    let a = &keys[idx - 1];
    let b = &keys[idx];
    if (frame - b.time).abs() < KEYFRAME_TIME_EPSILON {
        return Some(KeyframeSpan::At(idx));
    }
    if a.hold {
        return Some(KeyframeSpan::At(idx - 1));
    }
    let denom = b.time - a.time;
    if denom < KEYFRAME_TIME_EPSILON {
        return Some(KeyframeSpan::At(idx - 1));
    }
    let linear = ((frame - a.time) / denom).clamp(0.0, 1.0);
    let t = a.ease.map_or(linear, |e| e.apply(linear));
    Some(KeyframeSpan::Between { from: idx - 1, t })
}

impl<T> AnimatedValue<T> {
    /// `true` when the value changes over time.
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Keyframed(keys) if keys.len() > 1)
    }

    /// Keyframe times, empty for static values.
    pub fn key_times(&self) -> Vec<f64> {
        match self {
            Self::Static(_) => Vec::new(),
            Self::Keyframed(keys) => keys.iter().map(|k| k.time).collect(),
        }
    }

    /// First value (the static value, or the first keyframe's value).
    pub fn first_value(&self) -> Option<&T> {
        match self {
            Self::Static(v) => Some(v),
            Self::Keyframed(keys) => keys.first().map(|k| &k.value),
        }
    }

    /// Map every value, keeping timing and easing.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> AnimatedValue<U> {
        match self {
            Self::Static(v) => AnimatedValue::Static(f(v)),
            Self::Keyframed(keys) => AnimatedValue::Keyframed(
                keys.iter()
                    .map(|k| Keyframe {
                        time: k.time,
                        value: f(&k.value),
                        hold: k.hold,
                        ease: k.ease,
                    })
                    .collect(),
            ),
        }
    }
}

impl<T> AnimatedValue<T>
where
    T: Lerp + Clone,
{
    /// Sample at `frame`.
    ///
    /// Before the first keyframe the first value is returned, after the last the last value;
    /// hold keyframes freeze until the next keyframe time.
    pub fn sample(&self, frame: f64) -> T {
        match self {
            Self::Static(v) => v.clone(),
            Self::Keyframed(keys) => match locate(keys, frame) {
                Some(KeyframeSpan::At(i)) => keys[i].value.clone(),
                Some(KeyframeSpan::Between { from, t }) => {
                    T::lerp(&keys[from].value, &keys[from + 1].value, t)
                }
                // Keyframed values are never empty; deserialization rejects that shape.
                None => unreachable!("keyframed value without keyframes"),
            },
        }
    }
}

impl<T: Default> Default for AnimatedValue<T> {
    fn default() -> Self {
        Self::Static(T::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
