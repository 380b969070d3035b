//! JSON shapes of Lottie animated properties.
//!
//! Lottie encodes a property as `{"a": 0, "k": value}` or `{"a": 1, "k": [keyframes]}`, and
//! scalars are often wrapped in one-element arrays. Everything here accepts those variations and
//! normalizes them into [`AnimatedValue`].

use crate::animation::anim::{AnimatedValue, Keyframe};
use crate::foundation::core::{Point, Rgba, Vec2};
use crate::geometry::ease::EaseCurve;
use crate::geometry::path::BezierPath;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Conversion from a raw Lottie JSON value.
pub trait FromLottie: Sized {
    /// Parse `v`, returning a message describing the expected shape on failure.
    fn from_lottie(v: &JsonValue) -> Result<Self, String>;
}

fn number(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::Array(items) => items.first().and_then(number),
        _ => None,
    }
}

fn numbers(v: &JsonValue) -> Option<Vec<f64>> {
    match v {
        JsonValue::Number(n) => n.as_f64().map(|x| vec![x]),
        JsonValue::Array(items) => items.iter().map(number).collect(),
        _ => None,
    }
}

impl FromLottie for f64 {
    fn from_lottie(v: &JsonValue) -> Result<Self, String> {
        number(v).ok_or_else(|| format!("expected a number, got {v}"))
    }
}

impl FromLottie for Vec2 {
    fn from_lottie(v: &JsonValue) -> Result<Self, String> {
        let xs = numbers(v).ok_or_else(|| format!("expected a vector, got {v}"))?;
        match xs.as_slice() {
            [x] => Ok(Vec2::new(*x, *x)),
            [x, y, ..] => Ok(Vec2::new(*x, *y)),
            [] => Err("expected a vector, got an empty array".to_owned()),
        }
    }
}

impl FromLottie for Rgba {
    fn from_lottie(v: &JsonValue) -> Result<Self, String> {
        let xs = numbers(v).ok_or_else(|| format!("expected a color, got {v}"))?;
        if xs.len() < 3 {
            return Err(format!("expected at least 3 color channels, got {}", xs.len()));
        }
        let a = xs.get(3).copied().unwrap_or(1.0);
        // Some exporters write 0..255 channels.
        let scale = if xs.iter().take(4).any(|c| *c > 1.0) {
            1.0 / 255.0
        } else {
            1.0
        };
        let a_scale = if a > 1.0 { 1.0 / 255.0 } else { 1.0 };
        Ok(Rgba {
            r: (xs[0] * scale).clamp(0.0, 1.0),
            g: (xs[1] * scale).clamp(0.0, 1.0),
            b: (xs[2] * scale).clamp(0.0, 1.0),
            a: (a * a_scale).clamp(0.0, 1.0),
        })
    }
}

impl FromLottie for BezierPath {
    fn from_lottie(v: &JsonValue) -> Result<Self, String> {
        let obj = match v {
            JsonValue::Array(items) => items
                .first()
                .ok_or_else(|| "expected a path, got an empty array".to_owned())?,
            other => other,
        };
        let JsonValue::Object(map) = obj else {
            return Err(format!("expected a path object, got {obj}"));
        };

        let points = |key: &str| -> Result<Vec<[f64; 2]>, String> {
            let Some(JsonValue::Array(items)) = map.get(key) else {
                return Ok(Vec::new());
            };
            items
                .iter()
                .map(|p| match numbers(p).as_deref() {
                    Some([x, y, ..]) => Ok([*x, *y]),
                    _ => Err(format!("path \"{key}\" entries must be [x, y] pairs")),
                })
                .collect()
        };

        let vertices = points("v")?;
        let mut in_tangents = points("i")?;
        let mut out_tangents = points("o")?;
        // Missing tangent lists mean straight segments.
        if in_tangents.is_empty() {
            in_tangents = vec![[0.0, 0.0]; vertices.len()];
        }
        if out_tangents.is_empty() {
            out_tangents = vec![[0.0, 0.0]; vertices.len()];
        }
        if in_tangents.len() != vertices.len() || out_tangents.len() != vertices.len() {
            return Err("path tangent lists must match the vertex list".to_owned());
        }
        let closed = match map.get("c") {
            Some(JsonValue::Bool(b)) => *b,
            Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
            _ => false,
        };

        Ok(BezierPath {
            vertices: vertices.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
            in_tangents: in_tangents.iter().map(|[x, y]| Vec2::new(*x, *y)).collect(),
            out_tangents: out_tangents.iter().map(|[x, y]| Vec2::new(*x, *y)).collect(),
            closed,
        })
    }
}

fn parse_ease(kf: &serde_json::Map<String, JsonValue>) -> Option<EaseCurve> {
    let o = kf.get("o")?;
    let i = kf.get("i")?;
    Some(EaseCurve {
        out_x: number(o.get("x")?)?,
        out_y: number(o.get("y")?)?,
        in_x: number(i.get("x")?)?,
        in_y: number(i.get("y")?)?,
    })
}

fn parse_flag(v: Option<&JsonValue>) -> bool {
    match v {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        _ => false,
    }
}

fn is_keyframe_list(k: &JsonValue) -> bool {
    match k {
        JsonValue::Array(items) => items
            .first()
            .is_some_and(|first| first.as_object().is_some_and(|o| o.contains_key("t"))),
        _ => false,
    }
}

fn parse_keyframes<T: FromLottie + Clone>(items: &[JsonValue]) -> Result<Vec<Keyframe<T>>, String> {
    let mut out: Vec<Keyframe<T>> = Vec::with_capacity(items.len());
    // Legacy exports store the segment end value ("e") on the previous keyframe.
    let mut carried_end: Option<T> = None;

    for (idx, item) in items.iter().enumerate() {
        let JsonValue::Object(kf) = item else {
            return Err(format!("keyframe {idx} must be an object"));
        };
        let time = kf
            .get("t")
            .and_then(number)
            .ok_or_else(|| format!("keyframe {idx} is missing \"t\""))?;

        let value = match kf.get("s") {
            Some(s) => T::from_lottie(s)?,
            None => match carried_end.take().or_else(|| out.last().map(|k| k.value.clone())) {
                Some(v) => v,
                None => return Err(format!("keyframe {idx} has no value")),
            },
        };
        carried_end = match kf.get("e") {
            Some(e) => Some(T::from_lottie(e)?),
            None => None,
        };

        if let Some(prev) = out.last()
            && time < prev.time
        {
            return Err(format!("keyframe {idx} is not sorted by time"));
        }

        out.push(Keyframe {
            time,
            value,
            hold: parse_flag(kf.get("h")),
            ease: parse_ease(kf),
        });
    }

    if out.is_empty() {
        return Err("animated property has no keyframes".to_owned());
    }
    Ok(out)
}

/// Parse a Lottie animated property.
pub fn animated_from_json<T: FromLottie + Clone>(raw: &JsonValue) -> Result<AnimatedValue<T>, String> {
    let (animated_flag, k) = match raw {
        JsonValue::Object(map) if map.contains_key("k") => {
            (map.get("a").map(|a| parse_flag(Some(a))), &map["k"])
        }
        // Bare value shorthand.
        other => (None, other),
    };

    let keyframed = animated_flag.unwrap_or(false) || is_keyframe_list(k);
    if keyframed {
        let JsonValue::Array(items) = k else {
            return Err("animated property \"k\" must be a keyframe array".to_owned());
        };
        let keys = parse_keyframes::<T>(items)?;
        if keys.len() == 1 {
            return Ok(AnimatedValue::Static(keys[0].value.clone()));
        }
        return Ok(AnimatedValue::Keyframed(keys));
    }
    Ok(AnimatedValue::Static(T::from_lottie(k)?))
}

impl<'de, T> Deserialize<'de> for AnimatedValue<T>
where
    T: FromLottie + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        animated_from_json(&raw).map_err(serde::de::Error::custom)
    }
}

/// Deserialize a Lottie boolean that may be written as `true`/`false` or `0`/`1`.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(parse_flag(raw.as_ref()))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/value.rs"]
mod tests;
