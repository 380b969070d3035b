use crate::animation::anim::AnimatedValue;
use crate::foundation::core::Vec2;
use crate::ir::model::{PositionTrack, TransformTrack};
use crate::scene::model::{PositionDef, TransformDef};

/// Lottie percentages (`100` = 1.0) to factors.
pub(crate) fn percent(v: &AnimatedValue<f64>) -> AnimatedValue<f64> {
    v.map(|x| x / 100.0)
}

pub(crate) fn opacity_or_opaque(v: Option<&AnimatedValue<f64>>) -> AnimatedValue<f64> {
    v.map_or(AnimatedValue::Static(1.0), percent)
}

pub(crate) fn transform_track(def: &TransformDef) -> TransformTrack {
    let defaults = TransformTrack::default();
    TransformTrack {
        anchor: def.a.clone().unwrap_or(defaults.anchor),
        position: match &def.p {
            Some(PositionDef::Combined(v)) => PositionTrack::Combined(v.clone()),
            Some(PositionDef::Split { x, y }) => PositionTrack::Split {
                x: x.clone(),
                y: y.clone(),
            },
            None => defaults.position,
        },
        scale: def
            .s
            .as_ref()
            .map_or(defaults.scale, |s| s.map(|v| Vec2::new(v.x / 100.0, v.y / 100.0))),
        rotation: def.r.clone().unwrap_or(defaults.rotation),
        opacity: opacity_or_opaque(def.o.as_ref()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/transform.rs"]
mod tests;
