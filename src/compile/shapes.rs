//! Shape tree compilation.
//!
//! Lottie shape lists mix geometry (`sh`, `rc`, `el`), paint (`fl`, `st`) and a group transform
//! (`tr`) in one array. Here each group becomes a [`ShapeGroupIr`] whose paths carry their
//! effective paint, inherited from the closest enclosing group that declares one.

use crate::animation::anim::{AnimatedValue, Keyframe};
use crate::compile::transform::{opacity_or_opaque, transform_track};
use crate::foundation::core::{Point, Rgba, Vec2};
use crate::foundation::error::{AnimirError, AnimirResult};
use crate::foundation::quantize::KEYFRAME_TIME_EPSILON;
use crate::geometry::path::BezierPath;
use crate::ir::model::{FillIr, ShapeElementIr, ShapeGroupIr, ShapePathIr, StrokeIr, TransformTrack};
use crate::paths::registry::{PathId, PathRegistry};
use crate::scene::model::{FillShapeDef, ShapeDef, StrokeShapeDef};

#[derive(Clone, Copy)]
struct Paint<'a> {
    fill: Option<&'a FillIr>,
    stroke: Option<&'a StrokeIr>,
}

/// Compile a shape layer's item list into its implicit root group.
pub(crate) fn compile_shape_list(
    items: &[ShapeDef],
    registry: &mut PathRegistry,
    context: &str,
) -> AnimirResult<ShapeGroupIr> {
    compile_group(
        String::new(),
        items,
        Paint {
            fill: None,
            stroke: None,
        },
        registry,
        context,
    )
}

/// Shape group holding one filled rectangle covering `[0, w] x [0, h]` (Lottie solid layers).
pub(crate) fn solid_rect(
    width: f64,
    height: f64,
    color: Rgba,
    registry: &mut PathRegistry,
    context: &str,
) -> AnimirResult<ShapeGroupIr> {
    let outline = BezierPath::rect(
        Point::new(width * 0.5, height * 0.5),
        Vec2::new(width, height),
    );
    let path_id = register(registry, &AnimatedValue::Static(outline), context)?;
    Ok(ShapeGroupIr {
        name: "solid".to_owned(),
        transform: TransformTrack::default(),
        elements: vec![ShapeElementIr::Path(ShapePathIr {
            path_id,
            fill: Some(FillIr {
                color: AnimatedValue::Static(color),
                opacity: AnimatedValue::Static(1.0),
            }),
            stroke: None,
        })],
    })
}

fn compile_group(
    name: String,
    items: &[ShapeDef],
    inherited: Paint<'_>,
    registry: &mut PathRegistry,
    context: &str,
) -> AnimirResult<ShapeGroupIr> {
    let own_fill = items.iter().find_map(|i| match i {
        ShapeDef::Fill(f) if !f.hd => Some(fill_ir(f)),
        _ => None,
    });
    let own_stroke = items.iter().find_map(|i| match i {
        ShapeDef::Stroke(s) if !s.hd => Some(stroke_ir(s)),
        _ => None,
    });
    let transform = items
        .iter()
        .find_map(|i| match i {
            ShapeDef::Transform(t) => Some(transform_track(t)),
            _ => None,
        })
        .unwrap_or_default();

    let paint = Paint {
        fill: own_fill.as_ref().or(inherited.fill),
        stroke: own_stroke.as_ref().or(inherited.stroke),
    };

    let mut elements = Vec::new();
    for item in items {
        let outline = match item {
            ShapeDef::Group(g) if !g.hd => {
                let group = compile_group(g.nm.clone(), &g.it, paint, registry, context)?;
                elements.push(ShapeElementIr::Group(group));
                continue;
            }
            ShapeDef::Path(p) if !p.hd => p.ks.clone(),
            ShapeDef::Rect(r) if !r.hd => parametric(&r.p, &r.s, BezierPath::rect),
            ShapeDef::Ellipse(e) if !e.hd => parametric(&e.p, &e.s, BezierPath::ellipse),
            _ => continue,
        };
        if paint.fill.is_none() && paint.stroke.is_none() {
            continue;
        }
        let path_id = register(registry, &outline, context)?;
        elements.push(ShapeElementIr::Path(ShapePathIr {
            path_id,
            fill: paint.fill.cloned(),
            stroke: paint.stroke.cloned(),
        }));
    }

    Ok(ShapeGroupIr {
        name,
        transform,
        elements,
    })
}

fn register(
    registry: &mut PathRegistry,
    outline: &AnimatedValue<BezierPath>,
    context: &str,
) -> AnimirResult<PathId> {
    registry
        .register(outline)
        .ok_or_else(|| AnimirError::topology(context))
}

fn fill_ir(f: &FillShapeDef) -> FillIr {
    FillIr {
        color: f.c.clone(),
        opacity: opacity_or_opaque(f.o.as_ref()),
    }
}

fn stroke_ir(s: &StrokeShapeDef) -> StrokeIr {
    StrokeIr {
        color: s.c.clone(),
        opacity: opacity_or_opaque(s.o.as_ref()),
        width: s.w.clone().unwrap_or(AnimatedValue::Static(1.0)),
    }
}

/// Outline of a rectangle or ellipse, keyframed at the union of its properties' key times.
fn parametric(
    position: &AnimatedValue<Vec2>,
    size: &AnimatedValue<Vec2>,
    build: fn(Point, Vec2) -> BezierPath,
) -> AnimatedValue<BezierPath> {
    let at = |frame: f64| build(position.sample(frame).to_point(), size.sample(frame));

    let mut times = position.key_times();
    times.extend(size.key_times());
    times.sort_by(f64::total_cmp);
    times.dedup_by(|a, b| (*a - *b).abs() < KEYFRAME_TIME_EPSILON);

    if times.len() < 2 {
        return AnimatedValue::Static(at(times.first().copied().unwrap_or(0.0)));
    }
    AnimatedValue::Keyframed(
        times
            .into_iter()
            .map(|time| Keyframe {
                time,
                value: at(time),
                hold: false,
                ease: None,
            })
            .collect(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/compile/shapes.rs"]
mod tests;
