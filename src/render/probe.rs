//! Reference evaluator: what a command stream paints at a single point.
//!
//! Interprets the stream the way a renderer would (transform and clip stacks, mask folds, track
//! mattes, source-over compositing) but only at one sample point, which is enough to check the
//! semantics of emitted streams without a rasterizer.

use crate::foundation::core::{Affine, Point, Rgba};
use crate::geometry::affine::AffineExt;
use crate::geometry::path::BezierPath;
use crate::ir::model::MatteMode;
use crate::paths::cache::PathSamplingCache;
use crate::paths::registry::{PathId, PathRegistry};
use crate::render::command::RenderCommand;
use crate::render::extract::{
    MaskOp, combine_mask_coverage, extract_mask_scope, extract_matte_scope,
};
use kurbo::{Line, ParamCurveNearest};
use smallvec::{SmallVec, smallvec};
use std::ops::Range;
use std::sync::Arc;

/// Premultiplied color painted by `commands` at `point` (root coordinates).
///
/// Images are treated as opaque white rectangles; unbalanced or unsamplable parts contribute
/// nothing.
pub fn probe_color(
    commands: &[RenderCommand],
    registry: &PathRegistry,
    cache: &mut PathSamplingCache,
    point: Point,
) -> Rgba {
    let mut probe = Probe {
        commands,
        registry,
        cache,
        point,
    };
    probe.eval(0..commands.len(), Affine::IDENTITY, false)
}

/// Coverage (alpha) painted by `commands` at `point`.
pub fn probe_alpha(
    commands: &[RenderCommand],
    registry: &PathRegistry,
    cache: &mut PathSamplingCache,
    point: Point,
) -> f64 {
    probe_color(commands, registry, cache, point).a
}

struct Probe<'a> {
    commands: &'a [RenderCommand],
    registry: &'a PathRegistry,
    cache: &'a mut PathSamplingCache,
    point: Point,
}

impl Probe<'_> {
    fn eval(&mut self, range: Range<usize>, base: Affine, clipped_out: bool) -> Rgba {
        let mut transforms: SmallVec<[Affine; 8]> = smallvec![base];
        let mut clips: SmallVec<[bool; 4]> = SmallVec::new();
        let mut acc = Rgba::transparent();
        let commands = self.commands;

        let mut i = range.start;
        while i < range.end {
            let current = transforms.last().copied().unwrap_or(base);
            let visible = !clipped_out && clips.iter().all(|inside| *inside);
            match &commands[i] {
                RenderCommand::PushTransform(m) => transforms.push(current * *m),
                RenderCommand::PopTransform => {
                    if transforms.len() > 1 {
                        transforms.pop();
                    }
                }
                RenderCommand::PushClipRect(r) => {
                    clips.push(self.local(current).is_some_and(|p| r.contains(p)));
                }
                RenderCommand::PopClipRect => {
                    clips.pop();
                }
                RenderCommand::BeginMask { .. } => {
                    if let Some(scope) = extract_mask_scope(commands, i) {
                        let coverages: SmallVec<[f64; 4]> = scope
                            .ops_in_ae_order
                            .iter()
                            .map(|op| self.mask_coverage(op, current))
                            .collect();
                        let inner = self.eval(scope.inner.clone(), current, !visible);
                        let coverage = combine_mask_coverage(&scope.ops_in_ae_order, &coverages);
                        acc = over(acc, scaled(inner, coverage));
                        i = scope.end;
                        continue;
                    }
                }
                RenderCommand::BeginMatte { .. } => {
                    if let Some(scope) = extract_matte_scope(commands, i) {
                        let source = self.eval(scope.source.clone(), current, !visible);
                        let consumer = self.eval(scope.consumer.clone(), current, !visible);
                        acc = over(acc, scaled(consumer, matte_factor(scope.mode, source)));
                        i = scope.end;
                        continue;
                    }
                }
                RenderCommand::DrawShape {
                    path_id,
                    frame,
                    color,
                    opacity,
                } if visible => {
                    let hit = self
                        .local_path(*path_id, *frame, current)
                        .is_some_and(|(path, p)| path.contains(p));
                    if hit {
                        acc = over(acc, premultiplied(*color, *opacity));
                    }
                }
                RenderCommand::DrawStroke {
                    path_id,
                    frame,
                    color,
                    width,
                    opacity,
                } if visible => {
                    let hit = self
                        .local_path(*path_id, *frame, current)
                        .is_some_and(|(path, p)| on_stroke(&path, p, *width));
                    if hit {
                        acc = over(acc, premultiplied(*color, *opacity));
                    }
                }
                RenderCommand::DrawImage {
                    width,
                    height,
                    opacity,
                    ..
                } if visible => {
                    let hit = self.local(current).is_some_and(|p| {
                        (0.0..*width).contains(&p.x) && (0.0..*height).contains(&p.y)
                    });
                    if hit {
                        acc = over(acc, premultiplied(Rgba::WHITE, *opacity));
                    }
                }
                _ => {}
            }
            i += 1;
        }
        acc
    }

    fn local(&self, m: Affine) -> Option<Point> {
        m.checked_inverse().map(|inv| inv * self.point)
    }

    fn sample(&mut self, path_id: PathId, frame: f64) -> Option<Arc<BezierPath>> {
        let registry = self.registry;
        self.cache
            .sample(registry.generation_id(), path_id, frame, || {
                registry.sample(path_id, frame)
            })
    }

    fn local_path(&mut self, path_id: PathId, frame: f64, m: Affine) -> Option<(Arc<BezierPath>, Point)> {
        let p = self.local(m)?;
        Some((self.sample(path_id, frame)?, p))
    }

    fn mask_coverage(&mut self, op: &MaskOp, m: Affine) -> f64 {
        let inside = self
            .local_path(op.path_id, op.frame, m)
            .is_some_and(|(path, p)| path.contains(p));
        if inside { 1.0 } else { 0.0 }
    }
}

fn on_stroke(path: &BezierPath, p: Point, width: f64) -> bool {
    let pts = path.flattened();
    let half = width / 2.0;
    match pts.as_slice() {
        [] => return false,
        [only] => return only.distance(p) <= half,
        _ => {}
    }
    let closing = path.closed.then(|| (pts[pts.len() - 1], pts[0]));
    pts.windows(2)
        .map(|w| (w[0], w[1]))
        .chain(closing)
        .any(|(a, b)| Line::new(a, b).nearest(p, 1e-9).distance_sq <= half * half)
}

fn premultiplied(c: Rgba, opacity: f64) -> Rgba {
    let a = (c.a * opacity).clamp(0.0, 1.0);
    Rgba {
        r: c.r * a,
        g: c.g * a,
        b: c.b * a,
        a,
    }
}

fn scaled(c: Rgba, k: f64) -> Rgba {
    Rgba {
        r: c.r * k,
        g: c.g * k,
        b: c.b * k,
        a: c.a * k,
    }
}

/// `src` over `dst`, both premultiplied.
fn over(dst: Rgba, src: Rgba) -> Rgba {
    let k = 1.0 - src.a;
    Rgba {
        r: src.r + dst.r * k,
        g: src.g + dst.g * k,
        b: src.b + dst.b * k,
        a: src.a + dst.a * k,
    }
}

// Luma is taken from the premultiplied source, so transparent regions count as black.
fn matte_factor(mode: MatteMode, source: Rgba) -> f64 {
    let f = match mode {
        MatteMode::Alpha | MatteMode::AlphaInverted => source.a,
        MatteMode::Luma | MatteMode::LumaInverted => source.luma(),
    };
    let f = f.clamp(0.0, 1.0);
    match mode {
        MatteMode::AlphaInverted | MatteMode::LumaInverted => 1.0 - f,
        MatteMode::Alpha | MatteMode::Luma => f,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/probe.rs"]
mod tests;
