//! Per-frame traversal of an [`AnimIr`] into a render command stream.
//!
//! Emission never fails. Anything that cannot be drawn (an unsamplable path, a dangling parent,
//! a missing composition) is skipped and reported as a [`RenderIssue`] next to the best-effort
//! stream, so a single bad frame never halts playback.

use crate::foundation::core::Affine;
use crate::geometry::affine::AffineExt;
use crate::geometry::path::BezierPath;
use crate::ir::model::{
    AnimIr, CompId, CompositionIr, LayerContent, LayerId, LayerIr, MaskIr, ShapeElementIr,
    ShapeGroupIr,
};
use crate::paths::cache::{PathCacheOpts, PathSamplingCache};
use crate::paths::registry::{PathId, PathRegistry};
use crate::render::command::RenderCommand;
use crate::render::space::{ContainerSpace, container_space, layer_world};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Set of disabled toggle ids. Every toggle is enabled unless disabled here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToggleSet {
    disabled: BTreeSet<String>,
}

impl ToggleSet {
    /// All toggles enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a toggle id.
    pub fn disable(&mut self, id: impl Into<String>) {
        self.disabled.insert(id.into());
    }

    /// Re-enable a toggle id.
    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// `true` unless `id` was disabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.contains(id)
    }
}

/// Kind of a non-fatal render anomaly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderIssueKind {
    /// A mask outline could not be sampled; the mask was skipped.
    MaskPathUnavailable,
    /// A mask outline encloses no area at this frame; the mask was skipped.
    DegenerateMask,
    /// A shape outline could not be sampled; its draws were skipped.
    ShapePathUnavailable,
    /// A parent id is unknown or cyclic; the chain was cut there.
    UnknownParent,
    /// A referenced composition is missing or re-entered.
    MissingComposition,
    /// A matte source layer is missing; the consumer was drawn without its matte.
    MissingMatteSource,
}

/// Non-fatal anomaly found while emitting one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderIssue {
    /// What went wrong.
    pub kind: RenderIssueKind,
    /// Composition of the affected layer.
    pub comp_id: CompId,
    /// Affected layer.
    pub layer_id: Option<LayerId>,
    /// Human readable details.
    pub message: String,
}

/// Result of emitting one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOutput {
    /// Command stream.
    pub commands: Vec<RenderCommand>,
    /// Non-fatal anomalies.
    pub issues: Vec<RenderIssue>,
}

/// Emit the command stream of `ir` at `frame`, using a fresh path sampling cache.
pub fn render_commands(
    ir: &AnimIr,
    registry: &PathRegistry,
    frame: f64,
    user_transform: Affine,
    toggles: &ToggleSet,
) -> RenderOutput {
    let mut cache = PathSamplingCache::new(PathCacheOpts::default());
    render_commands_with_cache(ir, registry, &mut cache, frame, user_transform, toggles)
}

/// Emit the command stream of `ir` at `frame`, sampling paths through `cache`.
///
/// Starts a new cache frame; the cross-frame LRU carries over between calls.
#[tracing::instrument(skip(ir, registry, cache, toggles), fields(anim_ref = %ir.meta.anim_ref))]
pub fn render_commands_with_cache(
    ir: &AnimIr,
    registry: &PathRegistry,
    cache: &mut PathSamplingCache,
    frame: f64,
    user_transform: Affine,
    toggles: &ToggleSet,
) -> RenderOutput {
    cache.begin_frame();
    let mut em = Emitter {
        ir,
        registry,
        cache,
        toggles,
        comp_stack: Vec::new(),
        out: RenderOutput::default(),
    };

    em.push(RenderCommand::PushTransform(user_transform));
    em.push(RenderCommand::PushClipRect(ir.canvas().rect()));
    match ir.root() {
        Some(root) => em.emit_comp(root, &ContainerSpace::root(frame)),
        None => em.issue(
            RenderIssueKind::MissingComposition,
            &ir.root_comp_id,
            None,
            "root composition missing".to_owned(),
        ),
    }
    em.push(RenderCommand::PopClipRect);
    em.push(RenderCommand::PopTransform);

    if !em.out.issues.is_empty() {
        tracing::warn!(issues = em.out.issues.len(), "frame emitted with issues");
    }
    em.out
}

/// Whether `layer` draws at composition-local `frame`.
pub(crate) fn is_layer_visible(
    layer: &LayerIr,
    frame: f64,
    toggles: &ToggleSet,
    as_matte_source: bool,
) -> bool {
    if !layer.window.contains(frame) {
        return false;
    }
    if layer.hidden && !as_matte_source {
        return false;
    }
    layer
        .toggle_id
        .as_deref()
        .is_none_or(|id| toggles.is_enabled(id))
}

struct Emitter<'a> {
    ir: &'a AnimIr,
    registry: &'a PathRegistry,
    cache: &'a mut PathSamplingCache,
    toggles: &'a ToggleSet,
    comp_stack: Vec<CompId>,
    out: RenderOutput,
}

impl Emitter<'_> {
    fn push(&mut self, cmd: RenderCommand) {
        self.out.commands.push(cmd);
    }

    fn issue(&mut self, kind: RenderIssueKind, comp_id: &str, layer_id: Option<LayerId>, message: String) {
        tracing::debug!(?kind, comp_id, ?layer_id, %message, "render issue");
        self.out.issues.push(RenderIssue {
            kind,
            comp_id: comp_id.to_owned(),
            layer_id,
            message,
        });
    }

    fn sample_path(&mut self, path_id: PathId, frame: f64) -> Option<Arc<BezierPath>> {
        let registry = self.registry;
        self.cache
            .sample(registry.generation_id(), path_id, frame, || {
                registry.sample(path_id, frame)
            })
    }

    fn emit_comp(&mut self, comp: &CompositionIr, space: &ContainerSpace) {
        self.comp_stack.push(comp.id.clone());
        // Painter order: the last layer is the bottom-most.
        for layer in comp.layers.iter().rev() {
            if layer.is_matte_source {
                continue;
            }
            self.emit_with_matte(comp, layer, space, false, comp.layers.len());
        }
        self.comp_stack.pop();
    }

    fn emit_with_matte(
        &mut self,
        comp: &CompositionIr,
        layer: &LayerIr,
        space: &ContainerSpace,
        as_source: bool,
        budget: usize,
    ) {
        let Some(link) = layer.matte else {
            self.emit_layer(comp, layer, space, as_source);
            return;
        };
        if !is_layer_visible(layer, space.local_frame, self.toggles, as_source) {
            return;
        }
        let source = comp.layer(link.source);
        let (Some(source), Some(budget)) = (source, budget.checked_sub(1)) else {
            self.issue(
                RenderIssueKind::MissingMatteSource,
                &comp.id,
                Some(layer.id),
                format!("matte source {} of layer \"{}\" not drawable", link.source, layer.name),
            );
            self.emit_layer(comp, layer, space, as_source);
            return;
        };

        self.push(RenderCommand::BeginMatte { mode: link.mode });
        self.push(RenderCommand::BeginGroup {
            name: "matteSource".to_owned(),
        });
        self.emit_with_matte(comp, source, space, true, budget);
        self.push(RenderCommand::EndGroup);
        self.push(RenderCommand::BeginGroup {
            name: "matteConsumer".to_owned(),
        });
        self.emit_layer(comp, layer, space, as_source);
        self.push(RenderCommand::EndGroup);
        self.push(RenderCommand::EndMatte);
    }

    fn emit_layer(&mut self, comp: &CompositionIr, layer: &LayerIr, space: &ContainerSpace, as_source: bool) {
        let frame = space.local_frame;
        if !is_layer_visible(layer, frame, self.toggles, as_source) {
            return;
        }

        let lw = layer_world(comp, layer, frame);
        if let Some(pid) = lw.broken_parent {
            self.issue(
                RenderIssueKind::UnknownParent,
                &comp.id,
                Some(layer.id),
                format!("parent {pid} of layer \"{}\" is unknown or cyclic", layer.name),
            );
        }
        let world = lw.transform;
        let Some(world_inv) = world.checked_inverse() else {
            return;
        };
        let opacity = space.opacity * layer.transform.opacity(frame);

        let masks: Vec<&MaskIr> = layer
            .masks
            .iter()
            .filter(|m| {
                let (kind, detail) = match self.sample_path(m.path_id, frame) {
                    Some(path) if path.encloses_area() => return true,
                    Some(_) => (RenderIssueKind::DegenerateMask, "encloses no area"),
                    None => (RenderIssueKind::MaskPathUnavailable, "has no outline"),
                };
                self.issue(
                    kind,
                    &comp.id,
                    Some(layer.id),
                    format!("mask \"{}\" of layer \"{}\" {detail} at frame {frame}", m.name, layer.name),
                );
                false
            })
            .collect();

        self.push(RenderCommand::BeginGroup {
            name: format!("layer:{}", layer.name),
        });
        if !masks.is_empty() {
            self.push(RenderCommand::PushTransform(world));
            for m in masks.iter().rev() {
                self.push(RenderCommand::BeginMask {
                    mode: m.mode,
                    inverted: m.inverted,
                    path_id: m.path_id,
                    opacity: m.opacity.sample(frame).clamp(0.0, 1.0),
                    frame,
                });
            }
            self.push(RenderCommand::PushTransform(world_inv));
        }

        self.emit_content(comp, layer, world, space, opacity);

        if !masks.is_empty() {
            self.push(RenderCommand::PopTransform);
            for _ in &masks {
                self.push(RenderCommand::EndMask);
            }
            self.push(RenderCommand::PopTransform);
        }
        self.push(RenderCommand::EndGroup);
    }

    fn emit_content(
        &mut self,
        comp: &CompositionIr,
        layer: &LayerIr,
        world: Affine,
        space: &ContainerSpace,
        opacity: f64,
    ) {
        let frame = space.local_frame;
        match &layer.content {
            LayerContent::Null => {}
            LayerContent::Image {
                asset_id,
                width,
                height,
            } => {
                self.push(RenderCommand::PushTransform(world));
                self.push(RenderCommand::DrawImage {
                    asset_id: asset_id.clone(),
                    width: *width,
                    height: *height,
                    opacity,
                });
                self.push(RenderCommand::PopTransform);
            }
            LayerContent::Shapes(root) => {
                self.push(RenderCommand::PushTransform(world));
                self.emit_group(comp, layer, root, frame, opacity);
                self.push(RenderCommand::PopTransform);
            }
            LayerContent::Precomp { comp_id } => {
                let ir = self.ir;
                let child = ir.comp(comp_id);
                let reentered = self.comp_stack.iter().any(|c| c == comp_id);
                let Some(child) = child.filter(|_| !reentered) else {
                    self.issue(
                        RenderIssueKind::MissingComposition,
                        &comp.id,
                        Some(layer.id),
                        format!("composition \"{comp_id}\" is missing or re-entered"),
                    );
                    return;
                };
                let inner = container_space(space, comp, layer);
                self.push(RenderCommand::PushTransform(world));
                self.push(RenderCommand::PushClipRect(child.size.rect()));
                self.emit_comp(child, &inner);
                self.push(RenderCommand::PopClipRect);
                self.push(RenderCommand::PopTransform);
            }
        }
    }

    fn emit_group(
        &mut self,
        comp: &CompositionIr,
        layer: &LayerIr,
        group: &ShapeGroupIr,
        frame: f64,
        opacity: f64,
    ) {
        let local = group.transform.matrix(frame);
        if local.is_singular() {
            return;
        }
        let opacity = opacity * group.transform.opacity(frame);
        let pushed = local != Affine::IDENTITY;
        if pushed {
            self.push(RenderCommand::PushTransform(local));
        }

        // First listed element is on top.
        for element in group.elements.iter().rev() {
            match element {
                ShapeElementIr::Group(g) => self.emit_group(comp, layer, g, frame, opacity),
                ShapeElementIr::Path(p) => {
                    if self.sample_path(p.path_id, frame).is_none() {
                        self.issue(
                            RenderIssueKind::ShapePathUnavailable,
                            &comp.id,
                            Some(layer.id),
                            format!(
                                "path {} of layer \"{}\" has no outline at frame {frame}",
                                p.path_id.0, layer.name
                            ),
                        );
                        continue;
                    }
                    if let Some(fill) = &p.fill {
                        self.push(RenderCommand::DrawShape {
                            path_id: p.path_id,
                            frame,
                            color: fill.color.sample(frame),
                            opacity: opacity * fill.opacity.sample(frame).clamp(0.0, 1.0),
                        });
                    }
                    if let Some(stroke) = &p.stroke {
                        self.push(RenderCommand::DrawStroke {
                            path_id: p.path_id,
                            frame,
                            color: stroke.color.sample(frame),
                            width: stroke.width.sample(frame).max(0.0),
                            opacity: opacity * stroke.opacity.sample(frame).clamp(0.0, 1.0),
                        });
                    }
                }
            }
        }

        if pushed {
            self.push(RenderCommand::PopTransform);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/emitter.rs"]
mod tests;
