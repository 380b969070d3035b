//! Direct queries against a compiled animation, without emitting a command stream.
//!
//! Transforms returned here are the same ones the emitter pushes: container spaces come from
//! [`precomp_chain`], which shares its per-container step with the emitter traversal.

use crate::foundation::core::{Affine, Point, Rect};
use crate::geometry::affine::AffineExt;
use crate::ir::model::{
    AnimIr, CompId, CompositionIr, LayerContent, LayerId, LayerIr, ShapeElementIr, ShapeGroupIr,
};
use crate::paths::registry::{PathId, PathRegistry};
use crate::render::emitter::{ToggleSet, is_layer_visible};
use crate::render::space::{ContainerSpace, container_space, layer_world, precomp_chain};

/// Topmost layer under a point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitResult {
    /// Composition owning the layer.
    pub comp_id: CompId,
    /// Layer id.
    pub layer_id: LayerId,
}

/// Root-space transform of a layer at root frame `frame`: `user * container chain * layer world`.
///
/// `None` when the composition or layer is unknown, or the composition is not reachable from the
/// root.
pub fn layer_world_transform(
    ir: &AnimIr,
    comp_id: &str,
    layer_id: LayerId,
    frame: f64,
    user_transform: Affine,
) -> Option<Affine> {
    let (comp, layer, space) = locate(ir, comp_id, layer_id, frame)?;
    let world = layer_world(comp, layer, space.local_frame).transform;
    Some(user_transform * space.transform * world)
}

/// Root-space transform of a shape group, addressed by child indices from the layer's root group.
///
/// An empty `group_path` addresses the root group itself.
pub fn shape_group_world_transform(
    ir: &AnimIr,
    comp_id: &str,
    layer_id: LayerId,
    group_path: &[usize],
    frame: f64,
    user_transform: Affine,
) -> Option<Affine> {
    let (comp, layer, space) = locate(ir, comp_id, layer_id, frame)?;
    let LayerContent::Shapes(root) = &layer.content else {
        return None;
    };
    let local = space.local_frame;
    let mut m = user_transform * space.transform * layer_world(comp, layer, local).transform;
    m = m * root.transform.matrix(local);
    let mut group = root;
    for &idx in group_path {
        let ShapeElementIr::Group(g) = group.elements.get(idx)? else {
            return None;
        };
        m = m * g.transform.matrix(local);
        group = g;
    }
    Some(m)
}

/// Root-space bounding box of a layer's content at `frame`.
///
/// Shapes use the bezier bounds of every outline, images their pixel rectangle, precompositions
/// their composition rectangle. `None` for null layers, empty content or unknown layers.
pub fn layer_bounds(
    ir: &AnimIr,
    registry: &PathRegistry,
    comp_id: &str,
    layer_id: LayerId,
    frame: f64,
    user_transform: Affine,
) -> Option<Rect> {
    let (comp, layer, space) = locate(ir, comp_id, layer_id, frame)?;
    let local = space.local_frame;
    let world = user_transform * space.transform * layer_world(comp, layer, local).transform;
    match &layer.content {
        LayerContent::Null => None,
        LayerContent::Image { width, height, .. } => {
            Some(world.transform_rect_bbox(Rect::new(0.0, 0.0, *width, *height)))
        }
        LayerContent::Precomp { comp_id } => {
            let child = ir.comp(comp_id)?;
            Some(world.transform_rect_bbox(child.size.rect()))
        }
        LayerContent::Shapes(root) => {
            let mut bounds: Option<Rect> = None;
            visit_paths(root, world, local, &mut |path_id, m| {
                let Some(bb) = registry
                    .sample(path_id, local)
                    .and_then(|p| p.transformed(m).bounding_box())
                else {
                    return false;
                };
                bounds = Some(bounds.map_or(bb, |b| b.union(bb)));
                false
            });
            bounds
        }
    }
}

/// Topmost visible layer whose content contains `point` (root coordinates) at `frame`.
///
/// Descends into precompositions and reports the innermost layer hit. Masks and mattes are not
/// considered; matte source layers never hit.
#[tracing::instrument(skip(ir, registry, toggles))]
pub fn hit_test(
    ir: &AnimIr,
    registry: &PathRegistry,
    frame: f64,
    user_transform: Affine,
    toggles: &ToggleSet,
    point: Point,
) -> Option<HitResult> {
    let root = ir.root()?;
    let space = ContainerSpace {
        transform: user_transform,
        ..ContainerSpace::root(frame)
    };
    let mut stack = vec![root.id.clone()];
    hit_comp(ir, registry, root, &space, toggles, point, &mut stack)
}

fn hit_comp(
    ir: &AnimIr,
    registry: &PathRegistry,
    comp: &CompositionIr,
    space: &ContainerSpace,
    toggles: &ToggleSet,
    point: Point,
    stack: &mut Vec<CompId>,
) -> Option<HitResult> {
    let local = space.local_frame;
    // First listed layer is on top.
    for layer in &comp.layers {
        if layer.is_matte_source || !is_layer_visible(layer, local, toggles, false) {
            continue;
        }
        let world = space.transform * layer_world(comp, layer, local).transform;
        let Some(p) = world.checked_inverse().map(|inv| inv * point) else {
            continue;
        };
        let hit = match &layer.content {
            LayerContent::Null => false,
            LayerContent::Image { width, height, .. } => {
                Rect::new(0.0, 0.0, *width, *height).contains(p)
            }
            LayerContent::Shapes(root) => {
                let mut inside = false;
                visit_paths(root, world, local, &mut |path_id, m| {
                    let Some(q) = m.checked_inverse().map(|inv| inv * point) else {
                        return false;
                    };
                    inside = registry.sample(path_id, local).is_some_and(|path| path.contains(q));
                    inside
                });
                inside
            }
            LayerContent::Precomp { comp_id } => {
                let Some(child) = ir.comp(comp_id) else {
                    continue;
                };
                if stack.contains(comp_id) || !child.size.rect().contains(p) {
                    continue;
                }
                let inner = container_space(space, comp, layer);
                stack.push(comp_id.clone());
                let found = hit_comp(ir, registry, child, &inner, toggles, point, stack);
                stack.pop();
                if found.is_some() {
                    return found;
                }
                false
            }
        };
        if hit {
            return Some(HitResult {
                comp_id: comp.id.clone(),
                layer_id: layer.id,
            });
        }
    }
    None
}

/// Call `f` with every path id of `group` and its nested groups, together with the transform
/// mapping that path into the space of `base`. Stops early once `f` returns `true`.
fn visit_paths(
    group: &ShapeGroupIr,
    base: Affine,
    frame: f64,
    f: &mut dyn FnMut(PathId, Affine) -> bool,
) -> bool {
    let m = base * group.transform.matrix(frame);
    if m.is_singular() {
        return false;
    }
    for element in &group.elements {
        let stop = match element {
            ShapeElementIr::Path(p) => f(p.path_id, m),
            ShapeElementIr::Group(g) => visit_paths(g, m, frame, f),
        };
        if stop {
            return true;
        }
    }
    false
}

fn locate<'a>(
    ir: &'a AnimIr,
    comp_id: &str,
    layer_id: LayerId,
    frame: f64,
) -> Option<(&'a CompositionIr, &'a LayerIr, ContainerSpace)> {
    let comp = ir.comp(comp_id)?;
    let layer = comp.layer(layer_id)?;
    let space = precomp_chain(ir, comp_id, frame)?;
    Some((comp, layer, space))
}

#[cfg(test)]
#[path = "../tests/unit/query.rs"]
mod tests;
