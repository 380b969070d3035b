//! Coordinate spaces: layer world transforms and precomposition container spaces.
//!
//! The emitter and the direct-query APIs both derive container spaces through
//! [`container_space`], so a query for a layer inside nested precompositions reproduces exactly
//! the transform stack the emitter pushes for it.

use crate::foundation::core::Affine;
use crate::ir::model::{AnimIr, CompositionIr, LayerContent, LayerId, LayerIr, ROOT_COMP_ID};
use smallvec::SmallVec;

/// World transform of a layer within its composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerWorld {
    /// Parent chain composed with the layer's own transform.
    pub transform: Affine,
    /// Parent id that could not be followed (unknown or cyclic); the chain stops there.
    pub broken_parent: Option<LayerId>,
}

/// Parent chain (never opacity) composed with the layer's own transform at `frame`.
pub fn layer_world(comp: &CompositionIr, layer: &LayerIr, frame: f64) -> LayerWorld {
    let mut transform = layer.transform.matrix(frame);
    let mut visited: SmallVec<[LayerId; 8]> = SmallVec::new();
    visited.push(layer.id);

    let mut next = layer.parent;
    while let Some(pid) = next {
        let parent = if visited.contains(&pid) {
            None
        } else {
            comp.layer(pid)
        };
        let Some(parent) = parent else {
            return LayerWorld {
                transform,
                broken_parent: Some(pid),
            };
        };
        transform = parent.transform.matrix(frame) * transform;
        visited.push(pid);
        next = parent.parent;
    }

    LayerWorld {
        transform,
        broken_parent: None,
    }
}

/// Space of a composition's content relative to the root composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerSpace {
    /// Maps composition coordinates to root coordinates (user transform excluded).
    pub transform: Affine,
    /// Composition-local frame.
    pub local_frame: f64,
    /// Opacity inherited from enclosing containers.
    pub opacity: f64,
}

impl ContainerSpace {
    /// Space of the root composition at `frame`.
    pub fn root(frame: f64) -> Self {
        Self {
            transform: Affine::IDENTITY,
            local_frame: frame,
            opacity: 1.0,
        }
    }
}

/// Space of the composition referenced by `container`, a precomposition layer of `comp`.
///
/// Child time is the container-local frame minus the container's start time; container opacity
/// multiplies onto everything inside.
pub fn container_space(outer: &ContainerSpace, comp: &CompositionIr, container: &LayerIr) -> ContainerSpace {
    let frame = outer.local_frame;
    let world = layer_world(comp, container, frame).transform;
    ContainerSpace {
        transform: outer.transform * world,
        local_frame: frame - container.start_time,
        opacity: outer.opacity * container.transform.opacity(frame),
    }
}

/// Space of composition `comp_id` at root frame `frame`, resolved without a traversal.
///
/// The container is the first layer referencing `comp_id`, searching the root composition first
/// and then compositions in id order. Identity for the root composition; `None` when `comp_id`
/// is unknown or not referenced by any reachable container.
pub fn precomp_chain(ir: &AnimIr, comp_id: &str, frame: f64) -> Option<ContainerSpace> {
    chain_inner(ir, comp_id, frame, ir.comps.len())
}

fn chain_inner(ir: &AnimIr, comp_id: &str, frame: f64, budget: usize) -> Option<ContainerSpace> {
    if comp_id == ir.root_comp_id || comp_id == ROOT_COMP_ID {
        return Some(ContainerSpace::root(frame));
    }
    ir.comp(comp_id)?;
    let budget = budget.checked_sub(1)?;
    let (owner, container) = find_container(ir, comp_id)?;
    let outer = chain_inner(ir, &owner.id, frame, budget)?;
    Some(container_space(&outer, owner, container))
}

fn find_container<'a>(ir: &'a AnimIr, comp_id: &str) -> Option<(&'a CompositionIr, &'a LayerIr)> {
    let root = ir.root().into_iter();
    let others = ir
        .comps
        .values()
        .filter(|c| c.id != ir.root_comp_id);
    root.chain(others).find_map(|c| {
        c.layers
            .iter()
            .find(|l| matches!(&l.content, LayerContent::Precomp { comp_id: id } if id == comp_id))
            .map(|l| (c, l))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/space.rs"]
mod tests;
