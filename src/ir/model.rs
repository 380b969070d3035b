//! Compiled animation IR.
//!
//! The IR is a flattened, per-composition layer graph. Every reachable composition is present,
//! layers keep their authoring order, and all path geometry lives in the scene-shared
//! [`PathRegistry`](crate::PathRegistry); the IR only stores [`PathId`]s.
//!
//! Everything derives `PartialEq` so that two compiles of the same input can be compared
//! structurally.

use crate::animation::anim::AnimatedValue;
use crate::foundation::core::{Affine, Canvas, FrameWindow, Rgba, Vec2};
use crate::geometry::affine::layer_matrix;
use crate::paths::registry::PathId;
use std::collections::BTreeMap;

/// Reserved id of the root composition.
pub const ROOT_COMP_ID: &str = "__root__";

/// Composition id (`__root__` or a precomposition asset id).
pub type CompId = String;

/// Layer id, unique within its composition. Taken from the Lottie `ind` field.
pub type LayerId = i64;

/// Compiled animation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimIr {
    /// Scene-level metadata.
    pub meta: Meta,
    /// Resolved binding layer.
    pub binding: Binding,
    /// Image assets, keyed by namespaced asset id (`animRef|assetId`).
    pub assets: AssetIndexIr,
    /// Every reachable composition, including the root.
    pub comps: BTreeMap<CompId, CompositionIr>,
    /// Id of the root composition (always [`ROOT_COMP_ID`]).
    pub root_comp_id: CompId,
}

impl AnimIr {
    /// Root composition.
    pub fn root(&self) -> Option<&CompositionIr> {
        self.comps.get(&self.root_comp_id)
    }

    /// Composition by id.
    pub fn comp(&self, id: &str) -> Option<&CompositionIr> {
        self.comps.get(id)
    }

    /// Layer by composition and layer id.
    pub fn layer(&self, comp_id: &str, layer_id: LayerId) -> Option<&LayerIr> {
        self.comp(comp_id)?.layer(layer_id)
    }

    /// Canvas of the animation.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.meta.width,
            height: self.meta.height,
        }
    }
}

/// Scene-level metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Meta {
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Frames per second.
    pub fps: f64,
    /// First frame.
    pub in_point: f64,
    /// Exclusive end frame.
    pub out_point: f64,
    /// Animation reference used to namespace asset ids.
    pub anim_ref: String,
    /// Named markers in scene order.
    pub markers: Vec<MarkerIr>,
}

/// Named time marker.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerIr {
    /// Marker name.
    pub name: String,
    /// Start frame.
    pub frame: f64,
    /// Duration in frames.
    pub duration: f64,
}

/// Layer that carries the binding key.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// Key that was resolved.
    pub binding_key: String,
    /// Composition containing the bound layer.
    pub comp_id: CompId,
    /// Bound layer id.
    pub layer_id: LayerId,
}

/// Image assets referenced by the animation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AssetIndexIr {
    /// Namespaced asset id → resolved image.
    pub images: BTreeMap<String, ImageAssetIr>,
}

/// Resolved image asset.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAssetIr {
    /// Resolved path or URI handed to the drawing backend.
    pub path: String,
    /// Pixel width.
    pub width: f64,
    /// Pixel height.
    pub height: f64,
}

/// One composition: root or precomposition.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionIr {
    /// Composition id.
    pub id: CompId,
    /// Composition size.
    pub size: Canvas,
    /// Layers in authoring order (top-most first).
    pub layers: Vec<LayerIr>,
}

impl CompositionIr {
    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&LayerIr> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Position of a layer in authoring order.
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }
}

/// Layer type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// Raster image.
    Image,
    /// Vector shapes.
    Shapes,
    /// Precomposition container.
    Precomp,
    /// Transform-only layer.
    Null,
}

/// Layer payload.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerContent {
    /// Raster image.
    Image {
        /// Namespaced asset id.
        asset_id: String,
        /// Image width.
        width: f64,
        /// Image height.
        height: f64,
    },
    /// Vector shapes: the layer's shape list as an implicit root group.
    Shapes(ShapeGroupIr),
    /// Precomposition container.
    Precomp {
        /// Referenced composition.
        comp_id: CompId,
    },
    /// No content.
    Null,
}

/// Compiled layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerIr {
    /// Layer id (`ind`).
    pub id: LayerId,
    /// Layer name.
    pub name: String,
    /// Payload.
    pub content: LayerContent,
    /// Visibility window in composition-local frames.
    pub window: FrameWindow,
    /// Start time offset applied to precomposition content.
    pub start_time: f64,
    /// Parent layer id.
    pub parent: Option<LayerId>,
    /// Animated transform.
    pub transform: TransformTrack,
    /// Masks in authoring order.
    pub masks: Vec<MaskIr>,
    /// Track matte this layer consumes.
    pub matte: Option<MatteLink>,
    /// Drawn only as a matte source (explicit `td` or referenced as a target).
    pub is_matte_source: bool,
    /// Consumer-controllable visibility flag.
    pub toggle_id: Option<String>,
    /// Hidden in the editor.
    pub hidden: bool,
}

impl LayerIr {
    /// Layer type.
    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Image { .. } => LayerKind::Image,
            LayerContent::Shapes(_) => LayerKind::Shapes,
            LayerContent::Precomp { .. } => LayerKind::Precomp,
            LayerContent::Null => LayerKind::Null,
        }
    }
}

/// Layer position: combined, or x/y animated independently.
#[derive(Clone, Debug, PartialEq)]
pub enum PositionTrack {
    /// Single 2-D value.
    Combined(AnimatedValue<Vec2>),
    /// Independent components.
    Split {
        /// X component.
        x: AnimatedValue<f64>,
        /// Y component.
        y: AnimatedValue<f64>,
    },
}

impl PositionTrack {
    /// Sample at `frame`.
    pub fn sample(&self, frame: f64) -> Vec2 {
        match self {
            Self::Combined(v) => v.sample(frame),
            Self::Split { x, y } => Vec2::new(x.sample(frame), y.sample(frame)),
        }
    }
}

impl Default for PositionTrack {
    fn default() -> Self {
        Self::Combined(AnimatedValue::Static(Vec2::ZERO))
    }
}

/// Animated layer or group transform. Scale and opacity are stored as factors (`1.0` = 100%).
#[derive(Clone, Debug, PartialEq)]
pub struct TransformTrack {
    /// Anchor point.
    pub anchor: AnimatedValue<Vec2>,
    /// Position.
    pub position: PositionTrack,
    /// Scale factor.
    pub scale: AnimatedValue<Vec2>,
    /// Rotation in degrees.
    pub rotation: AnimatedValue<f64>,
    /// Opacity in `[0, 1]`.
    pub opacity: AnimatedValue<f64>,
}

impl Default for TransformTrack {
    fn default() -> Self {
        Self {
            anchor: AnimatedValue::Static(Vec2::ZERO),
            position: PositionTrack::default(),
            scale: AnimatedValue::Static(Vec2::new(1.0, 1.0)),
            rotation: AnimatedValue::Static(0.0),
            opacity: AnimatedValue::Static(1.0),
        }
    }
}

impl TransformTrack {
    /// Local matrix at `frame`.
    pub fn matrix(&self, frame: f64) -> Affine {
        layer_matrix(
            self.position.sample(frame),
            self.anchor.sample(frame),
            self.scale.sample(frame),
            self.rotation.sample(frame),
        )
    }

    /// Opacity at `frame`, clamped to `[0, 1]`.
    pub fn opacity(&self, frame: f64) -> f64 {
        let o = self.opacity.sample(frame);
        if o.is_finite() { o.clamp(0.0, 1.0) } else { 1.0 }
    }
}

/// Mask combine mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaskMode {
    /// Union.
    Add,
    /// Difference from the accumulated coverage.
    Subtract,
    /// Intersection.
    Intersect,
    /// Maximum.
    Lighten,
    /// Minimum.
    Darken,
    /// Absolute difference.
    Difference,
}

impl MaskMode {
    /// Parse a Lottie mode code. `n` (none) and unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::Add),
            "s" => Some(Self::Subtract),
            "i" => Some(Self::Intersect),
            "l" => Some(Self::Lighten),
            "d" => Some(Self::Darken),
            "f" => Some(Self::Difference),
            _ => None,
        }
    }
}

/// Compiled mask.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskIr {
    /// Mask name.
    pub name: String,
    /// Combine mode.
    pub mode: MaskMode,
    /// Inverted coverage.
    pub inverted: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: AnimatedValue<f64>,
    /// Outline in layer space.
    pub path_id: PathId,
}

/// Track matte mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatteMode {
    /// Source alpha.
    Alpha,
    /// `1 - source alpha`.
    AlphaInverted,
    /// Source luminance.
    Luma,
    /// `1 - source luminance`.
    LumaInverted,
}

impl MatteMode {
    /// Parse a Lottie `tt` code.
    pub fn from_tt(tt: i64) -> Option<Self> {
        match tt {
            1 => Some(Self::Alpha),
            2 => Some(Self::AlphaInverted),
            3 => Some(Self::Luma),
            4 => Some(Self::LumaInverted),
            _ => None,
        }
    }
}

/// Link from a matte consumer to its source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatteLink {
    /// Matte mode.
    pub mode: MatteMode,
    /// Source layer id in the same composition.
    pub source: LayerId,
}

/// Shape group: a local transform over paths and nested groups.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeGroupIr {
    /// Group name.
    pub name: String,
    /// Group-local transform (identity for the implicit root group).
    pub transform: TransformTrack,
    /// Paths and nested groups, top-most first.
    pub elements: Vec<ShapeElementIr>,
}

/// Element of a shape group.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeElementIr {
    /// Path painted with the group's effective fill and stroke.
    Path(ShapePathIr),
    /// Nested group.
    Group(ShapeGroupIr),
}

/// Painted path.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapePathIr {
    /// Geometry in group-local space.
    pub path_id: PathId,
    /// Effective fill.
    pub fill: Option<FillIr>,
    /// Effective stroke.
    pub stroke: Option<StrokeIr>,
}

/// Solid fill.
#[derive(Clone, Debug, PartialEq)]
pub struct FillIr {
    /// Color.
    pub color: AnimatedValue<Rgba>,
    /// Opacity in `[0, 1]`.
    pub opacity: AnimatedValue<f64>,
}

/// Solid stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeIr {
    /// Color.
    pub color: AnimatedValue<Rgba>,
    /// Opacity in `[0, 1]`.
    pub opacity: AnimatedValue<f64>,
    /// Width in group-local units.
    pub width: AnimatedValue<f64>,
}

impl ShapeGroupIr {
    /// Nested group addressed by element indices.
    pub fn group_at(&self, path: &[usize]) -> Option<&ShapeGroupIr> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        match self.elements.get(*first)? {
            ShapeElementIr::Group(g) => g.group_at(rest),
            ShapeElementIr::Path(_) => None,
        }
    }

    /// Every path id in this group and its descendants, in authoring order.
    pub fn path_ids(&self) -> Vec<PathId> {
        let mut out = Vec::new();
        self.collect_path_ids(&mut out);
        out
    }

    fn collect_path_ids(&self, out: &mut Vec<PathId>) {
        for e in &self.elements {
            match e {
                ShapeElementIr::Path(p) => out.push(p.path_id),
                ShapeElementIr::Group(g) => g.collect_path_ids(out),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/model.rs"]
mod tests;
