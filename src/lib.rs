//! animir compiles Lottie scene descriptions into a deterministic, stack-balanced stream of
//! render commands.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: Lottie JSON -> [`LottieScene`] (serde boundary + header validation)
//! 2. **Compile**: [`LottieScene`] -> [`AnimIr`] (compositions, layers, masks, mattes; every
//!    outline registered once in a [`PathRegistry`])
//! 3. **Emit**: [`AnimIr`] + frame -> [`RenderOutput`] (a flat [`RenderCommand`] stream plus
//!    non-fatal [`RenderIssue`]s)
//! 4. **Check** (optional): [`validate_commands`], [`fingerprint_commands`], [`probe_alpha`]
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: compilation and emission are pure; float tolerances live in one
//!   quantization layer ([`quantized_int`] and friends).
//! - **Balanced streams**: every push and begin opened inside a scope is closed before that
//!   scope ends, so consumers can keep plain stacks.
//! - **Emission never fails**: compile errors are fatal, per-frame anomalies are reported.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod compile;
mod foundation;
mod geometry;
mod ir;
mod paths;
mod query;
mod render;
mod scene;

pub use animation::anim::{AnimatedValue, Keyframe, KeyframeSpan, Lerp, locate};
pub use compile::compiler::{
    AssetIndex, CompileOpts, DEFAULT_TOGGLE_PREFIX, compile, compile_with_opts,
};
pub use foundation::core::{Affine, BezPath, Canvas, FrameWindow, Point, Rect, Rgba, Vec2};
pub use foundation::error::{AnimirError, AnimirResult};
pub use foundation::hash::Fingerprint128;
pub use foundation::quantize::{
    CACHE_FRAME_STEP, COORD_STEP, KEYFRAME_TIME_EPSILON, NEARLY_EQUAL_EPSILON, STROKE_WIDTH_STEP,
    nearly_equal, quantize_affine, quantize_coord, quantize_frame, quantize_point,
    quantize_stroke_width, quantized_int,
};
pub use geometry::affine::{AffineExt, SINGULAR_DETERMINANT, layer_matrix};
pub use geometry::ease::{EaseCurve, solve};
pub use geometry::path::{BezierPath, FLATTEN_STEPS};
pub use ir::model::{
    AnimIr, AssetIndexIr, Binding, CompId, CompositionIr, FillIr, ImageAssetIr, LayerContent,
    LayerId, LayerIr, LayerKind, MarkerIr, MaskIr, MaskMode, MatteLink, MatteMode, Meta,
    PositionTrack, ROOT_COMP_ID, ShapeElementIr, ShapeGroupIr, ShapePathIr, StrokeIr,
    TransformTrack,
};
pub use paths::cache::{CacheStats, PathCacheOpts, PathSamplingCache, SampleKey};
pub use paths::registry::{PathId, PathRegistry, PathResource, PathShape};
pub use paths::tessellate::{triangulate, triangulate_polygon, vertex_buffer};
pub use query::{
    HitResult, hit_test, layer_bounds, layer_world_transform, shape_group_world_transform,
};
pub use render::batch::{BatchRenderOpts, render_frames, render_frames_with_opts};
pub use render::command::RenderCommand;
pub use render::emitter::{
    RenderIssue, RenderIssueKind, RenderOutput, ToggleSet, render_commands,
    render_commands_with_cache,
};
pub use render::extract::{
    MaskOp, MaskScope, MatteScope, combine_mask_coverage, extract_mask_scope,
    extract_matte_scope, mask_accumulator_seed,
};
pub use render::fingerprint::{CommandFingerprint, fingerprint_commands};
pub use render::probe::{probe_alpha, probe_color};
pub use render::space::{ContainerSpace, LayerWorld, container_space, layer_world, precomp_chain};
pub use render::validate::{ValidationIssue, ValidationIssueKind, ensure_valid, validate_commands};
pub use scene::model::{
    AssetDef, EllipseShapeDef, FillShapeDef, GroupShapeDef, ImageAssetDef, LayerDef, LottieScene,
    MarkerDef, MaskDef, PathShapeDef, PositionDef, PrecompAssetDef, RectShapeDef, ShapeDef,
    StrokeShapeDef, TransformDef,
};
pub use scene::value::{FromLottie, animated_from_json};
