use crate::foundation::core::{Affine, Rect, Rgba};
use crate::ir::model::{MaskMode, MatteMode};
use crate::paths::registry::PathId;

/// One drawing instruction.
///
/// Begin/end and push/pop pairs are strictly nested. Transforms concatenate onto the current
/// transform (`current * pushed`) and are restored on pop.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Open a named group.
    BeginGroup {
        /// Group name (`layer:<name>`, `matteSource`, `matteConsumer`).
        name: String,
    },
    /// Close the innermost group.
    EndGroup,
    /// Concatenate a transform onto the current one.
    PushTransform(Affine),
    /// Restore the transform active before the matching push.
    PopTransform,
    /// Intersect the clip with a rectangle in current coordinates.
    PushClipRect(Rect),
    /// Restore the clip active before the matching push.
    PopClipRect,
    /// Open a mask scope. Masks of one layer are emitted LIFO (last authored mask first).
    BeginMask {
        /// Combine mode.
        mode: MaskMode,
        /// Inverted coverage.
        inverted: bool,
        /// Outline, in current coordinates.
        path_id: PathId,
        /// Mask opacity in `[0, 1]`.
        opacity: f64,
        /// Frame at which to sample the outline.
        frame: f64,
    },
    /// Close the innermost mask scope.
    EndMask,
    /// Open a track matte scope holding a `matteSource` and a `matteConsumer` group.
    BeginMatte {
        /// Matte mode.
        mode: MatteMode,
    },
    /// Close the innermost matte scope.
    EndMatte,
    /// Draw an image covering `[0, width] x [0, height]`.
    DrawImage {
        /// Namespaced asset id.
        asset_id: String,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Opacity in `[0, 1]`.
        opacity: f64,
    },
    /// Fill a path.
    DrawShape {
        /// Outline.
        path_id: PathId,
        /// Frame at which to sample the outline.
        frame: f64,
        /// Fill color.
        color: Rgba,
        /// Opacity in `[0, 1]`.
        opacity: f64,
    },
    /// Stroke a path.
    DrawStroke {
        /// Outline.
        path_id: PathId,
        /// Frame at which to sample the outline.
        frame: f64,
        /// Stroke color.
        color: Rgba,
        /// Stroke width in current coordinates.
        width: f64,
        /// Opacity in `[0, 1]`.
        opacity: f64,
    },
}

impl RenderCommand {
    /// Short name of the command kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::BeginGroup { .. } => "beginGroup",
            Self::EndGroup => "endGroup",
            Self::PushTransform(_) => "pushTransform",
            Self::PopTransform => "popTransform",
            Self::PushClipRect(_) => "pushClipRect",
            Self::PopClipRect => "popClipRect",
            Self::BeginMask { .. } => "beginMask",
            Self::EndMask => "endMask",
            Self::BeginMatte { .. } => "beginMatte",
            Self::EndMatte => "endMatte",
            Self::DrawImage { .. } => "drawImage",
            Self::DrawShape { .. } => "drawShape",
            Self::DrawStroke { .. } => "drawStroke",
        }
    }

    /// `true` for draw commands.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawImage { .. } | Self::DrawShape { .. } | Self::DrawStroke { .. }
        )
    }
}
