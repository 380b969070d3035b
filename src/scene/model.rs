//! Typed view of a Lottie document.
//!
//! Only the fields the compiler consumes are modelled; everything else in the JSON is ignored.

use crate::animation::anim::AnimatedValue;
use crate::foundation::core::{Rgba, Vec2};
use crate::foundation::error::{AnimirError, AnimirResult};
use crate::geometry::path::BezierPath;
use crate::scene::value::deserialize_flag;
use serde::{Deserialize, Deserializer};

/// Root of a Lottie document.
#[derive(Debug, Clone, Deserialize)]
pub struct LottieScene {
    /// Format version string.
    #[serde(default)]
    pub v: Option<String>,
    /// Scene name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Canvas width.
    pub w: f64,
    /// Canvas height.
    pub h: f64,
    /// Frame rate.
    pub fr: f64,
    /// In point (first frame).
    pub ip: f64,
    /// Out point (exclusive end frame).
    pub op: f64,
    /// Precompositions and images.
    #[serde(default)]
    pub assets: Vec<AssetDef>,
    /// Root composition layers, top-most first.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
    /// Named time markers.
    #[serde(default)]
    pub markers: Vec<MarkerDef>,
}

impl LottieScene {
    /// Parse a scene from a JSON string.
    pub fn from_json_str(s: &str) -> AnimirResult<Self> {
        let scene: Self = serde_json::from_str(s)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Parse a scene from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> AnimirResult<Self> {
        let scene: Self = serde_json::from_slice(bytes)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Parse a scene from an already decoded JSON value.
    pub fn from_json_value(v: serde_json::Value) -> AnimirResult<Self> {
        let scene: Self = serde_json::from_value(v)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Basic document sanity: positive size and frame rate, ordered in/out points.
    pub fn validate(&self) -> AnimirResult<()> {
        if !(self.w > 0.0 && self.h > 0.0) {
            return Err(AnimirError::validation("scene w/h must be > 0"));
        }
        if !(self.fr > 0.0) {
            return Err(AnimirError::validation("scene fr must be > 0"));
        }
        if !(self.ip <= self.op) {
            return Err(AnimirError::validation("scene ip must be <= op"));
        }
        Ok(())
    }

    /// Precomposition asset by id.
    pub fn precomp(&self, id: &str) -> Option<&PrecompAssetDef> {
        self.assets.iter().find_map(|a| match a {
            AssetDef::Precomp(p) if p.id == id => Some(p),
            _ => None,
        })
    }

    /// Image asset by id.
    pub fn image(&self, id: &str) -> Option<&ImageAssetDef> {
        self.assets.iter().find_map(|a| match a {
            AssetDef::Image(i) if i.id == id => Some(i),
            _ => None,
        })
    }
}

/// Scene asset: a precomposition (has `layers`) or an image.
#[derive(Debug, Clone)]
pub enum AssetDef {
    /// Reusable sub-animation.
    Precomp(PrecompAssetDef),
    /// Raster image reference.
    Image(ImageAssetDef),
}

/// Precomposition asset.
#[derive(Debug, Clone, Deserialize)]
pub struct PrecompAssetDef {
    /// Asset id referenced by `refId`.
    pub id: String,
    /// Optional name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Layers, top-most first.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

/// Image asset.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageAssetDef {
    /// Asset id referenced by `refId`.
    pub id: String,
    /// Pixel width.
    #[serde(default)]
    pub w: f64,
    /// Pixel height.
    #[serde(default)]
    pub h: f64,
    /// Directory part of the path.
    #[serde(default)]
    pub u: String,
    /// File name, or a data URI when embedded.
    #[serde(default)]
    pub p: String,
    /// `true` when `p` is embedded data.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub e: bool,
}

impl<'de> Deserialize<'de> for AssetDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let is_precomp = raw.get("layers").is_some();
        if is_precomp {
            PrecompAssetDef::deserialize(raw)
                .map(Self::Precomp)
                .map_err(serde::de::Error::custom)
        } else {
            ImageAssetDef::deserialize(raw)
                .map(Self::Image)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Time marker.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerDef {
    /// Marker time in frames.
    #[serde(default)]
    pub tm: f64,
    /// Comment / name.
    #[serde(default)]
    pub cm: String,
    /// Duration in frames.
    #[serde(default)]
    pub dr: f64,
}

/// Lottie layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDef {
    /// Layer index, referenced by `parent` and `tp`.
    #[serde(default)]
    pub ind: Option<i64>,
    /// Layer type (0 precomp, 1 solid, 2 image, 3 null, 4 shapes, 5 text).
    #[serde(default = "default_layer_type")]
    pub ty: i64,
    /// Layer name.
    #[serde(default)]
    pub nm: String,
    /// Transform.
    #[serde(default)]
    pub ks: TransformDef,
    /// In point.
    #[serde(default)]
    pub ip: f64,
    /// Out point.
    #[serde(default = "default_out_point")]
    pub op: f64,
    /// Start time offset for precomposition content.
    #[serde(default)]
    pub st: f64,
    /// Parent layer index.
    #[serde(default)]
    pub parent: Option<i64>,
    /// Referenced asset id (precomp or image).
    #[serde(default, rename = "refId")]
    pub ref_id: Option<String>,
    /// Track matte type used by this layer (consumer side).
    #[serde(default)]
    pub tt: Option<i64>,
    /// Explicit matte target index.
    #[serde(default)]
    pub tp: Option<i64>,
    /// Explicit matte source marker.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub td: bool,
    /// Whether `masksProperties` is meaningful.
    #[serde(default, rename = "hasMask")]
    pub has_mask: Option<bool>,
    /// Masks in authoring order.
    #[serde(default, rename = "masksProperties")]
    pub masks_properties: Vec<MaskDef>,
    /// Shape items (shape layers).
    #[serde(default)]
    pub shapes: Vec<ShapeDef>,
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Precomposition width.
    #[serde(default)]
    pub w: Option<f64>,
    /// Precomposition height.
    #[serde(default)]
    pub h: Option<f64>,
    /// Solid width.
    #[serde(default)]
    pub sw: Option<f64>,
    /// Solid height.
    #[serde(default)]
    pub sh: Option<f64>,
    /// Solid color (`#rrggbb`).
    #[serde(default)]
    pub sc: Option<String>,
}

fn default_layer_type() -> i64 {
    3
}

fn default_out_point() -> f64 {
    f64::INFINITY
}

/// Layer or shape-group transform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformDef {
    /// Anchor point.
    #[serde(default)]
    pub a: Option<AnimatedValue<Vec2>>,
    /// Position (combined or split).
    #[serde(default)]
    pub p: Option<PositionDef>,
    /// Scale in percent.
    #[serde(default)]
    pub s: Option<AnimatedValue<Vec2>>,
    /// Rotation in degrees.
    #[serde(default)]
    pub r: Option<AnimatedValue<f64>>,
    /// Opacity in percent.
    #[serde(default)]
    pub o: Option<AnimatedValue<f64>>,
}

/// Position property; Lottie allows splitting x and y into separate animations.
#[derive(Debug, Clone)]
pub enum PositionDef {
    /// Single 2-D animated value.
    Combined(AnimatedValue<Vec2>),
    /// Independently animated components.
    Split {
        /// X component.
        x: AnimatedValue<f64>,
        /// Y component.
        y: AnimatedValue<f64>,
    },
}

impl<'de> Deserialize<'de> for PositionDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let split = raw
            .get("s")
            .is_some_and(|s| s.as_bool().unwrap_or(false) || s.as_i64() == Some(1))
            && raw.get("x").is_some()
            && raw.get("y").is_some();
        if split {
            let x = crate::scene::value::animated_from_json(&raw["x"])
                .map_err(serde::de::Error::custom)?;
            let y = crate::scene::value::animated_from_json(&raw["y"])
                .map_err(serde::de::Error::custom)?;
            return Ok(Self::Split { x, y });
        }
        crate::scene::value::animated_from_json(&raw)
            .map(Self::Combined)
            .map_err(serde::de::Error::custom)
    }
}

/// Mask definition.
#[derive(Debug, Clone, Deserialize)]
pub struct MaskDef {
    /// Mask name.
    #[serde(default)]
    pub nm: String,
    /// Mode code: `a` add, `s` subtract, `i` intersect, `l` lighten, `d` darken, `f` difference,
    /// `n` none.
    #[serde(default = "default_mask_mode")]
    pub mode: String,
    /// Inverted.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub inv: bool,
    /// Mask outline.
    pub pt: AnimatedValue<BezierPath>,
    /// Opacity in percent.
    #[serde(default)]
    pub o: Option<AnimatedValue<f64>>,
}

fn default_mask_mode() -> String {
    "a".to_owned()
}

/// Shape item inside a shape layer or group.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "ty")]
pub enum ShapeDef {
    /// Group of items.
    #[serde(rename = "gr")]
    Group(GroupShapeDef),
    /// Free-form bezier path.
    #[serde(rename = "sh")]
    Path(PathShapeDef),
    /// Rectangle.
    #[serde(rename = "rc")]
    Rect(RectShapeDef),
    /// Ellipse.
    #[serde(rename = "el")]
    Ellipse(EllipseShapeDef),
    /// Solid fill.
    #[serde(rename = "fl")]
    Fill(FillShapeDef),
    /// Solid stroke.
    #[serde(rename = "st")]
    Stroke(StrokeShapeDef),
    /// Group transform.
    #[serde(rename = "tr")]
    Transform(TransformDef),
    /// Anything else (gradients, trims, repeaters, ...).
    #[serde(other)]
    Unsupported,
}

/// `gr` item.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupShapeDef {
    /// Group name.
    #[serde(default)]
    pub nm: String,
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Child items, top-most first; the group transform is usually last.
    #[serde(default)]
    pub it: Vec<ShapeDef>,
}

/// `sh` item.
#[derive(Debug, Clone, Deserialize)]
pub struct PathShapeDef {
    /// Item name.
    #[serde(default)]
    pub nm: String,
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Outline.
    pub ks: AnimatedValue<BezierPath>,
}

/// `rc` item.
#[derive(Debug, Clone, Deserialize)]
pub struct RectShapeDef {
    /// Item name.
    #[serde(default)]
    pub nm: String,
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Center.
    pub p: AnimatedValue<Vec2>,
    /// Size.
    pub s: AnimatedValue<Vec2>,
}

/// `el` item.
#[derive(Debug, Clone, Deserialize)]
pub struct EllipseShapeDef {
    /// Item name.
    #[serde(default)]
    pub nm: String,
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Center.
    pub p: AnimatedValue<Vec2>,
    /// Size.
    pub s: AnimatedValue<Vec2>,
}

/// `fl` item.
#[derive(Debug, Clone, Deserialize)]
pub struct FillShapeDef {
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Color.
    pub c: AnimatedValue<Rgba>,
    /// Opacity in percent.
    #[serde(default)]
    pub o: Option<AnimatedValue<f64>>,
}

/// `st` item.
#[derive(Debug, Clone, Deserialize)]
pub struct StrokeShapeDef {
    /// Hidden.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub hd: bool,
    /// Color.
    pub c: AnimatedValue<Rgba>,
    /// Opacity in percent.
    #[serde(default)]
    pub o: Option<AnimatedValue<f64>>,
    /// Width.
    #[serde(default)]
    pub w: Option<AnimatedValue<f64>>,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
