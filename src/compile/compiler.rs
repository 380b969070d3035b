//! Scene → [`AnimIr`] compilation.
//!
//! Compilation is all-or-nothing: any structural problem (unknown binding, unresolvable matte,
//! incompatible path keyframes, missing or cyclic precompositions) aborts with an error and no IR.

use crate::compile::matte::resolve_mattes;
use crate::compile::shapes::{compile_shape_list, solid_rect};
use crate::compile::transform::{opacity_or_opaque, transform_track};
use crate::foundation::core::{Canvas, FrameWindow, Rgba};
use crate::foundation::error::{AnimirError, AnimirResult};
use crate::ir::model::{
    AnimIr, AssetIndexIr, Binding, CompId, CompositionIr, ImageAssetIr, LayerContent, LayerId,
    LayerIr, MarkerIr, MaskIr, MaskMode, MatteLink, Meta, ROOT_COMP_ID,
};
use crate::paths::registry::PathRegistry;
use crate::scene::model::{LayerDef, LottieScene};
use std::collections::{BTreeMap, BTreeSet};

/// Default name prefix marking a layer as toggleable.
pub const DEFAULT_TOGGLE_PREFIX: &str = "toggle:";

/// Compiler options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOpts {
    /// Layer-name prefix that tags a layer with a toggle id (the rest of the name).
    pub toggle_prefix: String,
}

impl Default for CompileOpts {
    fn default() -> Self {
        Self {
            toggle_prefix: DEFAULT_TOGGLE_PREFIX.to_owned(),
        }
    }
}

/// Host-provided resolution of image asset ids to backend paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetIndex {
    paths: BTreeMap<String, String>,
}

impl AssetIndex {
    /// Empty index; every image falls back to the scene's own `u` + `p`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a scene asset id to a backend path.
    pub fn insert(&mut self, asset_id: impl Into<String>, path: impl Into<String>) {
        self.paths.insert(asset_id.into(), path.into());
    }

    /// Backend path for a scene asset id.
    pub fn resolve(&self, asset_id: &str) -> Option<&str> {
        self.paths.get(asset_id).map(String::as_str)
    }
}

/// Compile `scene` with default options.
pub fn compile(
    scene: &LottieScene,
    anim_ref: &str,
    binding_key: &str,
    assets: &AssetIndex,
    registry: &mut PathRegistry,
) -> AnimirResult<AnimIr> {
    compile_with_opts(
        scene,
        anim_ref,
        binding_key,
        assets,
        registry,
        &CompileOpts::default(),
    )
}

/// Compile `scene` into an [`AnimIr`], registering every path in `registry`.
#[tracing::instrument(skip(scene, assets, registry, opts), fields(generation_id = registry.generation_id()))]
pub fn compile_with_opts(
    scene: &LottieScene,
    anim_ref: &str,
    binding_key: &str,
    assets: &AssetIndex,
    registry: &mut PathRegistry,
    opts: &CompileOpts,
) -> AnimirResult<AnimIr> {
    scene.validate()?;

    let mut cx = Compiler {
        scene,
        anim_ref,
        assets,
        registry,
        opts,
        comps: BTreeMap::new(),
        images: BTreeMap::new(),
        visiting: Vec::new(),
    };
    let canvas = Canvas {
        width: scene.w,
        height: scene.h,
    };
    cx.compile_comp(ROOT_COMP_ID, canvas, &scene.layers)?;

    let Compiler { comps, images, .. } = cx;
    let binding = resolve_binding(&comps, binding_key)?;

    let ir = AnimIr {
        meta: Meta {
            width: scene.w,
            height: scene.h,
            fps: scene.fr,
            in_point: scene.ip,
            out_point: scene.op,
            anim_ref: anim_ref.to_owned(),
            markers: scene
                .markers
                .iter()
                .map(|m| MarkerIr {
                    name: m.cm.clone(),
                    frame: m.tm,
                    duration: m.dr,
                })
                .collect(),
        },
        binding,
        assets: AssetIndexIr { images },
        comps,
        root_comp_id: ROOT_COMP_ID.to_owned(),
    };
    tracing::debug!(
        comps = ir.comps.len(),
        paths = registry.len(),
        "animation compiled"
    );
    Ok(ir)
}

struct Compiler<'a> {
    scene: &'a LottieScene,
    anim_ref: &'a str,
    assets: &'a AssetIndex,
    registry: &'a mut PathRegistry,
    opts: &'a CompileOpts,
    comps: BTreeMap<CompId, CompositionIr>,
    images: BTreeMap<String, ImageAssetIr>,
    visiting: Vec<String>,
}

impl Compiler<'_> {
    fn compile_comp(&mut self, comp_id: &str, size: Canvas, layers: &[LayerDef]) -> AnimirResult<()> {
        self.visiting.push(comp_id.to_owned());
        let mattes = resolve_mattes(comp_id, layers)?;
        let ids = layer_ids(comp_id, layers);

        let mut out = Vec::with_capacity(layers.len());
        for (idx, def) in layers.iter().enumerate() {
            let content = self.compile_content(comp_id, def)?;
            out.push(LayerIr {
                id: ids[idx],
                name: def.nm.clone(),
                content,
                window: FrameWindow::new(def.ip, def.op)?,
                start_time: def.st,
                parent: def.parent,
                transform: transform_track(&def.ks),
                masks: self.compile_masks(def)?,
                matte: mattes.links[idx].map(|(mode, target)| MatteLink {
                    mode,
                    source: ids[target],
                }),
                is_matte_source: mattes.sources[idx],
                toggle_id: toggle_id(&def.nm, &self.opts.toggle_prefix),
                hidden: def.hd,
            });
        }

        self.visiting.pop();
        self.comps.insert(
            comp_id.to_owned(),
            CompositionIr {
                id: comp_id.to_owned(),
                size,
                layers: out,
            },
        );
        Ok(())
    }

    fn compile_content(&mut self, comp_id: &str, def: &LayerDef) -> AnimirResult<LayerContent> {
        let context = format!("layer \"{}\" of composition \"{comp_id}\"", def.nm);
        match def.ty {
            0 => {
                let Some(ref_id) = def.ref_id.as_deref() else {
                    tracing::warn!(layer = %def.nm, "precomposition layer without refId");
                    return Ok(LayerContent::Null);
                };
                self.compile_precomp(ref_id, def)?;
                Ok(LayerContent::Precomp {
                    comp_id: ref_id.to_owned(),
                })
            }
            1 => {
                let color = def.sc.as_deref().and_then(Rgba::from_hex).unwrap_or_else(|| {
                    tracing::warn!(layer = %def.nm, "solid layer with invalid color");
                    Rgba::transparent()
                });
                let group = solid_rect(
                    def.sw.unwrap_or(0.0),
                    def.sh.unwrap_or(0.0),
                    color,
                    self.registry,
                    &context,
                )?;
                Ok(LayerContent::Shapes(group))
            }
            2 => Ok(self.compile_image(def)),
            3 => Ok(LayerContent::Null),
            4 => Ok(LayerContent::Shapes(compile_shape_list(
                &def.shapes,
                self.registry,
                &context,
            )?)),
            ty => {
                tracing::warn!(layer = %def.nm, ty, "unsupported layer type compiled as null");
                Ok(LayerContent::Null)
            }
        }
    }

    fn compile_precomp(&mut self, ref_id: &str, container: &LayerDef) -> AnimirResult<()> {
        if self.visiting.iter().any(|v| v == ref_id) {
            return Err(AnimirError::PrecompCycle {
                ref_id: ref_id.to_owned(),
            });
        }
        if self.comps.contains_key(ref_id) {
            return Ok(());
        }
        let scene = self.scene;
        let Some(asset) = scene.precomp(ref_id) else {
            return Err(AnimirError::PrecompNotFound {
                ref_id: ref_id.to_owned(),
            });
        };
        let size = Canvas {
            width: container.w.unwrap_or(scene.w),
            height: container.h.unwrap_or(scene.h),
        };
        self.compile_comp(ref_id, size, &asset.layers)
    }

    fn compile_image(&mut self, def: &LayerDef) -> LayerContent {
        let Some(asset) = def.ref_id.as_deref().and_then(|id| self.scene.image(id)) else {
            tracing::warn!(layer = %def.nm, ref_id = ?def.ref_id, "image layer without a known asset");
            return LayerContent::Null;
        };
        let asset_id = format!("{}|{}", self.anim_ref, asset.id);
        let path = self
            .assets
            .resolve(&asset.id)
            .map_or_else(|| format!("{}{}", asset.u, asset.p), str::to_owned);
        self.images.insert(
            asset_id.clone(),
            ImageAssetIr {
                path,
                width: asset.w,
                height: asset.h,
            },
        );
        LayerContent::Image {
            asset_id,
            width: asset.w,
            height: asset.h,
        }
    }

    fn compile_masks(&mut self, def: &LayerDef) -> AnimirResult<Vec<MaskIr>> {
        if def.has_mask == Some(false) {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(def.masks_properties.len());
        for (idx, m) in def.masks_properties.iter().enumerate() {
            let Some(mode) = MaskMode::from_code(&m.mode) else {
                if m.mode != "n" {
                    tracing::warn!(layer = %def.nm, mode = %m.mode, "unsupported mask mode ignored");
                }
                continue;
            };
            let path_id = self.registry.register(&m.pt).ok_or_else(|| {
                AnimirError::topology(format!("mask {idx} of layer \"{}\"", def.nm))
            })?;
            out.push(MaskIr {
                name: m.nm.clone(),
                mode,
                inverted: m.inv,
                opacity: opacity_or_opaque(m.o.as_ref()),
                path_id,
            });
        }
        Ok(out)
    }
}

/// Layer ids from `ind`; layers without one get negative ids that no `parent` can reference.
fn layer_ids(comp_id: &str, layers: &[LayerDef]) -> Vec<LayerId> {
    let mut seen = BTreeSet::new();
    layers
        .iter()
        .enumerate()
        .map(|(idx, l)| {
            let id = l.ind.unwrap_or(-(idx as LayerId) - 1);
            if !seen.insert(id) {
                tracing::warn!(comp = comp_id, layer = %l.nm, id, "duplicate layer index");
            }
            id
        })
        .collect()
}

fn toggle_id(name: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    name.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .map(str::to_owned)
}

fn resolve_binding(
    comps: &BTreeMap<CompId, CompositionIr>,
    binding_key: &str,
) -> AnimirResult<Binding> {
    let root = comps.get(ROOT_COMP_ID).into_iter();
    let others = comps
        .iter()
        .filter(|(id, _)| id.as_str() != ROOT_COMP_ID)
        .map(|(_, c)| c);

    let mut matches = root.chain(others).flat_map(move |c| {
        c.layers
            .iter()
            .filter(move |l| l.name == binding_key)
            .map(move |l| (c.id.clone(), l.id))
    });
    let Some((comp_id, layer_id)) = matches.next() else {
        return Err(AnimirError::BindingLayerNotFound {
            binding_key: binding_key.to_owned(),
        });
    };
    let extra = matches.count();
    if extra > 0 {
        tracing::warn!(binding_key, extra, "binding key matches several layers; using the first");
    }
    Ok(Binding {
        binding_key: binding_key.to_owned(),
        comp_id,
        layer_id,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
