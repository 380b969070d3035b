//! Track matte resolution.
//!
//! A consumer names its source either explicitly (`tp` = the source's `ind`) or implicitly (the
//! layer right above it). Any resolved target becomes a matte source, whether or not it carries
//! the `td` marker, and a layer may be both a source and a consumer (matte chains).

use crate::foundation::error::{AnimirError, AnimirResult};
use crate::ir::model::MatteMode;
use crate::scene::model::LayerDef;

/// Per-layer matte resolution of one composition, indexed like the layer list.
#[derive(Debug, Default)]
pub(crate) struct MatteResolution {
    /// Consumer links: mode and index of the source layer.
    pub(crate) links: Vec<Option<(MatteMode, usize)>>,
    /// Layers drawn only as matte sources.
    pub(crate) sources: Vec<bool>,
}

pub(crate) fn resolve_mattes(comp_id: &str, layers: &[LayerDef]) -> AnimirResult<MatteResolution> {
    let mut links = vec![None; layers.len()];
    let mut sources: Vec<bool> = layers.iter().map(|l| l.td).collect();

    for (idx, layer) in layers.iter().enumerate() {
        let Some(mode) = layer.tt.and_then(MatteMode::from_tt) else {
            if let Some(tt) = layer.tt
                && tt != 0
            {
                tracing::warn!(layer = %layer.nm, tt, "unsupported track matte type ignored");
            }
            continue;
        };

        let target = match layer.tp {
            Some(tp) => layers.iter().position(|l| l.ind == Some(tp)),
            None => idx.checked_sub(1),
        };
        let Some(target) = target else {
            return Err(AnimirError::MatteTargetNotFound {
                tp: layer.tp,
                layer: layer.nm.clone(),
                comp: comp_id.to_owned(),
            });
        };
        if target >= idx {
            return Err(AnimirError::MatteTargetInvalidOrder {
                tp: layer.tp,
                layer: layer.nm.clone(),
                comp: comp_id.to_owned(),
            });
        }

        links[idx] = Some((mode, target));
        sources[target] = true;
    }

    Ok(MatteResolution { links, sources })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/matte.rs"]
mod tests;
