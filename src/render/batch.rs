use crate::foundation::core::Affine;
use crate::foundation::error::{AnimirError, AnimirResult};
use crate::ir::model::AnimIr;
use crate::paths::cache::{PathCacheOpts, PathSamplingCache};
use crate::paths::registry::PathRegistry;
use crate::render::emitter::{RenderOutput, ToggleSet, render_commands_with_cache};
use rayon::prelude::*;

/// Options for [`render_frames_with_opts`].
#[derive(Clone, Copy, Debug)]
pub struct BatchRenderOpts {
    /// Emit frames in parallel on a dedicated rayon pool. When `false` frames are emitted in
    /// order on the calling thread, sharing one cache.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Sampling cache options, applied to every worker's cache.
    pub cache: PathCacheOpts,
}

impl Default for BatchRenderOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            cache: PathCacheOpts::from_env(),
        }
    }
}

/// Emit one [`RenderOutput`] per entry of `frames`, in parallel on the global rayon pool.
///
/// Each worker owns its own [`PathSamplingCache`]; output order follows `frames` and every
/// element equals what [`render_commands`](crate::render_commands) returns for that frame.
pub fn render_frames(
    ir: &AnimIr,
    registry: &PathRegistry,
    frames: &[f64],
    user_transform: Affine,
    toggles: &ToggleSet,
) -> Vec<RenderOutput> {
    let cache_opts = PathCacheOpts::from_env();
    par_render(ir, registry, frames, user_transform, toggles, cache_opts)
}

/// [`render_frames`] with explicit pool and cache options.
#[tracing::instrument(skip(ir, registry, frames, toggles), fields(frames = frames.len()))]
pub fn render_frames_with_opts(
    ir: &AnimIr,
    registry: &PathRegistry,
    frames: &[f64],
    user_transform: Affine,
    toggles: &ToggleSet,
    opts: &BatchRenderOpts,
) -> AnimirResult<Vec<RenderOutput>> {
    if !opts.parallel {
        let mut cache = PathSamplingCache::new(opts.cache);
        return Ok(frames
            .iter()
            .map(|&f| render_commands_with_cache(ir, registry, &mut cache, f, user_transform, toggles))
            .collect());
    }

    let pool = build_thread_pool(opts.threads)?;
    tracing::debug!(threads = pool.current_num_threads(), "batch render pool ready");
    Ok(pool.install(|| par_render(ir, registry, frames, user_transform, toggles, opts.cache)))
}

fn par_render(
    ir: &AnimIr,
    registry: &PathRegistry,
    frames: &[f64],
    user_transform: Affine,
    toggles: &ToggleSet,
    cache_opts: PathCacheOpts,
) -> Vec<RenderOutput> {
    frames
        .par_iter()
        .map_init(
            || PathSamplingCache::new(cache_opts),
            |cache, &f| render_commands_with_cache(ir, registry, cache, f, user_transform, toggles),
        )
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> AnimirResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AnimirError::validation(
            "batch render 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AnimirError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
