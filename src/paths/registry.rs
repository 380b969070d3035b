//! Scene-shared path storage.
//!
//! A [`PathRegistry`] is shared by every animation compiled into one scene. Paths are append-only
//! and identified by [`PathId`]; the registry's `generation_id` is unique for the whole process,
//! so `(generation_id, path_id)` never collides across registries even though path ids restart
//! at zero in each one.

use crate::animation::anim::{AnimatedValue, Keyframe, KeyframeSpan, locate};
use crate::foundation::hash::{Fingerprint128, StableHasher};
use crate::foundation::quantize::{CACHE_FRAME_STEP, COORD_STEP};
use crate::geometry::ease::EaseCurve;
use crate::geometry::path::BezierPath;
use crate::paths::tessellate::{triangulate, vertex_buffer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Path identifier, unique within one [`PathRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub u32);

/// Keyframe payload of a path resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PathShape {
    /// Source outline.
    pub path: BezierPath,
    /// Flattened outline as interleaved `x, y`.
    pub vertices: Vec<f32>,
}

/// Registered path: keyframed outline plus tessellation.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResource {
    /// Id within the owning registry.
    pub path_id: PathId,
    /// Keyframes sorted by time; a static path has exactly one.
    pub keyframes: Vec<Keyframe<PathShape>>,
    /// Triangle indices into each keyframe's vertex buffer (empty for open paths).
    pub indices: Vec<u32>,
    /// Vertices per keyframe buffer.
    pub vertex_count: usize,
}

impl PathResource {
    fn build(path_id: PathId, value: &AnimatedValue<BezierPath>) -> Option<Self> {
        let keys: Vec<Keyframe<BezierPath>> = match value {
            AnimatedValue::Static(p) => vec![Keyframe {
                time: 0.0,
                value: p.clone(),
                hold: false,
                ease: None,
            }],
            AnimatedValue::Keyframed(keys) => keys.clone(),
        };
        let first = &keys.first()?.value;
        if !first.is_well_formed()
            || keys
                .iter()
                .any(|k| !k.value.is_well_formed() || !k.value.is_compatible_with(first))
        {
            return None;
        }

        let keyframes: Vec<Keyframe<PathShape>> = keys
            .into_iter()
            .map(|k| Keyframe {
                time: k.time,
                value: PathShape {
                    vertices: vertex_buffer(&k.value),
                    path: k.value,
                },
                hold: k.hold,
                ease: k.ease,
            })
            .collect();
        let indices = triangulate(&keyframes[0].value.path);
        let vertex_count = keyframes[0].value.vertices.len() / 2;
        Some(Self {
            path_id,
            keyframes,
            indices,
            vertex_count,
        })
    }

    /// `true` when the outline changes over time.
    pub fn is_animated(&self) -> bool {
        self.keyframes.len() > 1
    }

    /// Outline at `frame`. `None` when adjacent keyframes cannot be blended.
    pub fn sample(&self, frame: f64) -> Option<BezierPath> {
        match locate(&self.keyframes, frame)? {
            KeyframeSpan::At(i) => Some(self.keyframes[i].value.path.clone()),
            KeyframeSpan::Between { from, t } => self.keyframes[from]
                .value
                .path
                .interpolated(&self.keyframes[from + 1].value.path, t),
        }
    }

    /// Vertex buffer at `frame`, blended between keyframe buffers.
    pub fn sample_vertices(&self, frame: f64) -> Option<Vec<f32>> {
        match locate(&self.keyframes, frame)? {
            KeyframeSpan::At(i) => Some(self.keyframes[i].value.vertices.clone()),
            KeyframeSpan::Between { from, t } => {
                let a = &self.keyframes[from].value.vertices;
                let b = &self.keyframes[from + 1].value.vertices;
                if a.len() != b.len() {
                    return None;
                }
                let t = t as f32;
                Some(a.iter().zip(b).map(|(a, b)| a + (b - a) * t).collect())
            }
        }
    }
}

/// Append-only path store tagged with a process-unique generation id.
#[derive(Debug)]
pub struct PathRegistry {
    generation_id: u64,
    paths: Vec<PathResource>,
    by_content: HashMap<Fingerprint128, PathId>,
}

impl Default for PathRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PathRegistry {
    /// Create an empty registry with a fresh generation id.
    pub fn new() -> Self {
        let generation_id = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(generation_id, "path registry created");
        Self {
            generation_id,
            paths: Vec::new(),
            by_content: HashMap::new(),
        }
    }

    /// Process-unique id of this registry.
    pub fn generation_id(&self) -> u64 {
        self.generation_id
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// `true` when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Register an outline, returning the id of an identical existing entry when there is one.
    ///
    /// Returns `None` when keyframes disagree in topology or a path is malformed.
    pub fn register(&mut self, value: &AnimatedValue<BezierPath>) -> Option<PathId> {
        let key = content_fingerprint(value);
        if let Some(id) = self.by_content.get(&key) {
            return Some(*id);
        }
        let path_id = PathId(u32::try_from(self.paths.len()).ok()?);
        let resource = PathResource::build(path_id, value)?;
        tracing::debug!(
            generation_id = self.generation_id,
            path_id = path_id.0,
            keyframes = resource.keyframes.len(),
            "path registered"
        );
        self.paths.push(resource);
        self.by_content.insert(key, path_id);
        Some(path_id)
    }

    /// Resource by id.
    pub fn get(&self, id: PathId) -> Option<&PathResource> {
        self.paths.get(id.0 as usize)
    }

    /// Outline of `id` at `frame`.
    pub fn sample(&self, id: PathId, frame: f64) -> Option<BezierPath> {
        self.get(id)?.sample(frame)
    }

    /// All resources in id order.
    pub fn iter(&self) -> impl Iterator<Item = &PathResource> {
        self.paths.iter()
    }
}

fn content_fingerprint(value: &AnimatedValue<BezierPath>) -> Fingerprint128 {
    let mut h = StableHasher::new();
    match value {
        AnimatedValue::Static(p) => {
            h.write_u8(0);
            write_path(&mut h, p);
        }
        AnimatedValue::Keyframed(keys) => {
            h.write_u8(1);
            h.write_len(keys.len());
            for k in keys {
                h.write_quantized(k.time, CACHE_FRAME_STEP);
                h.write_bool(k.hold);
                write_ease(&mut h, k.ease);
                write_path(&mut h, &k.value);
            }
        }
    }
    h.finish()
}

fn write_ease(h: &mut StableHasher, ease: Option<EaseCurve>) {
    match ease {
        None => h.write_u8(0),
        Some(e) => {
            h.write_u8(1);
            for v in [e.out_x, e.out_y, e.in_x, e.in_y] {
                h.write_quantized(v, COORD_STEP);
            }
        }
    }
}

fn write_path(h: &mut StableHasher, p: &BezierPath) {
    h.write_bool(p.closed);
    h.write_len(p.vertices.len());
    h.write_len(p.in_tangents.len());
    h.write_len(p.out_tangents.len());
    for v in &p.vertices {
        h.write_point(*v);
    }
    for t in p.in_tangents.iter().chain(&p.out_tangents) {
        h.write_point(t.to_point());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paths/registry.rs"]
mod tests;
