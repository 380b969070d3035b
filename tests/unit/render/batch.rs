use super::*;
use crate::compile::compiler::{AssetIndex, compile};
use crate::render::emitter::render_commands;
use crate::scene::model::LottieScene;
use serde_json::json;

fn fixture() -> (AnimIr, PathRegistry) {
    let scene = LottieScene::from_json_value(json!({
        "w": 64, "h": 64, "fr": 30, "ip": 0, "op": 30,
        "layers": [{
            "ind": 1, "ty": 4, "nm": "dot",
            "ks": {"p": {"a": 1, "k": [{"t": 0, "s": [0, 0]}, {"t": 30, "s": [60, 30]}]}},
            "shapes": [
                {"ty": "el", "p": {"a": 0, "k": [0, 0]},
                 "s": {"a": 1, "k": [{"t": 0, "s": [4, 4]}, {"t": 30, "s": [12, 12]}]}},
                {"ty": "st", "c": {"a": 0, "k": [0, 0, 1, 1]}, "w": {"a": 0, "k": 2}}
            ]
        }]
    }))
    .unwrap();
    let mut reg = PathRegistry::new();
    let ir = compile(&scene, "anim", "dot", &AssetIndex::new(), &mut reg).unwrap();
    (ir, reg)
}

#[test]
fn parallel_batch_matches_single_frames_in_order() {
    let (ir, reg) = fixture();
    let frames: Vec<f64> = (0..24).map(|f| f as f64 * 1.25).collect();
    let toggles = ToggleSet::new();
    let batch = render_frames(&ir, &reg, &frames, Affine::IDENTITY, &toggles);
    assert_eq!(batch.len(), frames.len());
    for (out, &f) in batch.iter().zip(&frames) {
        assert_eq!(*out, render_commands(&ir, &reg, f, Affine::IDENTITY, &toggles));
    }
}

#[test]
fn dedicated_pool_and_sequential_paths_agree() {
    let (ir, reg) = fixture();
    let frames = [0.0, 7.5, 15.0, 29.0];
    let toggles = ToggleSet::new();
    let pooled = render_frames_with_opts(
        &ir,
        &reg,
        &frames,
        Affine::IDENTITY,
        &toggles,
        &BatchRenderOpts {
            threads: Some(2),
            ..BatchRenderOpts::default()
        },
    )
    .unwrap();
    let sequential = render_frames_with_opts(
        &ir,
        &reg,
        &frames,
        Affine::IDENTITY,
        &toggles,
        &BatchRenderOpts {
            parallel: false,
            ..BatchRenderOpts::default()
        },
    )
    .unwrap();
    assert_eq!(pooled, sequential);
}

#[test]
fn zero_threads_is_rejected() {
    let (ir, reg) = fixture();
    let err = render_frames_with_opts(
        &ir,
        &reg,
        &[0.0],
        Affine::IDENTITY,
        &ToggleSet::new(),
        &BatchRenderOpts {
            threads: Some(0),
            ..BatchRenderOpts::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, AnimirError::Validation(_)));
}
