use super::*;
use crate::compile::compiler::{AssetIndex, compile};
use crate::foundation::core::{Point, Rect};
use crate::ir::model::{MatteMode, ROOT_COMP_ID};
use crate::render::extract::{extract_mask_scope, extract_matte_scope};
use crate::render::probe::probe_alpha;
use crate::render::validate::validate_commands;
use crate::scene::model::LottieScene;
use serde_json::json;

fn square(x: f64, y: f64, size: f64) -> serde_json::Value {
    json!([
        {"ty": "rc", "p": {"a": 0, "k": [x, y]}, "s": {"a": 0, "k": [size, size]}},
        {"ty": "fl", "c": {"a": 0, "k": [1, 0, 0, 1]}, "o": {"a": 0, "k": 100}}
    ])
}

fn triangle(offset: f64) -> serde_json::Value {
    json!({
        "a": 0,
        "k": {
            "v": [[offset, 0], [offset + 10.0, 0], [offset, 10]],
            "i": [[0, 0], [0, 0], [0, 0]],
            "o": [[0, 0], [0, 0], [0, 0]],
            "c": true
        }
    })
}

fn build(layers: serde_json::Value, assets: serde_json::Value) -> (AnimIr, PathRegistry) {
    let scene = LottieScene::from_json_value(json!({
        "w": 100, "h": 80, "fr": 30, "ip": 0, "op": 60,
        "assets": assets,
        "layers": layers
    }))
    .unwrap();
    let mut reg = PathRegistry::new();
    let key = scene.layers[0].nm.clone();
    let ir = compile(&scene, "anim", &key, &AssetIndex::new(), &mut reg).unwrap();
    (ir, reg)
}

fn render(ir: &AnimIr, reg: &PathRegistry, frame: f64, toggles: &ToggleSet) -> RenderOutput {
    render_commands(ir, reg, frame, Affine::IDENTITY, toggles)
}

fn group_names(cmds: &[RenderCommand]) -> Vec<&str> {
    cmds.iter()
        .filter_map(|c| match c {
            RenderCommand::BeginGroup { name } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

fn position_of(cmds: &[RenderCommand], group: &str) -> Option<usize> {
    cmds.iter()
        .position(|c| matches!(c, RenderCommand::BeginGroup { name } if name == group))
}

#[test]
fn toggle_set_defaults_to_enabled() {
    let mut t = ToggleSet::new();
    assert!(t.is_enabled("sparkle"));
    t.disable("sparkle");
    assert!(!t.is_enabled("sparkle"));
    t.enable("sparkle");
    assert!(t.is_enabled("sparkle"));
}

#[test]
fn frame_is_wrapped_in_user_transform_and_canvas_clip() {
    let (ir, reg) = build(json!([{"ind": 1, "ty": 4, "nm": "a", "shapes": square(10.0, 10.0, 4.0)}]), json!([]));
    let user = Affine::scale(2.0);
    let out = render_commands(&ir, &reg, 0.0, user, &ToggleSet::new());
    let cmds = &out.commands;
    assert_eq!(cmds[0], RenderCommand::PushTransform(user));
    assert_eq!(cmds[1], RenderCommand::PushClipRect(Rect::new(0.0, 0.0, 100.0, 80.0)));
    assert_eq!(cmds[cmds.len() - 2], RenderCommand::PopClipRect);
    assert_eq!(cmds[cmds.len() - 1], RenderCommand::PopTransform);
    assert!(out.issues.is_empty());
    assert!(validate_commands(cmds).is_empty());
}

#[test]
fn layers_draw_bottom_up() {
    let (ir, reg) = build(
        json!([
            {"ind": 1, "ty": 4, "nm": "top", "shapes": square(10.0, 10.0, 4.0)},
            {"ind": 2, "ty": 4, "nm": "bottom", "shapes": square(20.0, 20.0, 4.0)}
        ]),
        json!([]),
    );
    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    assert_eq!(group_names(&out.commands), vec!["layer:bottom", "layer:top"]);
}

#[test]
fn window_hidden_and_toggles_gate_layers() {
    let (ir, reg) = build(
        json!([
            {"ind": 1, "ty": 4, "nm": "windowed", "ip": 10, "op": 20, "shapes": square(10.0, 10.0, 4.0)},
            {"ind": 2, "ty": 4, "nm": "hidden", "hd": true, "shapes": square(10.0, 10.0, 4.0)},
            {"ind": 3, "ty": 4, "nm": "toggle:extra", "shapes": square(10.0, 10.0, 4.0)}
        ]),
        json!([]),
    );
    let on = ToggleSet::new();
    assert_eq!(group_names(&render(&ir, &reg, 5.0, &on).commands), vec!["layer:toggle:extra"]);
    assert_eq!(
        group_names(&render(&ir, &reg, 10.0, &on).commands),
        vec!["layer:toggle:extra", "layer:windowed"]
    );
    assert!(!group_names(&render(&ir, &reg, 20.0, &on).commands).contains(&"layer:windowed"));

    let mut off = ToggleSet::new();
    off.disable("extra");
    assert!(group_names(&render(&ir, &reg, 5.0, &off).commands).is_empty());
}

#[test]
fn parent_opacity_is_not_inherited() {
    let (ir, reg) = build(
        json!([
            {"ind": 1, "ty": 4, "nm": "child", "parent": 2, "shapes": square(10.0, 10.0, 4.0)},
            {"ind": 2, "ty": 3, "nm": "parent",
             "ks": {"p": {"a": 0, "k": [5, 5]}, "o": {"a": 0, "k": 0}}}
        ]),
        json!([]),
    );
    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    let draw = out
        .commands
        .iter()
        .find_map(|c| match c {
            RenderCommand::DrawShape { opacity, .. } => Some(*opacity),
            _ => None,
        })
        .unwrap();
    assert_eq!(draw, 1.0);
    let child = position_of(&out.commands, "layer:child").unwrap();
    assert_eq!(
        out.commands[child + 1],
        RenderCommand::PushTransform(Affine::translate((5.0, 5.0)))
    );
}

#[test]
fn unknown_parent_is_reported_but_drawn() {
    let (ir, reg) = build(
        json!([{"ind": 1, "ty": 4, "nm": "a", "parent": 42, "shapes": square(10.0, 10.0, 4.0)}]),
        json!([]),
    );
    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    assert_eq!(out.issues.len(), 1);
    assert_eq!(out.issues[0].kind, RenderIssueKind::UnknownParent);
    assert_eq!(out.issues[0].comp_id, ROOT_COMP_ID);
    assert!(out.commands.iter().any(RenderCommand::is_draw));
}

#[test]
fn masks_nest_in_reverse_inside_the_input_clip_pattern() {
    let (ir, reg) = build(
        json!([{
            "ind": 1, "ty": 4, "nm": "masked",
            "ks": {"p": {"a": 0, "k": [3, 4]}},
            "hasMask": true,
            "masksProperties": [
                {"nm": "m0", "mode": "a", "pt": triangle(0.0)},
                {"nm": "m1", "mode": "s", "pt": triangle(20.0)},
                {"nm": "m2", "mode": "i", "inv": true, "pt": triangle(40.0), "o": {"a": 0, "k": 50}}
            ],
            "shapes": square(10.0, 10.0, 4.0)
        }]),
        json!([]),
    );
    let authored: Vec<PathId> = ir
        .layer(ROOT_COMP_ID, 1)
        .unwrap()
        .masks
        .iter()
        .map(|m| m.path_id)
        .collect();
    assert_eq!(authored.len(), 3);

    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    let cmds = &out.commands;
    assert!(validate_commands(cmds).is_empty());

    let g = position_of(cmds, "layer:masked").unwrap();
    let world = Affine::translate((3.0, 4.0));
    assert_eq!(cmds[g + 1], RenderCommand::PushTransform(world));
    let emitted: Vec<PathId> = cmds[g + 2..g + 5]
        .iter()
        .map(|c| match c {
            RenderCommand::BeginMask { path_id, .. } => *path_id,
            other => panic!("expected BeginMask, got {other:?}"),
        })
        .collect();
    assert_eq!(emitted, authored.iter().rev().copied().collect::<Vec<_>>());
    assert_eq!(cmds[g + 5], RenderCommand::PushTransform(world.inverse()));

    let scope = extract_mask_scope(cmds, g + 2).unwrap();
    let recovered: Vec<PathId> = scope.ops_in_ae_order.iter().map(|o| o.path_id).collect();
    assert_eq!(recovered, authored);
    assert!(scope.ops_in_ae_order[2].inverted);
    assert_eq!(scope.ops_in_ae_order[2].opacity, 0.5);
}

#[test]
fn masks_without_area_are_skipped_and_reported() {
    let (ir, reg) = build(
        json!([{
            "ind": 1, "ty": 4, "nm": "plate",
            "masksProperties": [
                {"nm": "empty", "mode": "a", "pt": {"a": 0, "k": {"v": [], "i": [], "o": [], "c": true}}},
                {"nm": "flat", "mode": "a", "pt": {"a": 0, "k": {
                    "v": [[0, 0], [10, 10], [20, 20]],
                    "i": [[0, 0], [0, 0], [0, 0]],
                    "o": [[0, 0], [0, 0], [0, 0]],
                    "c": true
                }}}
            ],
            "shapes": square(50.0, 40.0, 80.0)
        }]),
        json!([]),
    );
    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    let cmds = &out.commands;
    assert!(validate_commands(cmds).is_empty());
    assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::BeginMask { .. })));

    let kinds: Vec<RenderIssueKind> = out.issues.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![RenderIssueKind::DegenerateMask; 2]);
    assert!(out.issues[0].message.contains("\"empty\""));
    assert_eq!(out.issues[1].layer_id, Some(1));

    let mut cache = PathSamplingCache::new(PathCacheOpts::default());
    let alpha = probe_alpha(cmds, &reg, &mut cache, Point::new(50.0, 40.0));
    assert_eq!(alpha, 1.0);
}

#[test]
fn matte_source_draws_only_inside_its_scope() {
    let (ir, reg) = build(
        json!([
            {"ind": 1, "ty": 4, "nm": "src", "td": 1, "shapes": square(10.0, 10.0, 8.0)},
            {"ind": 2, "ty": 4, "nm": "dst", "tt": 2, "shapes": square(12.0, 12.0, 8.0)}
        ]),
        json!([]),
    );
    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    let cmds = &out.commands;
    assert!(validate_commands(cmds).is_empty());
    assert_eq!(
        group_names(cmds),
        vec!["matteSource", "layer:src", "matteConsumer", "layer:dst"]
    );

    let begin = cmds
        .iter()
        .position(|c| matches!(c, RenderCommand::BeginMatte { .. }))
        .unwrap();
    let scope = extract_matte_scope(cmds, begin).unwrap();
    assert_eq!(scope.mode, MatteMode::AlphaInverted);
    assert!(group_names(&cmds[scope.source.clone()]).contains(&"layer:src"));
    assert_eq!(group_names(&cmds[scope.consumer.clone()]), vec!["layer:dst"]);
}

#[test]
fn precomp_pushes_container_transform_and_clip() {
    let (ir, reg) = build(
        json!([{
            "ind": 1, "ty": 0, "nm": "container", "refId": "inner", "w": 40, "h": 30,
            "ks": {"p": {"a": 0, "k": [10, 0]}, "o": {"a": 0, "k": 50}}
        }]),
        json!([{"id": "inner", "layers": [{"ind": 1, "ty": 4, "nm": "leaf", "shapes": square(5.0, 5.0, 2.0)}]}]),
    );
    let out = render(&ir, &reg, 0.0, &ToggleSet::new());
    let cmds = &out.commands;
    assert!(validate_commands(cmds).is_empty());

    let g = position_of(cmds, "layer:container").unwrap();
    assert_eq!(cmds[g + 1], RenderCommand::PushTransform(Affine::translate((10.0, 0.0))));
    assert_eq!(cmds[g + 2], RenderCommand::PushClipRect(Rect::new(0.0, 0.0, 40.0, 30.0)));
    assert_eq!(
        cmds[g + 3],
        RenderCommand::BeginGroup {
            name: "layer:leaf".to_owned()
        }
    );
    let opacity = cmds
        .iter()
        .find_map(|c| match c {
            RenderCommand::DrawShape { opacity, .. } => Some(*opacity),
            _ => None,
        })
        .unwrap();
    assert!((opacity - 0.5).abs() < 1e-12);
}

#[test]
fn emission_is_deterministic() {
    let (ir, reg) = build(
        json!([
            {"ind": 1, "ty": 4, "nm": "src", "td": 1, "shapes": square(10.0, 10.0, 8.0)},
            {"ind": 2, "ty": 4, "nm": "dst", "tt": 1, "shapes": square(12.0, 12.0, 8.0)}
        ]),
        json!([]),
    );
    let a = render(&ir, &reg, 3.0, &ToggleSet::new());
    let b = render(&ir, &reg, 3.0, &ToggleSet::new());
    assert_eq!(a, b);
}
