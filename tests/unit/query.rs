use super::*;
use crate::compile::compiler::{AssetIndex, compile};
use crate::foundation::core::Vec2;
use crate::ir::model::ROOT_COMP_ID;
use crate::render::command::RenderCommand;
use crate::render::emitter::render_commands;
use crate::scene::model::LottieScene;
use serde_json::json;

fn square(x: f64, y: f64, size: f64) -> serde_json::Value {
    json!([
        {"ty": "rc", "p": {"a": 0, "k": [x, y]}, "s": {"a": 0, "k": [size, size]}},
        {"ty": "fl", "c": {"a": 0, "k": [0, 1, 0, 1]}}
    ])
}

fn fixture() -> (AnimIr, PathRegistry) {
    let scene = LottieScene::from_json_value(json!({
        "w": 200, "h": 200, "fr": 30, "ip": 0, "op": 60,
        "assets": [{"id": "inner", "layers": [
            {"ind": 1, "ty": 4, "nm": "leaf", "ks": {"p": {"a": 0, "k": [1, 1]}}, "shapes": square(5.0, 5.0, 10.0)}
        ]}],
        "layers": [
            {"ind": 1, "ty": 4, "nm": "top", "ks": {"p": {"a": 0, "k": [10, 20]}}, "shapes": square(5.0, 5.0, 10.0)},
            {"ind": 2, "ty": 4, "nm": "toggle:grouped", "shapes": [
                {"ty": "gr", "it": [
                    {"ty": "rc", "p": {"a": 0, "k": [0, 0]}, "s": {"a": 0, "k": [4, 4]}},
                    {"ty": "fl", "c": {"a": 0, "k": [1, 1, 1, 1]}},
                    {"ty": "tr", "p": {"a": 0, "k": [150, 150]}}
                ]}
            ]},
            {"ind": 3, "ty": 0, "nm": "container", "refId": "inner", "w": 50, "h": 50,
             "ks": {"p": {"a": 0, "k": [100, 0]}}},
            {"ind": 4, "ty": 4, "nm": "bottom", "shapes": square(15.0, 25.0, 30.0)}
        ]
    }))
    .unwrap();
    let mut reg = PathRegistry::new();
    let ir = compile(&scene, "anim", "leaf", &AssetIndex::new(), &mut reg).unwrap();
    (ir, reg)
}

fn approx(a: Rect, b: Rect) -> bool {
    [(a.x0, b.x0), (a.y0, b.y0), (a.x1, b.x1), (a.y1, b.y1)]
        .iter()
        .all(|(x, y)| (x - y).abs() < 1e-6)
}

#[test]
fn world_transform_includes_container_and_user() {
    let (ir, _) = fixture();
    let m = layer_world_transform(&ir, "inner", 1, 0.0, Affine::IDENTITY).unwrap();
    assert_eq!(m.translation(), Vec2::new(101.0, 1.0));

    let m = layer_world_transform(&ir, "inner", 1, 0.0, Affine::scale(2.0)).unwrap();
    assert_eq!(m * Point::ORIGIN, Point::new(202.0, 2.0));

    assert!(layer_world_transform(&ir, "inner", 9, 0.0, Affine::IDENTITY).is_none());
    assert!(layer_world_transform(&ir, "nope", 1, 0.0, Affine::IDENTITY).is_none());
}

#[test]
fn world_transform_matches_the_emitted_stack() {
    let (ir, reg) = fixture();
    let user = Affine::translate((3.0, 4.0));
    let out = render_commands(&ir, &reg, 0.0, user, &ToggleSet::new());

    let start = out
        .commands
        .iter()
        .position(|c| matches!(c, RenderCommand::BeginGroup { name } if name == "layer:leaf"))
        .unwrap();
    let mut stack = vec![Affine::IDENTITY];
    for cmd in &out.commands {
        match cmd {
            RenderCommand::PushTransform(m) => {
                let top = *stack.last().unwrap();
                stack.push(top * *m);
            }
            RenderCommand::PopTransform => {
                stack.pop();
            }
            _ => {}
        }
    }
    assert_eq!(stack, vec![Affine::IDENTITY]);

    let mut stack = vec![Affine::IDENTITY];
    let mut at_draw = None;
    for (i, cmd) in out.commands.iter().enumerate() {
        match cmd {
            RenderCommand::PushTransform(m) => {
                let top = *stack.last().unwrap();
                stack.push(top * *m);
            }
            RenderCommand::PopTransform => {
                stack.pop();
            }
            RenderCommand::DrawShape { .. } if i > start => {
                at_draw = stack.last().copied();
                break;
            }
            _ => {}
        }
    }
    let expected = layer_world_transform(&ir, "inner", 1, 0.0, user).unwrap();
    assert!(at_draw.unwrap().approx_eq(expected));
}

#[test]
fn group_transform_is_applied_after_the_layer() {
    let (ir, _) = fixture();
    let m = shape_group_world_transform(&ir, ROOT_COMP_ID, 2, &[0], 0.0, Affine::IDENTITY).unwrap();
    assert_eq!(m.translation(), Vec2::new(150.0, 150.0));
    let root = shape_group_world_transform(&ir, ROOT_COMP_ID, 2, &[], 0.0, Affine::IDENTITY).unwrap();
    assert_eq!(root, Affine::IDENTITY);
    assert!(shape_group_world_transform(&ir, ROOT_COMP_ID, 2, &[7], 0.0, Affine::IDENTITY).is_none());
    assert!(shape_group_world_transform(&ir, ROOT_COMP_ID, 3, &[], 0.0, Affine::IDENTITY).is_none());
}

#[test]
fn bounds_cover_content_in_root_space() {
    let (ir, reg) = fixture();
    let b = layer_bounds(&ir, &reg, ROOT_COMP_ID, 1, 0.0, Affine::IDENTITY).unwrap();
    assert!(approx(b, Rect::new(10.0, 20.0, 20.0, 30.0)), "{b:?}");

    let b = layer_bounds(&ir, &reg, ROOT_COMP_ID, 2, 0.0, Affine::IDENTITY).unwrap();
    assert!(approx(b, Rect::new(148.0, 148.0, 152.0, 152.0)), "{b:?}");

    let b = layer_bounds(&ir, &reg, ROOT_COMP_ID, 3, 0.0, Affine::IDENTITY).unwrap();
    assert!(approx(b, Rect::new(100.0, 0.0, 150.0, 50.0)), "{b:?}");

    let b = layer_bounds(&ir, &reg, "inner", 1, 0.0, Affine::IDENTITY).unwrap();
    assert!(approx(b, Rect::new(101.0, 1.0, 111.0, 11.0)), "{b:?}");
}

#[test]
fn hit_test_finds_topmost_innermost_layer() {
    let (ir, reg) = fixture();
    let on = ToggleSet::new();
    let hit = |p: Point, t: &ToggleSet| hit_test(&ir, &reg, 0.0, Affine::IDENTITY, t, p);

    // "top" overlaps "bottom" here.
    assert_eq!(
        hit(Point::new(15.0, 25.0), &on),
        Some(HitResult {
            comp_id: ROOT_COMP_ID.to_owned(),
            layer_id: 1
        })
    );
    assert_eq!(hit(Point::new(2.0, 12.0), &on).map(|h| h.layer_id), Some(4));
    assert_eq!(
        hit(Point::new(105.0, 5.0), &on),
        Some(HitResult {
            comp_id: "inner".to_owned(),
            layer_id: 1
        })
    );
    assert_eq!(hit(Point::new(150.0, 150.0), &on).map(|h| h.layer_id), Some(2));
    assert_eq!(hit(Point::new(190.0, 10.0), &on), None);

    let mut off = ToggleSet::new();
    off.disable("grouped");
    assert_eq!(hit(Point::new(150.0, 150.0), &off), None);
}
