use super::*;
use crate::compile::compiler::{AssetIndex, compile};
use crate::foundation::core::Vec2;
use crate::paths::registry::PathRegistry;
use crate::scene::model::LottieScene;
use serde_json::json;

fn ir() -> AnimIr {
    let scene = LottieScene::from_json_value(json!({
        "w": 100, "h": 100, "fr": 30, "ip": 0, "op": 60,
        "assets": [
            {"id": "inner", "layers": [{"ind": 1, "ty": 3, "nm": "leaf"}]},
            {"id": "deep", "layers": [{"ind": 1, "ty": 3, "nm": "bottom"}]},
        ],
        "layers": [
            {"ind": 1, "ty": 0, "nm": "container", "refId": "inner", "st": 5, "w": 50, "h": 50,
             "ks": {"p": {"a": 0, "k": [10, 20]}, "o": {"a": 0, "k": 50}}},
            {"ind": 2, "ty": 3, "nm": "parent", "ks": {"p": {"a": 0, "k": [30, 0]}, "o": {"a": 0, "k": 0}}},
            {"ind": 3, "ty": 3, "nm": "child", "parent": 2, "ks": {"p": {"a": 0, "k": [1, 2]}}},
            {"ind": 4, "ty": 3, "nm": "orphan", "parent": 99},
        ]
    }))
    .unwrap();
    let mut reg = PathRegistry::new();
    compile(&scene, "anim", "child", &AssetIndex::new(), &mut reg).unwrap()
}

fn nested_ir() -> AnimIr {
    let scene = LottieScene::from_json_value(json!({
        "w": 100, "h": 100, "fr": 30, "ip": 0, "op": 60,
        "assets": [
            {"id": "outer", "layers": [
                {"ind": 1, "ty": 0, "nm": "inner_container", "refId": "inner", "st": 2,
                 "ks": {"p": {"a": 0, "k": [0, 7]}, "o": {"a": 0, "k": 50}}}
            ]},
            {"id": "inner", "layers": [{"ind": 1, "ty": 3, "nm": "leaf"}]},
        ],
        "layers": [
            {"ind": 1, "ty": 0, "nm": "outer_container", "refId": "outer", "st": 3,
             "ks": {"p": {"a": 0, "k": [5, 0]}, "o": {"a": 0, "k": 50}}}
        ]
    }))
    .unwrap();
    let mut reg = PathRegistry::new();
    compile(&scene, "anim", "leaf", &AssetIndex::new(), &mut reg).unwrap()
}

#[test]
fn parent_chain_composes_transforms() {
    let ir = ir();
    let root = ir.root().unwrap();
    let child = root.layer(3).unwrap();
    let w = layer_world(root, child, 0.0);
    assert_eq!(w.broken_parent, None);
    assert_eq!(w.transform.translation(), Vec2::new(31.0, 2.0));
}

#[test]
fn unknown_parent_is_reported_and_cut() {
    let ir = ir();
    let root = ir.root().unwrap();
    let orphan = root.layer(4).unwrap();
    let w = layer_world(root, orphan, 0.0);
    assert_eq!(w.broken_parent, Some(99));
    assert_eq!(w.transform, Affine::IDENTITY);
}

#[test]
fn root_chain_is_identity() {
    let ir = ir();
    let space = precomp_chain(&ir, ROOT_COMP_ID, 12.0).unwrap();
    assert_eq!(space, ContainerSpace::root(12.0));
}

#[test]
fn container_shifts_time_and_carries_opacity() {
    let ir = ir();
    let space = precomp_chain(&ir, "inner", 12.0).unwrap();
    assert_eq!(space.transform.translation(), Vec2::new(10.0, 20.0));
    assert_eq!(space.local_frame, 7.0);
    assert!((space.opacity - 0.5).abs() < 1e-12);

    // Same step the emitter takes from the root.
    let root = ir.root().unwrap();
    let direct = container_space(&ContainerSpace::root(12.0), root, root.layer(1).unwrap());
    assert_eq!(direct, space);
}

#[test]
fn nested_containers_concatenate_parent_first() {
    let ir = nested_ir();
    let space = precomp_chain(&ir, "inner", 10.0).unwrap();
    assert_eq!(space.transform.translation(), Vec2::new(5.0, 7.0));
    assert_eq!(space.local_frame, 5.0);
    assert!((space.opacity - 0.25).abs() < 1e-12);
}

#[test]
fn unreferenced_or_unknown_comps_have_no_chain() {
    let ir = ir();
    assert!(precomp_chain(&ir, "deep", 0.0).is_none());
    assert!(precomp_chain(&ir, "nope", 0.0).is_none());
}
