use super::*;
use crate::ir::model::LayerKind;
use serde_json::json;

fn scene(layers: serde_json::Value, assets: serde_json::Value) -> LottieScene {
    LottieScene::from_json_value(json!({
        "w": 100, "h": 100, "fr": 30, "ip": 0, "op": 60,
        "assets": assets,
        "layers": layers
    }))
    .unwrap()
}

fn compile_default(s: &LottieScene, key: &str) -> AnimirResult<AnimIr> {
    let mut reg = PathRegistry::new();
    compile(s, "anim", key, &AssetIndex::new(), &mut reg)
}

#[test]
fn toggle_ids_need_prefix_and_identifier() {
    assert_eq!(toggle_id("toggle:sparkle", "toggle:").as_deref(), Some("sparkle"));
    assert_eq!(toggle_id("toggle:", "toggle:"), None);
    assert_eq!(toggle_id("sparkle", "toggle:"), None);
    assert_eq!(toggle_id("toggle:x", ""), None);
}

#[test]
fn layers_without_index_get_negative_ids() {
    let ls: Vec<LayerDef> =
        serde_json::from_value(json!([{"ty": 3, "nm": "a"}, {"ind": 4, "ty": 3, "nm": "b"}])).unwrap();
    assert_eq!(layer_ids("c", &ls), vec![-1, 4]);
}

#[test]
fn binding_searches_root_before_precomps() {
    let s = scene(
        json!([
            {"ind": 1, "ty": 0, "nm": "container", "refId": "comp_a"},
            {"ind": 2, "ty": 3, "nm": "avatar"}
        ]),
        json!([{"id": "comp_a", "layers": [{"ind": 1, "ty": 3, "nm": "avatar"}]}]),
    );
    let ir = compile_default(&s, "avatar").unwrap();
    assert_eq!(ir.binding.comp_id, ROOT_COMP_ID);
    assert_eq!(ir.binding.layer_id, 2);

    let ir = compile_default(&s, "container").unwrap();
    assert_eq!(ir.comp("comp_a").unwrap().layers.len(), 1);
    assert_eq!(
        ir.layer(ROOT_COMP_ID, 1).map(|l| l.kind()),
        Some(LayerKind::Precomp)
    );
}

#[test]
fn missing_binding_is_fatal() {
    let s = scene(json!([{"ind": 1, "ty": 3, "nm": "a"}]), json!([]));
    let err = compile_default(&s, "nope").unwrap_err();
    assert!(matches!(err, AnimirError::BindingLayerNotFound { .. }));
}

#[test]
fn precomp_errors_are_fatal() {
    let s = scene(
        json!([{"ind": 1, "ty": 0, "nm": "c", "refId": "missing"}]),
        json!([]),
    );
    assert!(matches!(
        compile_default(&s, "c").unwrap_err(),
        AnimirError::PrecompNotFound { .. }
    ));

    let s = scene(
        json!([{"ind": 1, "ty": 0, "nm": "c", "refId": "a"}]),
        json!([
            {"id": "a", "layers": [{"ind": 1, "ty": 0, "nm": "to_b", "refId": "b"}]},
            {"id": "b", "layers": [{"ind": 1, "ty": 0, "nm": "to_a", "refId": "a"}]}
        ]),
    );
    assert!(matches!(
        compile_default(&s, "c").unwrap_err(),
        AnimirError::PrecompCycle { .. }
    ));
}

#[test]
fn image_assets_are_namespaced_and_resolved() {
    let s = scene(
        json!([{"ind": 1, "ty": 2, "nm": "img", "refId": "image_0"}]),
        json!([{"id": "image_0", "w": 32, "h": 16, "u": "images/", "p": "a.png"}]),
    );
    let mut reg = PathRegistry::new();
    let ir = compile(&s, "hero", "img", &AssetIndex::new(), &mut reg).unwrap();
    assert_eq!(ir.assets.images["hero|image_0"].path, "images/a.png");

    let mut index = AssetIndex::new();
    index.insert("image_0", "/cache/a.png");
    let ir = compile(&s, "hero", "img", &index, &mut reg).unwrap();
    assert_eq!(ir.assets.images["hero|image_0"].path, "/cache/a.png");
    let LayerContent::Image { width, height, .. } = &ir.layer(ROOT_COMP_ID, 1).unwrap().content
    else {
        panic!("expected image content");
    };
    assert_eq!((*width, *height), (32.0, 16.0));
}

#[test]
fn none_masks_are_dropped_and_others_keep_order() {
    let path = json!({"a": 0, "k": {"v": [[0,0],[1,0],[1,1]], "i": [[0,0],[0,0],[0,0]], "o": [[0,0],[0,0],[0,0]], "c": true}});
    let s = scene(
        json!([{
            "ind": 1, "ty": 3, "nm": "m", "hasMask": true,
            "masksProperties": [
                {"mode": "i", "pt": path.clone(), "o": {"a": 0, "k": 50}},
                {"mode": "n", "pt": path.clone()},
                {"mode": "s", "inv": true, "pt": path}
            ]
        }]),
        json!([]),
    );
    let ir = compile_default(&s, "m").unwrap();
    let masks = &ir.layer(ROOT_COMP_ID, 1).unwrap().masks;
    assert_eq!(masks.len(), 2);
    assert_eq!(masks[0].mode, MaskMode::Intersect);
    assert!((masks[0].opacity.sample(0.0) - 0.5).abs() < 1e-12);
    assert_eq!(masks[1].mode, MaskMode::Subtract);
    assert!(masks[1].inverted);
    // Identical outlines share one registry entry.
    assert_eq!(masks[0].path_id, masks[1].path_id);
}
