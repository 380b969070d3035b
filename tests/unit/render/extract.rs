use super::*;
use crate::foundation::core::Affine;

fn begin_mask(id: u32, mode: MaskMode) -> RenderCommand {
    RenderCommand::BeginMask {
        mode,
        inverted: false,
        path_id: PathId(id),
        opacity: 1.0,
        frame: 0.0,
    }
}

fn op(mode: MaskMode, inverted: bool, opacity: f64) -> MaskOp {
    MaskOp {
        mode,
        inverted,
        path_id: PathId(0),
        opacity,
        frame: 0.0,
    }
}

#[test]
fn lifo_masks_come_back_in_authoring_order() {
    let cmds = vec![
        RenderCommand::PushTransform(Affine::IDENTITY),
        begin_mask(2, MaskMode::Add),
        begin_mask(1, MaskMode::Subtract),
        begin_mask(0, MaskMode::Intersect),
        RenderCommand::PushTransform(Affine::IDENTITY),
        RenderCommand::PopTransform,
        RenderCommand::EndMask,
        RenderCommand::EndMask,
        RenderCommand::EndMask,
        RenderCommand::PopTransform,
    ];
    let scope = extract_mask_scope(&cmds, 1).unwrap();
    let ids: Vec<u32> = scope.ops_in_ae_order.iter().map(|o| o.path_id.0).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(scope.inner, 4..6);
    assert_eq!(scope.end, 9);
}

#[test]
fn nested_mask_stacks_are_skipped_by_depth() {
    let cmds = vec![
        begin_mask(0, MaskMode::Add),
        RenderCommand::BeginGroup {
            name: "layer:child".to_owned(),
        },
        begin_mask(5, MaskMode::Add),
        begin_mask(6, MaskMode::Add),
        RenderCommand::EndMask,
        RenderCommand::EndMask,
        RenderCommand::EndGroup,
        RenderCommand::EndMask,
    ];
    let scope = extract_mask_scope(&cmds, 0).unwrap();
    assert_eq!(scope.ops_in_ae_order.len(), 1);
    assert_eq!(scope.inner, 1..7);
    assert_eq!(scope.end, 8);
}

#[test]
fn invalid_starts_and_unmatched_ends_yield_none() {
    let cmds = vec![
        begin_mask(1, MaskMode::Add),
        begin_mask(0, MaskMode::Add),
        RenderCommand::EndMask,
    ];
    assert!(extract_mask_scope(&cmds, 0).is_none());
    assert!(extract_mask_scope(&cmds, 2).is_none());
    assert!(extract_mask_scope(&cmds, 99).is_none());
}

#[test]
fn matte_scope_splits_source_and_consumer() {
    let cmds = vec![
        RenderCommand::BeginMatte {
            mode: MatteMode::AlphaInverted,
        },
        RenderCommand::BeginGroup {
            name: "matteSource".to_owned(),
        },
        RenderCommand::BeginGroup {
            name: "layer:src".to_owned(),
        },
        RenderCommand::EndGroup,
        RenderCommand::EndGroup,
        RenderCommand::BeginGroup {
            name: "matteConsumer".to_owned(),
        },
        RenderCommand::EndGroup,
        RenderCommand::EndMatte,
    ];
    let scope = extract_matte_scope(&cmds, 0).unwrap();
    assert_eq!(scope.mode, MatteMode::AlphaInverted);
    assert_eq!(scope.source, 2..4);
    assert_eq!(scope.consumer, 6..6);
    assert_eq!(scope.end, 8);
    assert!(extract_matte_scope(&cmds, 1).is_none());
}

#[test]
fn accumulator_seed_follows_first_mask() {
    assert_eq!(mask_accumulator_seed(&[op(MaskMode::Add, false, 1.0)]), 0.0);
    assert_eq!(mask_accumulator_seed(&[op(MaskMode::Subtract, false, 1.0)]), 1.0);
    assert_eq!(mask_accumulator_seed(&[op(MaskMode::Intersect, false, 1.0)]), 1.0);
    assert_eq!(mask_accumulator_seed(&[]), 1.0);
}

#[test]
fn combine_fold_applies_modes_in_order() {
    // add(A) then subtract(B): inside A and outside B.
    let ops = [op(MaskMode::Add, false, 1.0), op(MaskMode::Subtract, false, 1.0)];
    assert_eq!(combine_mask_coverage(&ops, &[1.0, 0.0]), 1.0);
    assert_eq!(combine_mask_coverage(&ops, &[1.0, 1.0]), 0.0);
    assert_eq!(combine_mask_coverage(&ops, &[0.0, 0.0]), 0.0);

    // A lone subtract mask cuts a hole.
    let ops = [op(MaskMode::Subtract, false, 1.0)];
    assert_eq!(combine_mask_coverage(&ops, &[0.0]), 1.0);
    assert_eq!(combine_mask_coverage(&ops, &[1.0]), 0.0);

    // Inversion and opacity apply before combining.
    let ops = [op(MaskMode::Add, true, 0.5)];
    assert_eq!(combine_mask_coverage(&ops, &[0.0]), 0.5);
    assert_eq!(combine_mask_coverage(&ops, &[1.0]), 0.0);
}
