//! Scope extraction for consumers of a command stream.
//!
//! The emitter nests all masks of one layer as consecutive LIFO scopes, last authored mask
//! outermost. Readers that need the masks in authoring order (to run the combine fold) go
//! through [`extract_mask_scope`], which undoes that ordering in one place.

use crate::ir::model::{MaskMode, MatteMode};
use crate::paths::registry::PathId;
use crate::render::command::RenderCommand;
use std::ops::Range;

/// One mask of a mask scope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskOp {
    /// Combine mode.
    pub mode: MaskMode,
    /// Inverted coverage.
    pub inverted: bool,
    /// Outline.
    pub path_id: PathId,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Sampling frame.
    pub frame: f64,
}

/// A layer's mask stack extracted from a command stream.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskScope {
    /// Masks in authoring order.
    pub ops_in_ae_order: Vec<MaskOp>,
    /// Commands between the last `BeginMask` and the first matching `EndMask`.
    pub inner: Range<usize>,
    /// Index just past the last matching `EndMask`.
    pub end: usize,
}

/// A track matte scope extracted from a command stream.
#[derive(Clone, Debug, PartialEq)]
pub struct MatteScope {
    /// Matte mode.
    pub mode: MatteMode,
    /// Commands inside the `matteSource` group.
    pub source: Range<usize>,
    /// Commands inside the `matteConsumer` group.
    pub consumer: Range<usize>,
    /// Index just past the matching `EndMatte`.
    pub end: usize,
}

/// Extract the mask stack starting at `start`.
///
/// `None` when `start` is out of range, is not a `BeginMask`, or the stack is not closed by the
/// same number of consecutive `EndMask`s.
pub fn extract_mask_scope(commands: &[RenderCommand], start: usize) -> Option<MaskScope> {
    let mut ops = Vec::new();
    let mut i = start;
    while let Some(RenderCommand::BeginMask {
        mode,
        inverted,
        path_id,
        opacity,
        frame,
    }) = commands.get(i)
    {
        ops.push(MaskOp {
            mode: *mode,
            inverted: *inverted,
            path_id: *path_id,
            opacity: *opacity,
            frame: *frame,
        });
        i += 1;
    }
    if ops.is_empty() {
        return None;
    }

    let inner_start = i;
    let mut depth = Depths::default();
    let inner_end = loop {
        let cmd = commands.get(i)?;
        if matches!(cmd, RenderCommand::EndMask) && depth.is_zero() {
            break i;
        }
        depth.step(cmd)?;
        i += 1;
    };

    let end = inner_end + ops.len();
    let closes = commands.get(inner_end..end)?;
    if !closes.iter().all(|c| matches!(c, RenderCommand::EndMask)) {
        return None;
    }

    ops.reverse();
    Some(MaskScope {
        ops_in_ae_order: ops,
        inner: inner_start..inner_end,
        end,
    })
}

/// Extract the matte scope starting at `start`.
///
/// `None` when `start` is not a `BeginMatte` or the scope does not have the
/// `matteSource` / `matteConsumer` group layout.
pub fn extract_matte_scope(commands: &[RenderCommand], start: usize) -> Option<MatteScope> {
    let RenderCommand::BeginMatte { mode } = commands.get(start)? else {
        return None;
    };
    let source = named_group(commands, start + 1, "matteSource")?;
    let consumer = named_group(commands, source.end + 1, "matteConsumer")?;
    if !matches!(commands.get(consumer.end + 1)?, RenderCommand::EndMatte) {
        return None;
    }
    Some(MatteScope {
        mode: *mode,
        end: consumer.end + 2,
        source,
        consumer,
    })
}

/// Inner range of the group opened at `open` with the given name.
fn named_group(commands: &[RenderCommand], open: usize, name: &str) -> Option<Range<usize>> {
    match commands.get(open)? {
        RenderCommand::BeginGroup { name: n } if n == name => {}
        _ => return None,
    }
    let mut depth = Depths::default();
    let mut i = open + 1;
    loop {
        let cmd = commands.get(i)?;
        if matches!(cmd, RenderCommand::EndGroup) && depth.is_zero() {
            return Some(open + 1..i);
        }
        depth.step(cmd)?;
        i += 1;
    }
}

/// One depth counter per scope kind.
#[derive(Default)]
struct Depths {
    mask: usize,
    matte: usize,
    group: usize,
}

impl Depths {
    fn is_zero(&self) -> bool {
        self.mask == 0 && self.matte == 0 && self.group == 0
    }

    /// Track `cmd`; `None` when it closes a scope that was opened outside the range.
    fn step(&mut self, cmd: &RenderCommand) -> Option<()> {
        match cmd {
            RenderCommand::BeginMask { .. } => self.mask += 1,
            RenderCommand::EndMask => self.mask = self.mask.checked_sub(1)?,
            RenderCommand::BeginMatte { .. } => self.matte += 1,
            RenderCommand::EndMatte => self.matte = self.matte.checked_sub(1)?,
            RenderCommand::BeginGroup { .. } => self.group += 1,
            RenderCommand::EndGroup => self.group = self.group.checked_sub(1)?,
            _ => {}
        }
        Some(())
    }
}

/// Initial coverage of the mask combine fold, chosen by the first authored mask.
///
/// Additive first masks (`add`, `lighten`, `difference`) start from nothing; subtractive ones
/// (`subtract`, `intersect`, `darken`) start from full coverage. A layer without masks is fully
/// visible.
pub fn mask_accumulator_seed(ops: &[MaskOp]) -> f64 {
    match ops.first().map(|op| op.mode) {
        None => 1.0,
        Some(MaskMode::Add | MaskMode::Lighten | MaskMode::Difference) => 0.0,
        Some(MaskMode::Subtract | MaskMode::Intersect | MaskMode::Darken) => 1.0,
    }
}

/// Fold raw per-mask path coverages (in authoring order) into the layer's mask coverage.
///
/// Each coverage is inverted and scaled by opacity according to its op before combining.
pub fn combine_mask_coverage(ops: &[MaskOp], coverages: &[f64]) -> f64 {
    let mut acc = mask_accumulator_seed(ops);
    for (op, raw) in ops.iter().zip(coverages) {
        let c = raw.clamp(0.0, 1.0);
        let c = if op.inverted { 1.0 - c } else { c };
        let c = c * op.opacity.clamp(0.0, 1.0);
        acc = match op.mode {
            MaskMode::Add => acc + c - acc * c,
            MaskMode::Subtract => acc * (1.0 - c),
            MaskMode::Intersect => acc * c,
            MaskMode::Lighten => acc.max(c),
            MaskMode::Darken => acc.min(c),
            MaskMode::Difference => (acc - c).abs(),
        };
    }
    acc.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/extract.rs"]
mod tests;
