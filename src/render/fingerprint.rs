use crate::foundation::core::Rgba;
use crate::foundation::hash::{Fingerprint128, StableHasher};
use crate::foundation::quantize::{CACHE_FRAME_STEP, COORD_STEP, STROKE_WIDTH_STEP};
use crate::ir::model::{MaskMode, MatteMode};
use crate::render::command::RenderCommand;

/// Fingerprint of a command stream.
pub type CommandFingerprint = Fingerprint128;

// Opacities and color channels live in [0, 1]; 1/1024 keeps them well above the nearly-equal
// epsilon.
const UNIT_STEP: f64 = COORD_STEP;

/// Hash a command stream over quantized values.
///
/// Streams that differ only by float noise below the quantization steps hash equal.
pub fn fingerprint_commands(commands: &[RenderCommand]) -> CommandFingerprint {
    let mut h = StableHasher::new();
    h.write_len(commands.len());
    for cmd in commands {
        write_command(&mut h, cmd);
    }
    h.finish()
}

fn write_command(h: &mut StableHasher, cmd: &RenderCommand) {
    match cmd {
        RenderCommand::BeginGroup { name } => {
            h.write_u8(0);
            h.write_str(name);
        }
        RenderCommand::EndGroup => h.write_u8(1),
        RenderCommand::PushTransform(m) => {
            h.write_u8(2);
            h.write_affine(*m);
        }
        RenderCommand::PopTransform => h.write_u8(3),
        RenderCommand::PushClipRect(r) => {
            h.write_u8(4);
            for v in [r.x0, r.y0, r.x1, r.y1] {
                h.write_quantized(v, COORD_STEP);
            }
        }
        RenderCommand::PopClipRect => h.write_u8(5),
        RenderCommand::BeginMask {
            mode,
            inverted,
            path_id,
            opacity,
            frame,
        } => {
            h.write_u8(6);
            write_mask_mode(h, *mode);
            h.write_bool(*inverted);
            h.write_u32(path_id.0);
            h.write_quantized(*opacity, UNIT_STEP);
            h.write_quantized(*frame, CACHE_FRAME_STEP);
        }
        RenderCommand::EndMask => h.write_u8(7),
        RenderCommand::BeginMatte { mode } => {
            h.write_u8(8);
            write_matte_mode(h, *mode);
        }
        RenderCommand::EndMatte => h.write_u8(9),
        RenderCommand::DrawImage {
            asset_id,
            width,
            height,
            opacity,
        } => {
            h.write_u8(10);
            h.write_str(asset_id);
            h.write_quantized(*width, COORD_STEP);
            h.write_quantized(*height, COORD_STEP);
            h.write_quantized(*opacity, UNIT_STEP);
        }
        RenderCommand::DrawShape {
            path_id,
            frame,
            color,
            opacity,
        } => {
            h.write_u8(11);
            h.write_u32(path_id.0);
            h.write_quantized(*frame, CACHE_FRAME_STEP);
            write_color(h, *color);
            h.write_quantized(*opacity, UNIT_STEP);
        }
        RenderCommand::DrawStroke {
            path_id,
            frame,
            color,
            width,
            opacity,
        } => {
            h.write_u8(12);
            h.write_u32(path_id.0);
            h.write_quantized(*frame, CACHE_FRAME_STEP);
            write_color(h, *color);
            h.write_quantized(*width, STROKE_WIDTH_STEP);
            h.write_quantized(*opacity, UNIT_STEP);
        }
    }
}

fn write_color(h: &mut StableHasher, c: Rgba) {
    for v in [c.r, c.g, c.b, c.a] {
        h.write_quantized(v, UNIT_STEP);
    }
}

fn write_mask_mode(h: &mut StableHasher, m: MaskMode) {
    h.write_u8(match m {
        MaskMode::Add => 0,
        MaskMode::Subtract => 1,
        MaskMode::Intersect => 2,
        MaskMode::Lighten => 3,
        MaskMode::Darken => 4,
        MaskMode::Difference => 5,
    });
}

fn write_matte_mode(h: &mut StableHasher, m: MatteMode) {
    h.write_u8(match m {
        MatteMode::Alpha => 0,
        MatteMode::AlphaInverted => 1,
        MatteMode::Luma => 2,
        MatteMode::LumaInverted => 3,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
