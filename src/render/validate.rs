use crate::foundation::error::{AnimirError, AnimirResult};
use crate::render::command::RenderCommand;

/// Kind of a command stream defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationIssueKind {
    /// A scope closed with the wrong kind of end (e.g. `EndMask` closing a group).
    MismatchedScope,
    /// A transform or clip push crossed a scope boundary.
    CrossBoundary,
    /// A pop or end with nothing open.
    PopOnEmpty,
    /// Something still open when the stream ended.
    Unclosed,
}

/// One defect found by [`validate_commands`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationIssue {
    /// Defect kind.
    pub kind: ValidationIssueKind,
    /// Index of the offending command (stream length for unclosed items).
    pub index: usize,
    /// Human readable details.
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScopeKind {
    Group,
    Mask,
    Matte,
}

impl ScopeKind {
    fn name(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Mask => "mask",
            Self::Matte => "matte",
        }
    }
}

struct OpenScope {
    kind: ScopeKind,
    index: usize,
    transform_depth: usize,
    clip_depth: usize,
}

/// Check scope balance of a command stream in one left-to-right scan.
///
/// Never modifies the stream; an empty result means the stream is well formed.
pub fn validate_commands(commands: &[RenderCommand]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut scopes: Vec<OpenScope> = Vec::new();
    let mut transforms = 0usize;
    let mut clips = 0usize;

    let mut report = |kind, index, message: String| {
        issues.push(ValidationIssue {
            kind,
            index,
            message,
        })
    };

    for (index, cmd) in commands.iter().enumerate() {
        match cmd {
            RenderCommand::PushTransform(_) => transforms += 1,
            RenderCommand::PushClipRect(_) => clips += 1,
            RenderCommand::PopTransform | RenderCommand::PopClipRect => {
                let is_transform = matches!(cmd, RenderCommand::PopTransform);
                let depth = if is_transform {
                    &mut transforms
                } else {
                    &mut clips
                };
                if *depth == 0 {
                    report(
                        ValidationIssueKind::PopOnEmpty,
                        index,
                        format!("{} with nothing pushed", cmd.kind_name()),
                    );
                    continue;
                }
                if let Some(top) = scopes.last() {
                    let base = if is_transform {
                        top.transform_depth
                    } else {
                        top.clip_depth
                    };
                    if *depth == base {
                        report(
                            ValidationIssueKind::CrossBoundary,
                            index,
                            format!(
                                "{} pops a push opened outside the {} scope at {}",
                                cmd.kind_name(),
                                top.kind.name(),
                                top.index
                            ),
                        );
                    }
                }
                *depth -= 1;
            }
            RenderCommand::BeginGroup { .. }
            | RenderCommand::BeginMask { .. }
            | RenderCommand::BeginMatte { .. } => {
                let kind = match cmd {
                    RenderCommand::BeginGroup { .. } => ScopeKind::Group,
                    RenderCommand::BeginMask { .. } => ScopeKind::Mask,
                    _ => ScopeKind::Matte,
                };
                scopes.push(OpenScope {
                    kind,
                    index,
                    transform_depth: transforms,
                    clip_depth: clips,
                });
            }
            RenderCommand::EndGroup | RenderCommand::EndMask | RenderCommand::EndMatte => {
                let kind = match cmd {
                    RenderCommand::EndGroup => ScopeKind::Group,
                    RenderCommand::EndMask => ScopeKind::Mask,
                    _ => ScopeKind::Matte,
                };
                let Some(top) = scopes.pop() else {
                    report(
                        ValidationIssueKind::PopOnEmpty,
                        index,
                        format!("{} with no open scope", cmd.kind_name()),
                    );
                    continue;
                };
                if top.kind != kind {
                    report(
                        ValidationIssueKind::MismatchedScope,
                        index,
                        format!(
                            "{} closes the {} scope opened at {}",
                            cmd.kind_name(),
                            top.kind.name(),
                            top.index
                        ),
                    );
                }
                if transforms != top.transform_depth || clips != top.clip_depth {
                    report(
                        ValidationIssueKind::CrossBoundary,
                        index,
                        format!(
                            "{} scope opened at {} ends with unbalanced pushes (transform {} -> {}, clip {} -> {})",
                            top.kind.name(),
                            top.index,
                            top.transform_depth,
                            transforms,
                            top.clip_depth,
                            clips
                        ),
                    );
                }
            }
            RenderCommand::DrawImage { .. }
            | RenderCommand::DrawShape { .. }
            | RenderCommand::DrawStroke { .. } => {}
        }
    }

    let end = commands.len();
    if transforms > 0 {
        report(
            ValidationIssueKind::Unclosed,
            end,
            format!("{transforms} transform push(es) never popped"),
        );
    }
    if clips > 0 {
        report(
            ValidationIssueKind::Unclosed,
            end,
            format!("{clips} clip push(es) never popped"),
        );
    }
    for s in &scopes {
        report(
            ValidationIssueKind::Unclosed,
            end,
            format!("{} scope opened at {} never closed", s.kind.name(), s.index),
        );
    }
    issues
}

/// [`validate_commands`] as a hard check: any issue becomes an [`AnimirError::Validation`].
pub fn ensure_valid(commands: &[RenderCommand]) -> AnimirResult<()> {
    let issues = validate_commands(commands);
    if issues.is_empty() {
        return Ok(());
    }
    let msg = issues
        .iter()
        .map(|i| format!("[{}] {}", i.index, i.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(AnimirError::validation(format!(
        "invalid command stream ({} issue(s)): {msg}",
        issues.len()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/render/validate.rs"]
mod tests;
