//! The diagnostic taxonomy and its traceback/source-excerpt rendering.

use crate::context::Context;
use crate::position::Position;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Diagnostic {
    #[error("{}", render(.details, .start, .end, "IllegalCharacterError", None))]
    IllegalCharacter {
        details: String,
        start: Position,
        end: Position,
    },
    #[error("{}", render(.details, .start, .end, "ExpectedCharacterError", None))]
    ExpectedCharacter {
        details: String,
        start: Position,
        end: Position,
    },
    #[error("{}", render(.details, .start, .end, "InvalidSyntaxError", None))]
    InvalidSyntax {
        details: String,
        start: Position,
        end: Position,
    },
    #[error("{}", render(.details, .start, .end, "RuntimeError", .context.as_ref()))]
    Runtime {
        details: String,
        start: Position,
        end: Position,
        context: Option<Rc<Context>>,
    },
}

impl Diagnostic {
    pub fn illegal_character(c: char, start: Position, end: Position) -> Self {
        Diagnostic::IllegalCharacter {
            details: format!("'{c}'"),
            start,
            end,
        }
    }

    pub fn unterminated_string(start: Position, end: Position) -> Self {
        Diagnostic::IllegalCharacter {
            details: "unterminated string literal".to_string(),
            start,
            end,
        }
    }

    pub fn expected_character(c: char, start: Position, end: Position) -> Self {
        Diagnostic::ExpectedCharacter {
            details: format!("'{c}'"),
            start,
            end,
        }
    }

    pub fn invalid_syntax(details: impl Into<String>, start: Position, end: Position) -> Self {
        Diagnostic::InvalidSyntax {
            details: details.into(),
            start,
            end,
        }
    }

    pub fn runtime(
        details: impl Into<String>,
        start: Position,
        end: Position,
        context: Rc<Context>,
    ) -> Self {
        Diagnostic::Runtime {
            details: details.into(),
            start,
            end,
            context: Some(context),
        }
    }

    /// Re-attributes a runtime error to an enclosing frame while keeping
    /// the originating span, matching the source's re-raise-with-context
    /// behavior as an error bubbles through call frames.
    pub fn with_context(self, context: Rc<Context>) -> Self {
        match self {
            Diagnostic::Runtime {
                details,
                start,
                end,
                context: existing,
            } => Diagnostic::Runtime {
                details,
                start,
                end,
                context: existing.or(Some(context)),
            },
            other => other,
        }
    }
}

/// Renders `File <source-name>, line <n+1>, in <ErrorKind>` traceback lines
/// (runtime errors only), then `<ErrorKind>: <details>`, then the source
/// excerpt with a caret underline.
fn render(details: &str, start: &Position, end: &Position, kind: &str, context: Option<&Rc<Context>>) -> String {
    let mut out = String::new();

    if let Some(ctx) = context {
        out.push_str("Traceback (most recent call last):\n");
        let mut frame = Some(ctx.clone());
        let mut pos = Some(start.clone());
        let mut lines = Vec::new();
        while let Some(f) = frame {
            let line = pos.as_ref().map(|p| p.line + 1).unwrap_or(start.line + 1);
            let source_name = pos
                .as_ref()
                .map(|p| p.source_name.as_ref())
                .unwrap_or(start.source_name.as_ref());
            lines.push(format!("  File {source_name}, line {line}, in {kind}"));
            pos = f.parent_entry_pos.clone();
            frame = f.parent.clone();
        }
        lines.reverse();
        out.push_str(&lines.join("\n"));
        out.push('\n');
    }

    out.push_str(&format!("{kind}: {details}\n\n"));
    out.push_str(&string_with_arrows(&start.source_text, start, end));
    out
}

/// Caret-underlines `[start, end)` in the source text, expanding across
/// every line the span touches. Tabs are intentionally left untouched in
/// the excerpt (not stripped) - this mirrors the source's `stringWithArrows`
/// helper, whose tab-removal call passed a replace-count of zero and was
/// therefore already a no-op.
fn string_with_arrows(text: &str, start: &Position, end: &Position) -> String {
    let chars: Vec<char> = text.chars().collect();
    let line_start_of = |idx: isize| -> usize {
        if idx <= 0 {
            return 0;
        }
        let mut i = idx as usize;
        while i > 0 {
            if chars[i - 1] == '\n' {
                return i;
            }
            i -= 1;
        }
        0
    };
    let line_end_of = |idx: usize| -> usize {
        let mut i = idx;
        while i < chars.len() {
            if chars[i] == '\n' {
                return i;
            }
            i += 1;
        }
        chars.len()
    };

    let mut result = String::new();
    let mut idx_start = line_start_of(start.index);
    let mut idx_end = line_end_of(idx_start);
    let line_count = end.line.saturating_sub(start.line) + 1;

    for i in 0..line_count {
        let line: String = chars[idx_start..idx_end].iter().collect();
        let col_start = if i == 0 { start.column_usize() } else { 0 };
        let col_end = if i == line_count - 1 {
            end.column_usize()
        } else {
            line.chars().count()
        };

        result.push_str(&line);
        result.push('\n');
        result.push_str(&" ".repeat(col_start));
        result.push_str(&"^".repeat(col_end.saturating_sub(col_start).max(1)));
        if i != line_count - 1 {
            result.push('\n');
        }

        idx_start = idx_end + 1;
        if idx_start > chars.len() {
            break;
        }
        idx_end = line_end_of(idx_start);
    }

    result
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn pos(index: isize, line: usize, column: isize) -> Position {
        Position {
            index,
            line,
            column,
            source_name: Rc::from("<test>"),
            source_text: Rc::from("1 + @"),
        }
    }

    #[test]
    fn illegal_character_renders_kind_and_details() {
        let d = Diagnostic::illegal_character('@', pos(4, 0, 4), pos(5, 0, 5));
        let rendered = d.to_string();
        assert!(rendered.contains("IllegalCharacterError: '@'"));
        assert!(rendered.contains("1 + @"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn runtime_error_includes_traceback() {
        let ctx = Context::new("<module>");
        let d = Diagnostic::runtime("boom", pos(0, 0, 0), pos(1, 0, 1), ctx);
        let rendered = d.to_string();
        assert!(rendered.starts_with("Traceback (most recent call last):"));
        assert!(rendered.contains("RuntimeError: boom"));
    }
}
