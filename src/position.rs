//! Source position tracking.
//!
//! A `Position` pins a single character to a place in a source buffer:
//! a flat `index` into the text, plus the `line`/`column` it decodes to
//! (both zero-indexed), the name of the source (`"<stdin>"` for REPL
//! input, a file path otherwise), and a clone of the full source text so
//! diagnostics can re-render the offending line without threading the
//! buffer through every error site.

use std::rc::Rc;

/// A single point in a source buffer. `index`/`column` are signed so a
/// freshly-constructed `Position` can sit one step before the first
/// character, matching the "created at offset -1" contract: the first
/// call to `advance` brings both to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub index: isize,
    pub line: usize,
    pub column: isize,
    pub source_name: Rc<str>,
    pub source_text: Rc<str>,
}

impl Position {
    pub fn start(source_name: Rc<str>, source_text: Rc<str>) -> Self {
        Position {
            index: -1,
            line: 0,
            column: -1,
            source_name,
            source_text,
        }
    }

    /// Advances past `current_char`, incrementing `index`/`column` and,
    /// on a newline, rolling `column` back to zero and bumping `line`.
    pub fn advance(&mut self, current_char: Option<char>) {
        self.index += 1;
        self.column += 1;
        if current_char == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
    }

    pub fn column_usize(&self) -> usize {
        self.column.max(0) as usize
    }
}
