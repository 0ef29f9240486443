//! Evaluation call-frame chain, used only to render tracebacks.

use crate::position::Position;
use std::rc::Rc;

/// One frame of the call stack at the point a runtime error was raised.
/// `display_name` is the frame's label in the traceback (`"<module>"` for
/// the top level, the function name for a call); `parent_entry_pos` is the
/// position *inside the parent* where this frame was entered.
#[derive(Debug, Clone)]
pub struct Context {
    pub display_name: String,
    pub parent: Option<Rc<Context>>,
    pub parent_entry_pos: Option<Position>,
}

impl Context {
    pub fn new(display_name: impl Into<String>) -> Rc<Self> {
        Rc::new(Context {
            display_name: display_name.into(),
            parent: None,
            parent_entry_pos: None,
        })
    }

    pub fn child(self: &Rc<Self>, display_name: impl Into<String>, entry_pos: Position) -> Rc<Self> {
        Rc::new(Context {
            display_name: display_name.into(),
            parent: Some(self.clone()),
            parent_entry_pos: Some(entry_pos),
        })
    }
}
