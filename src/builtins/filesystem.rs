//! `run`: evaluates another source file against the shared root
//! environment, so an included file's top-level bindings become visible
//! to the caller - the one built-in that reaches past its own call frame.

use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::env::Environment;
use crate::position::Position;
use crate::value::{EvalOutcome, Value, ValueKind};
use std::rc::Rc;

fn arg(call_env: &Rc<Environment>, name: &str) -> Value {
    call_env
        .get(name)
        .unwrap_or_else(|| panic!("builtin parameter '{name}' is always bound by the caller"))
}

pub fn run(call_env: &Rc<Environment>, context: &Rc<Context>, start: &Position, end: &Position) -> EvalOutcome {
    let filename = arg(call_env, "filename");
    let name = match &filename.kind {
        ValueKind::Str(s) => s.clone(),
        _ => {
            return Err(Diagnostic::runtime(
                "'run' expects a string filename",
                start.clone(),
                end.clone(),
                context.clone(),
            ))
        }
    };

    let text = std::fs::read_to_string(&name).map_err(|_| {
        Diagnostic::runtime(
            format!("File '{name}' not found"),
            start.clone(),
            end.clone(),
            context.clone(),
        )
    })?;

    let root = call_env
        .parent()
        .expect("the 'run' builtin's call frame is always parented on the root environment")
        .clone();

    let value = crate::run(&name, &text, &root).map_err(|d| d.with_context(context.clone()))?;
    Ok(Some(value))
}
