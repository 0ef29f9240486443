//! `change`: the sole in-place list mutator.

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

fn is_integral(x: f64) -> bool {
    x.floor() == x
}

/// Replaces `list[index]` with `value` in place and returns the (mutated)
/// list - every other outstanding handle to the same list storage observes
/// the change, since lists are reference-shared.
pub fn change(call_env: &Rc<Environment>, context: &Rc<Context>, start: &Position, end: &Position) -> EvalOutcome {
    let list = arg(call_env, "list");
    let index = arg(call_env, "index");
    let value = arg(call_env, "value");

    let items = match &list.kind {
        ValueKind::List(items) => items,
        _ => {
            return Err(Diagnostic::runtime(
                "'change' not supported for non-list",
                start.clone(),
                end.clone(),
                context.clone(),
            ))
        }
    };

    let n = match &index.kind {
        ValueKind::Number(n) => *n,
        _ => {
            return Err(Diagnostic::runtime(
                "'change' index must be a number",
                start.clone(),
                end.clone(),
                context.clone(),
            ))
        }
    };
    if !is_integral(n) {
        return Err(Diagnostic::runtime(
            "'change' index must be an integer",
            start.clone(),
            end.clone(),
            context.clone(),
        ));
    }

    let idx = n as i64;
    let mut items = items.borrow_mut();
    if idx < 0 || idx as usize >= items.len() {
        return Err(Diagnostic::runtime(
            format!("Index out of range (length {}, index {})", items.len(), idx),
            start.clone(),
            end.clone(),
            context.clone(),
        ));
    }
    items[idx as usize] = value;
    drop(items);
    Ok(Some(list))
}
