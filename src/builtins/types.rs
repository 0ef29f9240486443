//! Type predicates and `len`: `isNumber`, `isString`, `isList`,
//! `isFunction`, `len`.

use crate::context::Context;
use crate::env::Environment;
use crate::position::Position;
use crate::value::{EvalOutcome, Value, ValueKind};
use std::rc::Rc;

fn arg(call_env: &Rc<Environment>, name: &str) -> Value {
    call_env
        .get(name)
        .unwrap_or_else(|| panic!("builtin parameter '{name}' is always bound by the caller"))
}

fn flag(b: bool) -> EvalOutcome {
    Ok(Some(Value::number(b as u8 as f64)))
}

pub fn is_number(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    flag(matches!(arg(call_env, "value").kind, ValueKind::Number(_)))
}

pub fn is_string(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    flag(matches!(arg(call_env, "value").kind, ValueKind::Str(_)))
}

pub fn is_list(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    flag(matches!(arg(call_env, "value").kind, ValueKind::List(_)))
}

pub fn is_function(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    flag(matches!(
        arg(call_env, "value").kind,
        ValueKind::Function(_) | ValueKind::Builtin(_)
    ))
}

pub fn len(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    let value = arg(call_env, "value");
    let n = match &value.kind {
        ValueKind::Number(_) | ValueKind::Function(_) | ValueKind::Builtin(_) => 1.0,
        ValueKind::Str(s) => s.chars().count() as f64,
        ValueKind::List(items) => items.borrow().len() as f64,
    };
    Ok(Some(Value::number(n)))
}
