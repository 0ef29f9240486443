//! Output and interactive input: `print`, `println`, `printReturn`,
//! `input`, `inputNumber`, `clear`, `exit`.

use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::env::Environment;
use crate::position::Position;
use crate::value::{EvalOutcome, Value};
use std::io::{self, Write};
use std::process::Command;
use std::rc::Rc;

fn arg(call_env: &Rc<Environment>, name: &str) -> Value {
    call_env
        .get(name)
        .unwrap_or_else(|| panic!("builtin parameter '{name}' is always bound by the caller"))
}

pub fn print(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    print!("{}", arg(call_env, "value"));
    let _ = io::stdout().flush();
    Ok(None)
}

pub fn println(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    println!("{}", arg(call_env, "value"));
    Ok(None)
}

pub fn print_return(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    let value = arg(call_env, "value");
    println!("{value}");
    Ok(Some(value))
}

fn read_line(prompt: &Value) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
    line.trim_end_matches(['\n', '\r']).to_string()
}

pub fn input(call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    let line = read_line(&arg(call_env, "prompt"));
    Ok(Some(Value::string(line)))
}

pub fn input_number(
    call_env: &Rc<Environment>,
    context: &Rc<Context>,
    start: &Position,
    end: &Position,
) -> EvalOutcome {
    let line = read_line(&arg(call_env, "prompt"));
    match line.parse::<f64>() {
        Ok(n) => Ok(Some(Value::number(n))),
        Err(_) => Err(Diagnostic::runtime(
            format!("Invalid number '{line}'"),
            start.clone(),
            end.clone(),
            context.clone(),
        )),
    }
}

pub fn clear(_call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    let _ = Command::new("clear").status();
    Ok(None)
}

pub fn exit(_call_env: &Rc<Environment>, _context: &Rc<Context>, _start: &Position, _end: &Position) -> EvalOutcome {
    std::process::exit(0);
}
