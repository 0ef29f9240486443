//! Built-in functions, grouped by what they touch: console I/O, type
//! predicates, list mutation, and file inclusion.
//!
//! `run` (see [`filesystem::run`]) is deliberately left out of
//! [`register_builtins`] - per the language's external-interface contract
//! it is installed by the CLI/REPL collaborator, not the core library, so
//! embedders that never expose a filesystem don't get it for free.

pub mod console;
pub mod filesystem;
pub mod lists;
pub mod types;

use crate::env::Environment;
use crate::value::Value;
use std::rc::Rc;

macro_rules! builtin {
    ($root:expr, $name:literal, [$($param:literal),*], $implementation:path) => {
        $root.set($name, Value::builtin($name, &[$($param),*], $implementation, $root.clone()));
    };
}

pub fn register_builtins(root: &Rc<Environment>) {
    builtin!(root, "print", ["value"], console::print);
    builtin!(root, "println", ["value"], console::println);
    builtin!(root, "printReturn", ["value"], console::print_return);
    builtin!(root, "input", ["prompt"], console::input);
    builtin!(root, "inputNumber", ["prompt"], console::input_number);
    builtin!(root, "clear", [], console::clear);
    builtin!(root, "exit", [], console::exit);

    builtin!(root, "isNumber", ["value"], types::is_number);
    builtin!(root, "isString", ["value"], types::is_string);
    builtin!(root, "isList", ["value"], types::is_list);
    builtin!(root, "isFunction", ["value"], types::is_function);
    builtin!(root, "len", ["value"], types::len);

    builtin!(root, "change", ["list", "index", "value"], lists::change);
}

/// Installs the `run` built-in - called by the CLI entry point, not by
/// [`register_builtins`] (see module docs).
pub fn register_run(root: &Rc<Environment>) {
    builtin!(root, "run", ["filename"], filesystem::run);
}
