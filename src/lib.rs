//! Lexer, parser, and tree-walking evaluator for the gomeo scripting
//! language, plus the built-in function library that backs its standard
//! toolbox. [`run`] is the single entry point a host (REPL, script
//! runner, embedder) needs: it lexes, parses, and evaluates source text
//! against a caller-supplied root [`Environment`].

pub mod ast;
pub mod builtins;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod env;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod token;
pub mod value;

use context::Context;
use diagnostic::Diagnostic;
use env::Environment;
use lexer::Lexer;
use parser::Parser;
use std::rc::Rc;
use value::Value;

/// Predefined constants installed into every fresh root environment.
const PI: f64 = std::f64::consts::PI;

/// Builds a process-wide root environment seeded with `NULL`, `FALSE`,
/// `TRUE`, `PI`, and the standard built-ins (everything in §4.5 except
/// `run`, which the CLI installs separately).
pub fn new_root_environment() -> Rc<Environment> {
    let root = Environment::new();
    root.set("NULL", Value::number(0.0));
    root.set("FALSE", Value::number(0.0));
    root.set("TRUE", Value::number(1.0));
    root.set("PI", Value::number(PI));
    builtins::register_builtins(&root);
    root
}

/// Lexes, parses, and evaluates `source_text` against `root`, then
/// records the result as `ans` - mirroring the source's single shared
/// symbol table, where every top-level evaluation (REPL line, script, or
/// a file pulled in through the `run` built-in) updates the same binding.
pub fn run(source_name: &str, source_text: &str, root: &Rc<Environment>) -> Result<Value, Diagnostic> {
    let tokens = Lexer::new(source_name, source_text).make_tokens()?;
    let ast = Parser::new(tokens).parse()?;
    let context = Context::new("<module>");
    let result = eval::eval_expr(&ast, root, &context)?;
    root.set("ans", result.clone());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_seeds_constants_and_ans() {
        let root = new_root_environment();
        let v = run("<test>", "PI", &root).unwrap();
        assert!(matches!(v.kind, value::ValueKind::Number(n) if (n - PI).abs() < 1e-12));
        assert!(root.get("ans").is_some());
    }

    #[test]
    fn run_propagates_diagnostics() {
        let root = new_root_environment();
        assert!(run("<test>", "1 +", &root).is_err());
    }
}
