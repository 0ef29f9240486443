//! Tree-walking evaluator.
//!
//! Every node interprets to a [`Signal`] rather than a bare [`Value`]:
//! `return`/`continue`/`break` have to thread up through enclosing nodes
//! unchanged until something that actually handles them (a loop, or a
//! function call boundary) intercepts them. `Signal::Value(None)` stands
//! for "no value" - the empty-statements-block / no-branch-taken case -
//! kept distinct from an explicit `Number(0)` so `for`/`while` can tell
//! "the body produced nothing" apart from "the body produced zero".

use crate::ast::Node;
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::env::Environment;
use crate::position::Position;
use crate::token::TokenKind;
use crate::value::{Value, ValueKind};
use std::rc::Rc;

pub enum Signal {
    Value(Option<Value>),
    Return(Option<Value>),
    Continue,
    Break,
}

fn null_value(start: Position, end: Position, context: Rc<Context>) -> Value {
    Value::number(0.0).with_position(start, end).with_context(context)
}

/// Evaluates `node` expecting a concrete value - used everywhere the
/// grammar guarantees an expression, never a bare `return`/`continue`/
/// `break` (operator operands, call arguments, loop bounds, conditions).
pub fn eval_expr(node: &Node, env: &Rc<Environment>, context: &Rc<Context>) -> Result<Value, Diagnostic> {
    match interpret(node, env, context)? {
        Signal::Value(Some(v)) => Ok(v),
        Signal::Value(None) => Ok(null_value(node.start().clone(), node.end().clone(), context.clone())),
        Signal::Return(v) => Ok(v.unwrap_or_else(|| null_value(node.start().clone(), node.end().clone(), context.clone()))),
        Signal::Continue | Signal::Break => {
            Ok(null_value(node.start().clone(), node.end().clone(), context.clone()))
        }
    }
}

pub fn interpret(node: &Node, env: &Rc<Environment>, context: &Rc<Context>) -> Result<Signal, Diagnostic> {
    match node {
        Node::Number { value, start, end } => Ok(Signal::Value(Some(
            Value::number(*value).with_position(start.clone(), end.clone()).with_context(context.clone()),
        ))),

        Node::Str { value, start, end } => Ok(Signal::Value(Some(
            Value::string(value.clone()).with_position(start.clone(), end.clone()).with_context(context.clone()),
        ))),

        Node::VarAccess { name, start, end } => match env.get(name) {
            Some(v) => Ok(Signal::Value(Some(
                v.copy_for_use().with_position(start.clone(), end.clone()).with_context(context.clone()),
            ))),
            None => Err(Diagnostic::runtime(
                format!("'{name}' is not defined"),
                start.clone(),
                end.clone(),
                context.clone(),
            )),
        },

        Node::VarAssign { name, value, start, end } => {
            let v = eval_expr(value, env, context)?;
            env.set(name.clone(), v.clone());
            Ok(Signal::Value(Some(
                v.with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::List { items, start, end } => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, env, context)?);
            }
            Ok(Signal::Value(Some(
                Value::list(values).with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::Statements { statements, .. } => {
            let mut last: Option<Value> = None;
            for statement in statements {
                match interpret(statement, env, context)? {
                    Signal::Value(v) => last = v,
                    signal @ (Signal::Return(_) | Signal::Continue | Signal::Break) => return Ok(signal),
                }
            }
            Ok(Signal::Value(last))
        }

        Node::BinOp { op, left, right, start, end } => {
            let l = eval_expr(left, env, context)?;
            let r = eval_expr(right, env, context)?;
            let result = apply_binary_op(op, &l, &r).map_err(|d| d.with_context(context.clone()))?;
            Ok(Signal::Value(Some(
                result.with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::UnaryOp { op, operand, start, end } => {
            let v = eval_expr(operand, env, context)?;
            let result = match op {
                TokenKind::Plus => v,
                TokenKind::Minus => {
                    let neg_one = Value::number(-1.0).with_position(start.clone(), end.clone()).with_context(context.clone());
                    v.multiply(&neg_one).map_err(|d| d.with_context(context.clone()))?
                }
                TokenKind::Not => v.not(),
                other => unreachable!("{other} is not a unary operator"),
            };
            Ok(Signal::Value(Some(
                result.with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::If { cases, else_case, .. } => {
            for (condition, expr) in cases {
                let c = eval_expr(condition, env, context)?;
                if c.is_true() {
                    return interpret(expr, env, context);
                }
            }
            match else_case {
                Some(else_case) => interpret(else_case, env, context),
                None => Ok(Signal::Value(None)),
            }
        }

        Node::For {
            var_name,
            start_value,
            end_value,
            step_value,
            body,
            start,
            end,
        } => {
            let mut from = eval_expr(start_value, env, context)?;
            let to = eval_expr(end_value, env, context)?;
            let step = match step_value {
                Some(node) => eval_expr(node, env, context)?,
                None => Value::number(1.0),
            };
            let ascending = step
                .greater_equals(&Value::number(0.0))
                .map_err(|d| d.with_context(context.clone()))?
                .is_true();

            let mut collected = Vec::new();
            loop {
                let keep_going = if ascending {
                    from.less_than(&to)
                } else {
                    from.greater_than(&to)
                }
                .map_err(|d| d.with_context(context.clone()))?;
                if !keep_going.is_true() {
                    break;
                }

                env.set(var_name.clone(), from.copy_for_use());
                from = from.add(&step).map_err(|d| d.with_context(context.clone()))?;

                match interpret(body, env, context)? {
                    Signal::Value(Some(v)) => collected.push(v),
                    Signal::Value(None) => {}
                    Signal::Continue => continue,
                    Signal::Break => break,
                    signal @ Signal::Return(_) => return Ok(signal),
                }
            }
            Ok(Signal::Value(Some(
                Value::list(collected).with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::While { condition, body, start, end } => {
            let mut collected = Vec::new();
            loop {
                let keep_going = eval_expr(condition, env, context)?;
                if !keep_going.is_true() {
                    break;
                }
                match interpret(body, env, context)? {
                    Signal::Value(Some(v)) => collected.push(v),
                    Signal::Value(None) => {}
                    Signal::Continue => continue,
                    Signal::Break => break,
                    signal @ Signal::Return(_) => return Ok(signal),
                }
            }
            Ok(Signal::Value(Some(
                Value::list(collected).with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::FuncDef { params, body, start, end, .. } => {
            let function = Value::function((*params).clone(), Rc::new((**body).clone()), env.clone())
                .with_position(start.clone(), end.clone())
                .with_context(context.clone());
            Ok(Signal::Value(Some(function)))
        }

        Node::Call { callee, args, start, end } => {
            let callee_value = eval_expr(callee, env, context)?;
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(eval_expr(arg, env, context)?);
            }
            let result = call_function(&callee_value, arg_values, start.clone(), end.clone(), context)?;
            Ok(Signal::Value(Some(
                result.with_position(start.clone(), end.clone()).with_context(context.clone()),
            )))
        }

        Node::Return { value, .. } => {
            let v = match value {
                Some(node) => Some(eval_expr(node, env, context)?),
                None => None,
            };
            Ok(Signal::Return(v))
        }

        Node::Continue { .. } => Ok(Signal::Continue),
        Node::Break { .. } => Ok(Signal::Break),
    }
}

fn apply_binary_op(op: &TokenKind, left: &Value, right: &Value) -> Result<Value, Diagnostic> {
    match op {
        TokenKind::Plus => left.add(right),
        TokenKind::Minus => left.subtract(right),
        TokenKind::Star => left.multiply(right),
        TokenKind::Slash => left.divide(right),
        TokenKind::Percent => left.modulo(right),
        TokenKind::Pow => left.pow(right),
        TokenKind::EqualsEquals => left.equals(right),
        TokenKind::NotEquals => left.not_equals(right),
        TokenKind::LessThan => left.less_than(right),
        TokenKind::GreaterThan => left.greater_than(right),
        TokenKind::LessEquals => left.less_equals(right),
        TokenKind::GreaterEquals => left.greater_equals(right),
        TokenKind::And => Ok(left.and(right)),
        TokenKind::Or => Ok(left.or(right)),
        other => unreachable!("{other} is not a binary operator"),
    }
}

fn arity_message(expected: usize, actual: usize) -> String {
    if actual > expected {
        format!("{} too many arguments passed into function", actual - expected)
    } else {
        format!("{} too few arguments passed into function", expected - actual)
    }
}

/// Binds `args` positionally into a fresh environment parented on the
/// callee's *captured* environment (not the caller's - this is what makes
/// closures lexical) and evaluates its body.
fn call_function(
    callee: &Value,
    args: Vec<Value>,
    call_start: Position,
    call_end: Position,
    context: &Rc<Context>,
) -> Result<Value, Diagnostic> {
    match &callee.kind {
        ValueKind::Function(data) => {
            if args.len() != data.params.len() {
                let (start, end) = (
                    callee.start.clone().unwrap_or_else(|| call_start.clone()),
                    callee.end.clone().unwrap_or_else(|| call_end.clone()),
                );
                return Err(Diagnostic::runtime(
                    arity_message(data.params.len(), args.len()),
                    start,
                    end,
                    context.clone(),
                ));
            }
            let call_env = Environment::with_parent(data.captured_env.clone());
            for (name, value) in data.params.iter().zip(args.into_iter()) {
                call_env.set(name.clone(), value);
            }
            let call_context = context.child("function", call_start.clone());
            match interpret(&data.body, &call_env, &call_context)? {
                Signal::Return(Some(v)) | Signal::Value(Some(v)) => Ok(v),
                Signal::Return(None) | Signal::Value(None) | Signal::Continue | Signal::Break => {
                    Ok(null_value(call_start, call_end, context.clone()))
                }
            }
        }
        ValueKind::Builtin(data) => {
            if args.len() != data.params.len() {
                return Err(Diagnostic::runtime(
                    arity_message(data.params.len(), args.len()),
                    call_start,
                    call_end,
                    context.clone(),
                ));
            }
            let call_env = Environment::with_parent(data.captured_env.clone());
            for (name, value) in data.params.iter().zip(args.into_iter()) {
                call_env.set((*name).to_string(), value);
            }
            let call_context = context.child("function", call_start.clone());
            let result = (data.implementation)(&call_env, &call_context, &call_start, &call_end)?;
            Ok(result.unwrap_or_else(|| null_value(call_start, call_end, context.clone())))
        }
        _ => Err(Diagnostic::runtime(
            format!("'{}' is not callable", callee.type_name()),
            call_start,
            call_end,
            context.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(src: &str) -> Result<Value, Diagnostic> {
        let tokens = Lexer::new("<test>", src).make_tokens().unwrap();
        let ast = Parser::new(tokens).parse().unwrap();
        let env = Environment::new();
        let context = Context::new("<module>");
        eval_expr(&ast, &env, &context)
    }

    #[test]
    fn arithmetic_precedence() {
        let v = run("1 + 2 * 3").unwrap();
        assert!(matches!(v.kind, ValueKind::Number(n) if n == 7.0));
    }

    #[test]
    fn var_assignment_and_access() {
        let v = run("var x = 5\nx * x").unwrap();
        assert!(matches!(v.kind, ValueKind::Number(n) if n == 25.0));
    }

    #[test]
    fn if_picks_first_truthy_branch() {
        let v = run("if 0 do 1 elseif 1 do 2 else 3 end").unwrap();
        assert!(matches!(v.kind, ValueKind::Number(n) if n == 2.0));
    }

    #[test]
    fn for_loop_collects_non_null_values() {
        let v = run("for i from 1 to 4 do i * i end").unwrap();
        match v.kind {
            ValueKind::List(items) => {
                let items = items.borrow();
                assert_eq!(items.len(), 3);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn break_outside_loop_returns_null_at_function_boundary() {
        let v = run("var f = function() do break end\nf()").unwrap();
        assert!(matches!(v.kind, ValueKind::Number(n) if n == 0.0));
    }

    #[test]
    fn closures_capture_defining_environment() {
        let v = run(
            "var make = function(n) do function() do n end end\nvar g = make(9)\ng()",
        )
        .unwrap();
        assert!(matches!(v.kind, ValueKind::Number(n) if n == 9.0));
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let err = run("var f = function(a, b) do a + b end\nf(1)").unwrap_err();
        assert!(err.to_string().contains("too few arguments"));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        assert!(run("nope").is_err());
    }
}
