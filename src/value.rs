//! Runtime value algebra: numbers, strings, lists, and callables.
//!
//! A [`Value`] bundles one of the five kinds in [`ValueKind`] with the
//! `(start, end, context)` attribution spec.md requires for runtime
//! diagnostics. Arithmetic/comparison/logic are exhaustive matches on
//! `(self.kind, other.kind)` rather than a trait per type, since Rust has
//! no open class hierarchy to dispatch through.

use crate::ast::Node;
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::env::Environment;
use crate::position::Position;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Native implementation of a built-in. Reads its arguments from `call_env`
/// (already bound by name) and may need `call_env`'s parent - the root
/// environment builtins were registered in - to do things like `run`'s
/// nested evaluation. `start`/`end` are the call site's span, used to
/// attribute any runtime error the built-in raises.
pub type BuiltinFn =
    fn(call_env: &Rc<Environment>, context: &Rc<Context>, start: &Position, end: &Position) -> EvalOutcome;

pub type EvalOutcome = Result<Option<Value>, Diagnostic>;

#[derive(Debug)]
pub struct FunctionData {
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub captured_env: Rc<Environment>,
}

#[derive(Debug)]
pub struct BuiltinData {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub implementation: BuiltinFn,
    pub captured_env: Rc<Environment>,
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Number(f64),
    Str(String),
    /// Reference-shared backing storage - `change` mutates it in place;
    /// arithmetic operators build a fresh `Rc` with a copied `Vec`.
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<FunctionData>),
    Builtin(Rc<BuiltinData>),
}

#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub start: Option<Position>,
    pub end: Option<Position>,
    pub context: Option<Rc<Context>>,
}

fn is_integral(x: f64) -> bool {
    x.floor() == x
}

/// `strings.Repeat`/list-repeat with a negative count would panic in the
/// original; spec.md instead contracts negative counts to an empty result.
fn repeat_count(n: f64) -> usize {
    if n < 0.0 {
        0
    } else {
        n as usize
    }
}

impl Value {
    fn new(kind: ValueKind) -> Self {
        Value {
            kind,
            start: None,
            end: None,
            context: None,
        }
    }

    pub fn number(n: f64) -> Self {
        Value::new(ValueKind::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::new(ValueKind::Str(s.into()))
    }

    pub fn list(values: Vec<Value>) -> Self {
        Value::new(ValueKind::List(Rc::new(RefCell::new(values))))
    }

    pub fn function(params: Vec<String>, body: Rc<Node>, captured_env: Rc<Environment>) -> Self {
        Value::new(ValueKind::Function(Rc::new(FunctionData {
            params,
            body,
            captured_env,
        })))
    }

    pub fn builtin(
        name: &'static str,
        params: &'static [&'static str],
        implementation: BuiltinFn,
        captured_env: Rc<Environment>,
    ) -> Self {
        Value::new(ValueKind::Builtin(Rc::new(BuiltinData {
            name,
            params,
            implementation,
            captured_env,
        })))
    }

    pub fn with_position(mut self, start: Position, end: Position) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_context(mut self, context: Rc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    /// "Copy on use": a fresh attribution wrapper, sharing the underlying
    /// list storage (so mutation via `change` is visible through every
    /// outstanding handle) but independent position/context.
    pub fn copy_for_use(&self) -> Self {
        Value {
            kind: self.kind.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            context: self.context.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::Number(_) => "number",
            ValueKind::Str(_) => "string",
            ValueKind::List(_) => "list",
            ValueKind::Function(_) => "function",
            ValueKind::Builtin(_) => "builtin",
        }
    }

    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(n) => *n != 0.0,
            ValueKind::Str(s) => !s.is_empty(),
            ValueKind::List(items) => !items.borrow().is_empty(),
            ValueKind::Function(_) | ValueKind::Builtin(_) => false,
        }
    }

    fn err(&self, other: &Value, details: impl Into<String>) -> Diagnostic {
        let start = self.start.clone().or_else(|| other.start.clone());
        let end = other.end.clone().or_else(|| self.end.clone());
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => panic!("runtime error raised on a value with no attribution"),
        };
        Diagnostic::Runtime {
            details: details.into(),
            start,
            end,
            context: self.context.clone().or_else(|| other.context.clone()),
        }
    }

    // ---- arithmetic -----------------------------------------------------

    pub fn add(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number(a + b)),
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::string(format!("{a}{b}"))),
            (ValueKind::List(items), _) => {
                let mut copy = items.borrow().clone();
                copy.push(other.copy_for_use());
                Ok(Value::list(copy))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'+' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'+' not supported for string and type")),
            _ => Err(self.err(other, "'+' is not supported for functions")),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number(a - b)),
            (ValueKind::List(items), ValueKind::Number(n)) => {
                if !is_integral(*n) {
                    return Err(
                        self.err(other, "'-' not supported for list and fractional number")
                    );
                }
                let idx = *n as i64;
                let borrowed = items.borrow();
                if idx < 0 || idx as usize >= borrowed.len() {
                    return Err(self.err(
                        other,
                        format!(
                            "Index out of range (length {}, index {})",
                            borrowed.len(),
                            idx
                        ),
                    ));
                }
                let mut copy = borrowed.clone();
                copy.remove(idx as usize);
                Ok(Value::list(copy))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'-' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'-' not supported for string")),
            (ValueKind::List(_), _) => Err(self.err(other, "'-' not supported for list and type")),
            _ => Err(self.err(other, "'-' is not supported for functions")),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number(a * b)),
            (ValueKind::Number(a), ValueKind::Str(s)) => {
                if !is_integral(*a) {
                    return Err(
                        self.err(other, "'*' not supported for fractional number and string")
                    );
                }
                Ok(Value::string(s.repeat(repeat_count(*a))))
            }
            (ValueKind::Str(s), ValueKind::Number(n)) => {
                if !is_integral(*n) {
                    return Err(
                        self.err(other, "'*' not supported for string and fractional number")
                    );
                }
                Ok(Value::string(s.repeat(repeat_count(*n))))
            }
            (ValueKind::List(a), ValueKind::List(b)) => {
                let mut copy = a.borrow().clone();
                copy.extend(b.borrow().iter().map(Value::copy_for_use));
                Ok(Value::list(copy))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'*' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'*' not supported for string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'*' not supported for list and type")),
            _ => Err(self.err(other, "'*' is not supported for functions")),
        }
    }

    pub fn divide(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number(a / b)),
            (ValueKind::List(items), ValueKind::Number(n)) => {
                if !is_integral(*n) {
                    return Err(
                        self.err(other, "'/' not supported for list and fractional number")
                    );
                }
                let idx = *n as i64;
                let borrowed = items.borrow();
                if idx < 0 || idx as usize >= borrowed.len() {
                    return Err(self.err(
                        other,
                        format!(
                            "Index out of range (length {}, index {})",
                            borrowed.len(),
                            idx
                        ),
                    ));
                }
                Ok(borrowed[idx as usize].copy_for_use())
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'/' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'/' not supported for string")),
            (ValueKind::List(_), _) => Err(self.err(other, "'/' not supported for list and type")),
            _ => Err(self.err(other, "'/' is not supported for functions")),
        }
    }

    pub fn modulo(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                if !is_integral(*a) || !is_integral(*b) {
                    return Err(self.err(other, "'%' not supported for fractional number"));
                }
                let bi = *b as i64;
                if bi == 0 {
                    return Err(self.err(other, "integer modulo by zero"));
                }
                Ok(Value::number((*a as i64 % bi) as f64))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'%' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'%' not supported for string")),
            (ValueKind::List(_), _) => Err(self.err(other, "'%' not supported for list")),
            _ => Err(self.err(other, "'%' is not supported for functions")),
        }
    }

    pub fn pow(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                if *a < 0.0 && !is_integral(*b) {
                    return Err(self.err(
                        other,
                        "Negative number cannot be raised to fractional power",
                    ));
                }
                Ok(Value::number(a.powf(*b)))
            }
            (ValueKind::List(items), ValueKind::Number(n)) => {
                if !is_integral(*n) {
                    return Err(
                        self.err(other, "'^' not supported for list and fractional number")
                    );
                }
                if *n < 0.0 {
                    return Err(self.err(other, "'^' not supported for list and negative number"));
                }
                let source = items.borrow();
                let count = *n as usize;
                let mut copy = Vec::with_capacity(source.len() * count);
                for _ in 0..count {
                    copy.extend(source.iter().map(Value::copy_for_use));
                }
                Ok(Value::list(copy))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'^' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'^' not supported for string")),
            (ValueKind::List(_), _) => Err(self.err(other, "'^' not supported for list and type")),
            _ => Err(self.err(other, "'^' is not supported for functions")),
        }
    }

    // ---- comparisons ------------------------------------------------------

    pub fn equals(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number((a == b) as u8 as f64)),
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::number((a == b) as u8 as f64)),
            (ValueKind::List(a), ValueKind::List(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                if a.len() != b.len() {
                    return Ok(Value::number(0.0));
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals(y)?.is_true() {
                        return Ok(Value::number(0.0));
                    }
                }
                Ok(Value::number(1.0))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'==' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'==' not supported between string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'==' not supported between list and type")),
            _ => Err(self.err(other, "comparison not supported for functions")),
        }
    }

    pub fn not_equals(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(_), ValueKind::Number(_))
            | (ValueKind::Str(_), ValueKind::Str(_))
            | (ValueKind::List(_), ValueKind::List(_)) => {
                Ok(Value::number((!self.equals(other)?.is_true()) as u8 as f64))
            }
            (ValueKind::Number(_), _) => {
                Err(self.err(other, "'!=' not supported between number and type"))
            }
            (ValueKind::Str(_), _) => Err(self.err(other, "'!=' not supported between string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'!=' not supported between list and type")),
            _ => Err(self.err(other, "comparison not supported for functions")),
        }
    }

    pub fn less_than(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number((a < b) as u8 as f64)),
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::number((a < b) as u8 as f64)),
            (ValueKind::Number(_), _) => Err(self.err(other, "'<' not supported between number and type")),
            (ValueKind::Str(_), _) => Err(self.err(other, "'<' not supported between string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'<' not supported for list")),
            _ => Err(self.err(other, "comparison not supported for functions")),
        }
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number((a > b) as u8 as f64)),
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::number((a > b) as u8 as f64)),
            (ValueKind::Number(_), _) => Err(self.err(other, "'>' not supported between number and type")),
            (ValueKind::Str(_), _) => Err(self.err(other, "'>' not supported between string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'>' not supported for list")),
            _ => Err(self.err(other, "comparison not supported for functions")),
        }
    }

    pub fn less_equals(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number((a <= b) as u8 as f64)),
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::number((a <= b) as u8 as f64)),
            (ValueKind::Number(_), _) => Err(self.err(other, "'<=' not supported between number and type")),
            (ValueKind::Str(_), _) => Err(self.err(other, "'<=' not supported between string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'<=' not supported for list")),
            _ => Err(self.err(other, "comparison not supported for functions")),
        }
    }

    /// Corrected `>=`: the source's `String.GreaterEquals` is a verbatim
    /// copy of `LessEquals` (spec.md's documented bug); this implements
    /// the real comparison for every variant.
    pub fn greater_equals(&self, other: &Value) -> Result<Value, Diagnostic> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number((a >= b) as u8 as f64)),
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::number((a >= b) as u8 as f64)),
            (ValueKind::Number(_), _) => Err(self.err(other, "'>=' not supported between number and type")),
            (ValueKind::Str(_), _) => Err(self.err(other, "'>=' not supported between string and type")),
            (ValueKind::List(_), _) => Err(self.err(other, "'>=' not supported for list")),
            _ => Err(self.err(other, "comparison not supported for functions")),
        }
    }

    // ---- logic: identical truthiness-driven behavior for every kind -------

    pub fn and(&self, other: &Value) -> Value {
        Value::number((self.is_true() && other.is_true()) as u8 as f64)
    }

    pub fn or(&self, other: &Value) -> Value {
        Value::number((self.is_true() || other.is_true()) as u8 as f64)
    }

    pub fn not(&self) -> Value {
        Value::number(!self.is_true() as u8 as f64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number(n) => write!(f, "{n}"),
            ValueKind::Str(s) => write!(f, "{s}"),
            ValueKind::List(items) => {
                write!(f, "[")?;
                let items = items.borrow();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ValueKind::Function(_) => write!(f, "<function>"),
            ValueKind::Builtin(_) => write!(f, "<built-in function>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_add() {
        assert!(matches!(
            Value::number(1.0).add(&Value::number(2.0)).unwrap().kind,
            ValueKind::Number(n) if n == 3.0
        ));
    }

    #[test]
    fn string_times_negative_is_empty_not_a_panic() {
        let v = Value::number(-2.0).multiply(&Value::string("ab")).unwrap();
        assert!(matches!(v.kind, ValueKind::Str(s) if s.is_empty()));
    }

    #[test]
    fn list_add_appends_any_value_as_element() {
        let list = Value::list(vec![Value::number(1.0)]);
        let result = list.add(&Value::string("x")).unwrap();
        match result.kind {
            ValueKind::List(items) => assert_eq!(items.borrow().len(), 2),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn list_divide_indexes_without_consuming() {
        let list = Value::list(vec![Value::number(10.0), Value::number(20.0)]);
        let v = list.divide(&Value::number(1.0)).unwrap();
        assert!(matches!(v.kind, ValueKind::Number(n) if n == 20.0));
    }

    #[test]
    fn string_greater_equals_is_corrected() {
        assert!(Value::string("b").greater_equals(&Value::string("a")).unwrap().is_true());
        assert!(!Value::string("a").greater_equals(&Value::string("b")).unwrap().is_true());
    }

    #[test]
    fn modulo_requires_integral_operands() {
        assert!(Value::number(5.5).modulo(&Value::number(2.0)).is_err());
        assert!(matches!(
            Value::number(5.0).modulo(&Value::number(2.0)).unwrap().kind,
            ValueKind::Number(n) if n == 1.0
        ));
    }

    #[test]
    fn negative_base_fractional_power_fails() {
        assert!(Value::number(-4.0).pow(&Value::number(0.5)).is_err());
    }
}
