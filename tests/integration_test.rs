use gomeo::new_root_environment;
use gomeo::value::ValueKind;

fn eval(source: &str) -> gomeo::value::Value {
    let root = new_root_environment();
    gomeo::run("<test>", source, &root).expect("expected successful evaluation")
}

fn number(source: &str) -> f64 {
    match eval(source).kind {
        ValueKind::Number(n) => n,
        other => panic!("expected a number, got {other:?}"),
    }
}

fn text(source: &str) -> String {
    match eval(source).kind {
        ValueKind::Str(s) => s,
        other => panic!("expected a string, got {other:?}"),
    }
}

fn list(source: &str) -> Vec<f64> {
    match eval(source).kind {
        ValueKind::List(items) => items
            .borrow()
            .iter()
            .map(|v| match v.kind {
                ValueKind::Number(n) => n,
                _ => panic!("expected a list of numbers"),
            })
            .collect(),
        other => panic!("expected a list, got {other:?}"),
    }
}

// Scenario 1
#[test]
fn arithmetic_precedence() {
    assert_eq!(number("1 + 2 * 3"), 7.0);
}

// Scenario 2: bare reassignment without `var` is not part of the grammar.
#[test]
fn reassignment_without_var_is_a_syntax_error() {
    let root = new_root_environment();
    let err = gomeo::run("<test>", "var x = 10\nx = x - 1\nx", &root).unwrap_err();
    assert!(err.to_string().contains("InvalidSyntaxError"));
}

// Scenario 3
#[test]
fn string_repeat() {
    assert_eq!(text(r#"var s = "ab" * 3; s"#), "ababab");
}

// Scenario 4
#[test]
fn recursive_fibonacci() {
    let src = r#"
var fib = function (n) do
    if n < 2 do
        return n
    end
    return fib(n - 1) + fib(n - 2)
end
fib(10)
"#;
    assert_eq!(number(src), 55.0);
}

// Scenario 5
#[test]
fn change_mutates_in_place() {
    assert_eq!(list("var L = [1, 2, 3]; change(L, 1, 99); L"), vec![1.0, 99.0, 3.0]);
}

// Scenario 6
#[test]
fn list_divide_indexes_without_removing() {
    assert_eq!(number("var L = [10, 20, 30]; L / 2"), 30.0);
}

// Scenario 7
#[test]
fn for_loop_collects_body_values() {
    assert_eq!(list("for i from 1 to 4 do i * i end"), vec![1.0, 4.0, 9.0]);
}

// Scenario 8
#[test]
fn string_less_than() {
    assert_eq!(number(r#""a" < "b""#), 1.0);
}

// Scenario 9
#[test]
fn modulo_of_integers_and_of_fractions() {
    assert_eq!(number("5 % 2"), 1.0);
    let root = new_root_environment();
    assert!(gomeo::run("<test>", "5.5 % 2", &root).is_err());
}

// Scenario 10
#[test]
fn negative_base_fractional_power_is_a_runtime_error() {
    let root = new_root_environment();
    let err = gomeo::run("<test>", "(-4) ^ 0.5", &root).unwrap_err();
    assert!(err.to_string().contains("RuntimeError"));
}

// Invariant: var x = E; x equals E
#[test]
fn var_binding_is_transparent() {
    assert_eq!(number("var x = 3 + 4; x"), number("3 + 4"));
}

// Invariant: change round-trips list identity
#[test]
fn change_round_trip_leaves_list_shape_unchanged() {
    assert_eq!(
        list("var L = [1, 2, 3]; change(L, 1, L / 1); L"),
        vec![1.0, 2.0, 3.0]
    );
}

// Invariant: len over every value kind
#[test]
fn len_of_empty_string_list_and_any_number() {
    assert_eq!(number(r#"len("")"#), 0.0);
    assert_eq!(number("len([])"), 0.0);
    assert_eq!(number("len(42)"), 1.0);
}

// Invariant: double negation of truthiness
#[test]
fn double_negation_is_truthiness_coercion() {
    assert_eq!(number("!!5"), 1.0);
    assert_eq!(number("!!0"), 0.0);
}

// Invariant: TRUE/FALSE short-circuit coercion
#[test]
fn logic_operators_coerce_to_zero_or_one() {
    assert_eq!(number("TRUE && 5"), 1.0);
    assert_eq!(number("FALSE || 5"), 1.0);
    assert_eq!(number("FALSE && 5"), 0.0);
}

// Round-trip: integer add/subtract
#[test]
fn integer_add_then_subtract_round_trips() {
    assert_eq!(number("(7 + 12) - 12"), 7.0);
}

// Round-trip: string repeat by zero and length scaling
#[test]
fn string_repeat_length_scales() {
    assert_eq!(text(r#""ab" * 0"#), "");
    assert_eq!(text(r#""ab" * 3"#).len(), 6);
}

// Round-trip: list concatenation length
#[test]
fn list_concat_length_is_additive() {
    assert_eq!(list("[1, 2] * [3, 4, 5]").len(), 5);
}

// Round-trip: counting up and down for-loops
#[test]
fn for_loop_counts_up_and_down() {
    assert_eq!(list("for i from 0 to 4 do i end"), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(list("for i from 4 to 0 step -1 do i end"), vec![4.0, 3.0, 2.0, 1.0]);
}

// break/continue reaching a function call boundary collapses to null (0).
#[test]
fn break_outside_any_loop_is_accepted_as_null() {
    let src = r#"
var f = function () do
    break
end
f()
"#;
    assert_eq!(number(src), 0.0);
}

// The root environment persists bindings across sequential `run` calls
// (the REPL's `ans` and shared-state contract), not just within one source.
#[test]
fn root_environment_persists_bindings_across_runs() {
    let root = new_root_environment();
    gomeo::run("<test>", "var x = 41", &root).unwrap();
    let v = gomeo::run("<test>", "x + 1", &root).unwrap();
    assert!(matches!(v.kind, ValueKind::Number(n) if n == 42.0));

    let ans = gomeo::run("<test>", "ans", &root).unwrap();
    assert!(matches!(ans.kind, ValueKind::Number(n) if n == 41.0));
}

#[test]
fn while_loop_collects_values_until_condition_fails() {
    let src = r#"
var i = 0
var result = while i < 3 do
    var v = i
    i = i + 1
    v
end
result
"#;
    assert_eq!(list(src), vec![0.0, 1.0, 2.0]);
}

#[test]
fn closures_capture_their_defining_environment() {
    let src = r#"
var makeAdder = function (n) do
    return function (m) do return n + m end
end
var addFive = makeAdder(5)
addFive(10)
"#;
    assert_eq!(number(src), 15.0);
}

#[test]
fn undefined_variable_reports_a_runtime_error() {
    let root = new_root_environment();
    let err = gomeo::run("<test>", "doesNotExist", &root).unwrap_err();
    assert!(err.to_string().contains("RuntimeError"));
}

#[test]
fn division_by_zero_is_a_runtime_error_not_a_panic() {
    let root = new_root_environment();
    assert!(gomeo::run("<test>", "1 / 0", &root).is_err());
}
