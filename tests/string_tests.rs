use gomeo::new_root_environment;
use gomeo::value::ValueKind;

fn eval(source: &str) -> gomeo::value::Value {
    let root = new_root_environment();
    gomeo::run("<test>", source, &root).expect("expected successful evaluation")
}

fn text(source: &str) -> String {
    match eval(source).kind {
        ValueKind::Str(s) => s,
        other => panic!("expected a string, got {other:?}"),
    }
}

fn number(source: &str) -> f64 {
    match eval(source).kind {
        ValueKind::Number(n) => n,
        other => panic!("expected a number, got {other:?}"),
    }
}

fn fails(source: &str) -> bool {
    let root = new_root_environment();
    gomeo::run("<test>", source, &root).is_err()
}

#[test]
fn concatenation() {
    assert_eq!(text(r#""foo" + "bar""#), "foobar");
}

#[test]
fn escapes_decode_and_unknown_escapes_are_literal() {
    assert_eq!(text(r#""a\nb""#), "a\nb");
    assert_eq!(text(r#""a\tb""#), "a\tb");
    assert_eq!(text(r#""a\\b""#), "a\\b");
    assert_eq!(text(r#""say \"hi\"""#), "say \"hi\"");
    assert_eq!(text(r#""a\qb""#), "aqb");
}

#[test]
fn repeat_by_number_matches_number_times_string() {
    assert_eq!(text(r#""ab" * 3"#), text(r#"3 * "ab""#));
}

#[test]
fn negative_repeat_count_is_empty_not_an_error() {
    assert_eq!(text(r#""ab" * -2"#), "");
}

#[test]
fn string_subtraction_and_division_are_unsupported() {
    assert!(fails(r#""ab" - "a""#));
    assert!(fails(r#""ab" / "a""#));
}

#[test]
fn string_times_string_is_unsupported() {
    assert!(fails(r#""ab" * "cd""#));
}

#[test]
fn lexicographic_ordering() {
    assert_eq!(number(r#""abc" < "abd""#), 1.0);
    assert_eq!(number(r#""abc" > "abd""#), 0.0);
}

// `>=` must be a true `>=`, not a copy of `<=` (the source's documented bug).
#[test]
fn greater_equals_is_not_an_alias_for_less_equals() {
    assert_eq!(number(r#""b" >= "a""#), 1.0);
    assert_eq!(number(r#""a" >= "b""#), 0.0);
    assert_eq!(number(r#""a" >= "a""#), 1.0);
}

#[test]
fn less_equals_still_behaves_correctly() {
    assert_eq!(number(r#""a" <= "b""#), 1.0);
    assert_eq!(number(r#""b" <= "a""#), 0.0);
}

#[test]
fn equality_compares_contents() {
    assert_eq!(number(r#""abc" == "abc""#), 1.0);
    assert_eq!(number(r#""abc" != "abd""#), 1.0);
}

#[test]
fn empty_string_is_falsy_nonempty_is_truthy() {
    assert_eq!(number(r#"!!"""#), 0.0);
    assert_eq!(number(r#"!!"x""#), 1.0);
}

#[test]
fn len_counts_characters() {
    assert_eq!(number(r#"len("hello")"#), 5.0);
    assert_eq!(number(r#"len("")"#), 0.0);
}

#[test]
fn unterminated_string_is_a_lexer_error() {
    let root = new_root_environment();
    let err = gomeo::run("<test>", "\"abc", &root).unwrap_err();
    assert!(err.to_string().contains("IllegalCharacterError"));
}
