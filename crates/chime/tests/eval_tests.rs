//! End-to-end evaluation through the public `Engine` API.

use chime::{CollectStringPrint, Engine, ErrorKind};
use pretty_assertions::assert_eq;

fn eval_i64(source: &str) -> i64 {
    let engine = Engine::new();
    engine
        .eval_string(source)
        .unwrap()
        .clone_as::<i64>()
        .unwrap_or_else(|err| panic!("expected i64 result for {source:?}: {err}"))
}

fn eval_bool(source: &str) -> bool {
    let engine = Engine::new();
    engine.eval_string(source).unwrap().clone_as::<bool>().unwrap()
}

fn eval_f64(source: &str) -> f64 {
    let engine = Engine::new();
    engine.eval_string(source).unwrap().clone_as::<f64>().unwrap()
}

fn eval_string(source: &str) -> String {
    let engine = Engine::new();
    engine.eval_string(source).unwrap().clone_as::<String>().unwrap()
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(eval_i64("var x = 1 + 2 * 3;"), 7);
    assert_eq!(eval_i64("(1 + 2) * 3;"), 9);
    assert_eq!(eval_i64("10 - 2 - 3;"), 5);
    assert_eq!(eval_i64("2 * 3 * 4;"), 24);
}

#[test]
fn assignment_binds_and_yields_the_value() {
    let engine = Engine::new();
    let result = engine.eval_string("var x = 1 + 2 * 3;").unwrap();
    assert_eq!(result.clone_as::<i64>().unwrap(), 7);
    assert_eq!(engine.get_global("x").unwrap().clone_as::<i64>().unwrap(), 7);
}

#[test]
fn integer_division_truncates() {
    assert_eq!(eval_i64("7 / 2;"), 3);
    assert_eq!(eval_i64("(0 - 7) / 2;"), -3);
}

#[test]
fn division_by_zero_is_an_eval_error() {
    let engine = Engine::new();
    let err = engine.eval_string("1 / 0;").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert!(err.reason().contains("division by zero"));
}

#[test]
fn mixed_arithmetic_promotes_to_float() {
    assert_eq!(eval_f64("1 + 0.5;"), 1.5);
    assert_eq!(eval_f64("1.5 * 2;"), 3.0);
}

#[test]
fn comparisons_and_boolean_operators() {
    assert!(eval_bool("1 < 2;"));
    assert!(eval_bool("2 <= 2;"));
    assert!(!eval_bool("1 == 2;"));
    assert!(eval_bool("1 != 2;"));
    assert!(!eval_bool("true && false;"));
    assert!(eval_bool("true || false;"));
    assert!(!eval_bool("!true;"));
}

#[test]
fn unary_minus() {
    assert_eq!(eval_i64("-5;"), -5);
    assert_eq!(eval_i64("3 + -2;"), 1);
}

#[test]
fn string_operations() {
    assert_eq!(eval_string("\"foo\" + \"bar\";"), "foobar");
    assert_eq!(eval_string("\"ab\" + 'c';"), "abc");
    assert_eq!(eval_i64("\"abc\".size();"), 3);
    assert!(eval_bool("\"a\" < \"b\";"));
    assert!(eval_bool("\"x\" == \"x\";"));
    assert_eq!(eval_string("to_string(12) + \"!\";"), "12!");
}

#[test]
fn string_escapes() {
    assert_eq!(eval_string("\"a\\tb\\n\";"), "a\tb\n");
    assert_eq!(eval_string("\"quote: \\\"\";"), "quote: \"");
}

#[test]
fn if_selects_the_matching_branch() {
    assert_eq!(eval_i64("if (true) { 1 } else { 2 }"), 1);
    assert_eq!(eval_i64("if (false) { 1 } else { 2 }"), 2);
    assert_eq!(eval_i64("var x = 9; if (x > 5) { 100 } else if (x > 1) { 10 } else { 1 }"), 100);
}

#[test]
fn if_without_else_yields_void() {
    let engine = Engine::new();
    let result = engine.eval_string("if (false) { 1 }").unwrap();
    assert!(result.is_void());
}

#[test]
fn while_loop_with_break() {
    assert_eq!(eval_i64("var i = 0; while (true) { i = i + 1; if (i == 3) { break; } } i;"), 3);
    assert_eq!(eval_i64("var i = 0; while (i < 4) { i = i + 1; } i;"), 4);
}

#[test]
fn for_loop_accumulates() {
    assert_eq!(eval_i64("var s = 0; for (var i = 0; i < 5; i = i + 1) { s = s + i; } s;"), 10);
}

#[test]
fn for_loop_variable_does_not_leak() {
    let engine = Engine::new();
    engine.eval_string("for (var i = 0; i < 3; i = i + 1) { }").unwrap();
    let err = engine.eval_string("i;").unwrap_err();
    assert!(err.reason().contains("Can not find object"));
}

#[test]
fn non_loop_break_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_string("break;").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert!(err.reason().contains("Non-loop break"));
}

#[test]
fn unbound_identifier_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_string("nope;").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert!(err.reason().contains("Can not find object: 'nope'"));
}

#[test]
fn inline_vector_indexing() {
    assert_eq!(eval_i64("var v = [10, 20, 30]; v[1] + v[2];"), 50);
    assert_eq!(eval_i64("var v = [1, 2, 3]; v.size();"), 3);
}

#[test]
fn vector_index_out_of_range() {
    let engine = Engine::new();
    let err = engine.eval_string("var v = [1]; v[5];").unwrap_err();
    assert!(err.reason().contains("out of range"));
}

#[test]
fn element_assignment_writes_through_the_view() {
    assert_eq!(eval_i64("var v = [1, 2]; v[0] = 9; v[0];"), 9);
    assert_eq!(eval_i64("var v = [1, 2]; v[1] += 8; v[1];"), 10);
}

#[test]
fn binding_copies_have_value_semantics() {
    assert_eq!(eval_i64("var v = [1]; var w = v; w.push_back(2); v.size();"), 1);
    assert_eq!(eval_i64("var a = 5; var b = a; b = 7; a;"), 5);
}

#[test]
fn compound_assignment_on_variables() {
    assert_eq!(eval_i64("var x = 10; x += 5; x;"), 15);
    assert_eq!(eval_i64("var x = 10; x -= 4; x *= 2; x /= 3; x;"), 4);
}

#[test]
fn chained_assignment_is_right_associative() {
    assert_eq!(eval_i64("var a = 0; var b = 0; a = b = 3; a + b;"), 6);
}

#[test]
fn inline_map_lookup() {
    assert_eq!(eval_i64("var m = [\"a\": 1, \"b\": 2]; m[\"a\"] + m.size();"), 3);
    assert!(eval_bool("var m = [\"k\": 1]; m.contains(\"k\");"));
}

#[test]
fn map_missing_key_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_string("var m = [\"a\": 1]; m[\"b\"];").unwrap_err();
    assert!(err.reason().contains("no entry for key 'b'"));
}

#[test]
fn range_bounds() {
    assert_eq!(eval_i64("var r = 1..4; r.begin() + r.end();"), 5);
    assert_eq!(eval_i64("(1..4).size();"), 3);
}

#[test]
fn field_access_is_method_sugar() {
    assert_eq!(eval_i64("var v = [1, 2, 3]; v.size;"), 3);
}

#[test]
fn shadowing_in_nested_blocks() {
    assert_eq!(eval_i64("var x = 1; { var x = 2; } x;"), 1);
    assert_eq!(eval_i64("var x = 1; { x = 2; } x;"), 2);
}

#[test]
fn top_level_return_yields_the_script_result() {
    assert_eq!(eval_i64("return 5; 9;"), 5);
}

#[test]
fn print_renders_through_the_writer() {
    let engine = Engine::new();
    let mut print = CollectStringPrint::new();
    engine
        .eval_string_as("print(42); print(\"hi\"); print(1.5); print([1, 2]);", "t.chi", &mut print)
        .unwrap();
    assert_eq!(print.output(), "42\nhi\n1.5\n[1, 2]\n");
}

#[test]
fn globals_persist_across_eval_calls() {
    let engine = Engine::new();
    engine.eval_string("var counter = 1;").unwrap();
    engine.eval_string("counter = counter + 1;").unwrap();
    let result = engine.eval_string("counter;").unwrap();
    assert_eq!(result.clone_as::<i64>().unwrap(), 2);
}

#[test]
fn engine_stays_usable_after_an_error() {
    let engine = Engine::new();
    assert!(engine.eval_string("var x = 1; { { nope; } }").unwrap_err().reason().contains("nope"));
    assert_eq!(engine.eval_string("x;").unwrap().clone_as::<i64>().unwrap(), 1);
}

#[test]
fn annotations_are_ignored_by_evaluation() {
    assert_eq!(eval_i64("# leading comment\nvar x = 1; # trailing line\nx + 1;"), 2);
}

#[test]
fn empty_script_yields_void() {
    let engine = Engine::new();
    assert!(engine.eval_string("").unwrap().is_void());
}

#[test]
fn uninitialised_declaration_is_void() {
    let engine = Engine::new();
    assert!(engine.eval_string("var x; x;").unwrap().is_void());
}

#[test]
fn string_compound_append() {
    assert_eq!(eval_string("var s = \"a\"; s += \"b\"; s += 'c'; s;"), "abc");
}

#[test]
fn vector_pop_back_returns_the_last_element() {
    assert_eq!(eval_i64("var v = [1, 2, 3]; v.pop_back() + v.size();"), 5);
    let engine = Engine::new();
    let err = engine.eval_string("[].pop_back();").unwrap_err();
    assert!(err.reason().contains("empty"));
}

#[test]
fn assigning_across_numeric_kinds_keeps_the_target_type() {
    // A float stored into an integer element truncates, like the host cast.
    assert_eq!(eval_i64("var v = [10]; v[0] = 7.9; v[0];"), 7);
}
