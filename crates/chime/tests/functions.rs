//! Script functions, lambdas, closures, and the call-depth guard.

use chime::{Engine, ErrorKind};
use pretty_assertions::assert_eq;

fn eval_i64(source: &str) -> i64 {
    let engine = Engine::new();
    engine.eval_string(source).unwrap().clone_as::<i64>().unwrap()
}

#[test]
fn recursive_factorial() {
    let source = "def fact(n) { if (n <= 1) { 1 } else { n * fact(n - 1) } } fact(5);";
    assert_eq!(eval_i64(source), 120);
}

#[test]
fn lambda_is_a_first_class_value() {
    assert_eq!(eval_i64("var f = fun(x) { x * x }; f(7);"), 49);
    assert_eq!(eval_i64("var add = fun(a, b) { a + b }; add(2, 3);"), 5);
}

#[test]
fn function_falls_through_to_its_body_value() {
    assert_eq!(eval_i64("def sq(x) { x * x } sq(6);"), 36);
}

#[test]
fn empty_body_yields_void() {
    let engine = Engine::new();
    let result = engine.eval_string("def noop() { } noop();").unwrap();
    assert!(result.is_void());
}

#[test]
fn return_short_circuits_the_body() {
    let source = "def clamp(x) { if (x > 10) { return 10; } x } clamp(50) + clamp(3);";
    assert_eq!(eval_i64(source), 13);
}

#[test]
fn return_escapes_nested_loops() {
    let source = "
        def first_multiple(k) {
            for (var i = 1; i < 100; i = i + 1) {
                if (i * k > 20) { return i; }
            }
            0
        }
        first_multiple(6);
    ";
    assert_eq!(eval_i64(source), 4);
}

#[test]
fn closures_capture_the_defining_scope_by_reference() {
    let source = "var c = 0; var inc = fun(x) { c = c + x; }; inc(2); inc(3); c;";
    assert_eq!(eval_i64(source), 5);
}

#[test]
fn captured_frames_outlive_their_call() {
    let source = "
        def make_counter() {
            var n = 0;
            fun() { n = n + 1; n; }
        }
        var tick = make_counter();
        tick();
        tick();
    ";
    assert_eq!(eval_i64(source), 2);
}

#[test]
fn counters_from_separate_calls_are_independent() {
    let source = "
        def make_counter() {
            var n = 0;
            fun() { n = n + 1; n; }
        }
        var a = make_counter();
        var b = make_counter();
        a();
        a();
        b();
    ";
    assert_eq!(eval_i64(source), 1);
}

#[test]
fn redefinition_replaces_the_matching_overload() {
    assert_eq!(eval_i64("def f() { 1 } def f() { 2 } f();"), 2);
}

#[test]
fn definitions_of_different_arity_coexist() {
    assert_eq!(eval_i64("def f(a) { a } def f(a, b) { a * b } f(3) + f(3, 4);"), 15);
}

#[test]
fn lambda_arity_mismatch_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_string("var f = fun(x) { x }; f(1, 2);").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert!(err.reason().contains("expects 1"));
}

#[test]
fn calling_a_non_function_binding_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_string("var x = 3; x(1);").unwrap_err();
    assert!(err.reason().contains("not a function"));
}

#[test]
fn unknown_function_name_is_a_dispatch_error() {
    let engine = Engine::new();
    let err = engine.eval_string("missing(1);").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DispatchError);
    assert!(err.reason().contains("missing"));
}

#[test]
fn break_escaping_a_function_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_string("def f() { break; } f();").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert!(err.reason().contains("Non-loop break"));
}

#[test]
fn runaway_recursion_hits_the_depth_guard() {
    let engine = Engine::new();
    let err = engine.eval_string("def spin(n) { spin(n + 1) } spin(0);").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert!(err.reason().contains("maximum call depth"));
}

#[test]
fn functions_defined_inside_functions_register_globally() {
    let source = "def outer() { def inner(x) { x + 1 } inner(1) } outer() + inner(10);";
    assert_eq!(eval_i64(source), 13);
}

#[test]
fn definitions_persist_across_eval_calls() {
    let engine = Engine::new();
    engine.eval_string("def twice(x) { x * 2 }").unwrap();
    let result = engine.eval_string("twice(21);").unwrap();
    assert_eq!(result.clone_as::<i64>().unwrap(), 42);
}
