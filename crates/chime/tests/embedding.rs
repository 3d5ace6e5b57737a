//! The host embedding contract: globals, shared values, files, and the
//! structured error surface.

use std::{cell::RefCell, env, fs, rc::Rc};

use chime::{BoxedValue, CollectStringPrint, Engine, ErrorKind};
use pretty_assertions::assert_eq;

#[test]
fn set_and_get_globals() {
    let engine = Engine::new();
    engine.set_global("x", BoxedValue::new(41_i64));
    engine.eval_string("x = x + 1;").unwrap();
    assert_eq!(engine.get_global("x").unwrap().clone_as::<i64>().unwrap(), 42);
    assert!(engine.get_global("missing").is_none());
}

#[test]
fn shared_host_objects_preserve_identity() {
    let engine = Engine::new();
    let host = Rc::new(RefCell::new(10_i64));
    let first = engine.wrap_shared(host.clone());
    let second = engine.wrap_shared(host.clone());
    assert_eq!(first.data_address(), second.data_address());
    assert_eq!(engine.cache_size(), 1);

    // Script-side mutation is visible to the host through the shared cell.
    engine.set_global("h", first);
    engine.eval_string("h += 5;").unwrap();
    assert_eq!(*host.borrow(), 15);
}

#[test]
fn cache_cull_drops_orphaned_entries() {
    let engine = Engine::new();
    let host = Rc::new(RefCell::new(1_i64));
    let boxed = engine.wrap_shared(host.clone());
    engine.cull_cache();
    assert_eq!(engine.cache_size(), 1);

    drop(host);
    drop(boxed);
    engine.cull_cache();
    assert_eq!(engine.cache_size(), 0);
}

#[test]
fn borrowed_host_values_dangle_safely() {
    let engine = Engine::new();
    let host = Rc::new(RefCell::new(10_i64));
    engine.set_global("h", BoxedValue::from_ref(&host));
    let result = engine.eval_string("h + 1;").unwrap();
    assert_eq!(result.clone_as::<i64>().unwrap(), 11);

    drop(host);
    assert!(engine.eval_string("h + 1;").is_err());
}

#[test]
fn eval_file_reports_the_path_in_errors() {
    let path = env::temp_dir().join(format!("chime_embed_{}.chi", std::process::id()));
    fs::write(&path, "var total = 6 * 7;\ntotal;\n").unwrap();
    let engine = Engine::new();
    let result = engine.eval_file(&path).unwrap();
    assert_eq!(result.clone_as::<i64>().unwrap(), 42);

    fs::write(&path, "var = 1;").unwrap();
    let err = engine.eval_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseError);
    assert_eq!(err.file(), Some(path.to_string_lossy().as_ref()));

    fs::remove_file(&path).unwrap();
}

#[test]
fn missing_file_is_an_error() {
    let engine = Engine::new();
    let err = engine.eval_file("/definitely/not/here.chi").unwrap_err();
    assert!(err.reason().contains("can not read"));
}

#[test]
fn print_output_goes_to_the_provided_writer() {
    let engine = Engine::new();
    let mut print = CollectStringPrint::new();
    engine
        .eval_string_as("for (var i = 0; i < 3; i = i + 1) { print(i); }", "loop.chi", &mut print)
        .unwrap();
    assert_eq!(print.into_output(), "0\n1\n2\n");
}

#[test]
fn exceptions_serialize_with_location_fields() {
    let engine = Engine::new();
    let err = engine
        .eval_string_as("var = 1;", "bad.chi", &mut chime::NoPrint)
        .unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["kind"], "ParseError");
    assert_eq!(json["file"], "bad.chi");
    assert_eq!(json["line"], 1);
    assert_eq!(json["column"], 5);
    assert!(json["reason"].as_str().unwrap().contains("expected identifier"));
}

#[test]
fn eval_errors_carry_the_failing_location() {
    let engine = Engine::new();
    let err = engine
        .eval_string_as("var ok = 1;\nnope;", "where.chi", &mut chime::NoPrint)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EvalError);
    assert_eq!(err.file(), Some("where.chi"));
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(1));
}

#[test]
fn engine_display_matches_print_rendering() {
    let engine = Engine::new();
    let value = engine.eval_string("[1, \"two\", [3]];").unwrap();
    assert_eq!(engine.display(&value), "[1, two, [3]]");
    let value = engine.eval_string("[\"a\": 1];").unwrap();
    assert_eq!(engine.display(&value), "[a: 1]");
    assert_eq!(engine.display(&BoxedValue::void()), "<void>");
}

#[test]
fn registered_type_names_appear_in_display() {
    #[derive(Debug)]
    struct Widget;

    let engine = Engine::new();
    engine.add_type("Widget", chime::TypeInfo::of::<Widget>());
    assert_eq!(engine.display(&BoxedValue::new(Widget)), "<Widget>");
    assert_eq!(engine.type_named("Widget"), Some(chime::TypeInfo::of::<Widget>()));
}
