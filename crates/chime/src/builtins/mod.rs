//! Bootstrap bindings: the overloads every new engine is seeded with.
//!
//! One module per concern, in the same spirit as the script-visible surface:
//! arithmetic and comparison over the numeric primitives, the assignment
//! operator family, strings, the three containers, and `print`. All of it
//! goes through the same registry a host extends.

pub(crate) mod arithmetic;
pub(crate) mod assign;
pub(crate) mod map;
pub(crate) mod print;
pub(crate) mod range;
pub(crate) mod strings;
pub(crate) mod vector;

use crate::{
    engine::Engine,
    function::FnValue,
    pod::PodView,
    value::BoxedValue,
};

/// Maximum container nesting rendered before eliding; self-referential
/// containers would otherwise recurse forever.
const MAX_RENDER_DEPTH: usize = 32;

/// Seeds a freshly constructed engine.
pub(crate) fn install(engine: &Engine) {
    arithmetic::install(engine);
    assign::install(engine);
    strings::install(engine);
    vector::install(engine);
    map::install(engine);
    range::install(engine);
    print::install(engine);
}

/// Renders any boxed value for `print` and `to_string`.
pub(crate) fn display_value(value: &BoxedValue, engine: &Engine) -> String {
    render(value, engine, 0)
}

fn render(value: &BoxedValue, engine: &Engine, depth: usize) -> String {
    if depth > MAX_RENDER_DEPTH {
        return "...".to_owned();
    }
    if value.is_void() {
        return "<void>".to_owned();
    }
    if value.is::<bool>() {
        return match value.clone_as::<bool>() {
            Ok(true) => "true".to_owned(),
            Ok(false) => "false".to_owned(),
            Err(_) => "<bool>".to_owned(),
        };
    }
    if value.is::<char>() {
        return value.clone_as::<char>().map_or_else(|_| "<char>".to_owned(), String::from);
    }
    if value.is::<String>() {
        return value.clone_as::<String>().unwrap_or_else(|_| "<String>".to_owned());
    }
    if let Ok(pod) = PodView::from_boxed(value) {
        return match pod {
            PodView::Int(v) => v.to_string(),
            PodView::Float(v) => ryu::Buffer::new().format(v).to_owned(),
        };
    }
    if value.is::<vector::Vector>() {
        return value
            .with_ref::<vector::Vector, _>(|v| {
                let elements = v
                    .0
                    .iter()
                    .map(|element| render(element, engine, depth + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{elements}]")
            })
            .unwrap_or_else(|_| "[...]".to_owned());
    }
    if value.is::<map::Map>() {
        return value
            .with_ref::<map::Map, _>(|m| {
                if m.0.is_empty() {
                    return "[:]".to_owned();
                }
                let pairs = m
                    .0
                    .iter()
                    .map(|(key, entry)| format!("{key}: {}", render(entry, engine, depth + 1)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{pairs}]")
            })
            .unwrap_or_else(|_| "[...]".to_owned());
    }
    if value.is::<range::Range>() {
        return value
            .with_ref::<range::Range, _>(|r| format!("{}..{}", r.lo, r.hi))
            .unwrap_or_else(|_| "<Range>".to_owned());
    }
    if value.is::<FnValue>() {
        return "<function>".to_owned();
    }
    format!("<{}>", engine.type_display(value.type_info()))
}
