#![doc = include_str!("../../../README.md")]

mod builtins;
mod dispatch;
mod engine;
mod eval;
mod exception;
mod expressions;
mod function;
mod intern;
mod io;
mod parse;
mod pod;
mod scope;
mod value;

pub use crate::{
    builtins::{map::Map, range::Range, vector::Vector},
    dispatch::{CallContext, Callable, NativeFn},
    engine::{DEFAULT_MAX_CALL_DEPTH, Engine},
    exception::{ErrorKind, Exception},
    expressions::CodeLoc,
    function::FnValue,
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    value::{BoxedValue, CastError, TypeInfo},
};
