//! The error surface shared by the parser, the evaluator, and the host.

use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::expressions::{CodeLoc, Span};

/// Result type alias for operations that can produce a runtime error.
pub(crate) type RunResult<T> = Result<T, Exception>;

/// Classification of errors delivered to the host.
///
/// The set is closed; the string form of each variant matches its name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, serde::Serialize, serde::Deserialize,
)]
pub enum ErrorKind {
    /// Malformed source. The parser is non-recovering: the first error aborts.
    ParseError,
    /// Runtime failure: unbound identifier, arity mismatch, bad condition,
    /// division by zero, a `break` outside any loop.
    EvalError,
    /// A boxed value did not hold the requested type.
    BadBoxedCast,
    /// No registered overload matched a name and argument list.
    DispatchError,
}

/// A structured error as delivered to the host.
///
/// Carries the error classification, a human-readable reason, and — when a
/// source location is known — the script name and 1-based line/column.
/// Serialises to JSON with exactly those fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Exception {
    kind: ErrorKind,
    reason: String,
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
}

impl Exception {
    pub(crate) fn new(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    /// Creates an evaluation error with no source location.
    ///
    /// This is the constructor host-registered callables use; the evaluator
    /// attaches the location of the offending call node as the error
    /// propagates.
    #[must_use]
    pub fn eval(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::EvalError, reason)
    }

    pub(crate) fn eval_at(reason: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::EvalError, reason).with_span(span)
    }

    pub(crate) fn parse(reason: impl Into<String>, file: &str, loc: CodeLoc) -> Self {
        let mut exc = Self::new(ErrorKind::ParseError, reason);
        exc.file = Some(file.to_owned());
        exc.line = Some(loc.line + 1);
        exc.column = Some(loc.column + 1);
        exc
    }

    /// Attaches a source position if none is recorded yet.
    ///
    /// Errors keep the innermost location: once line/column are set, outer
    /// frames must not overwrite them.
    pub(crate) fn with_span(mut self, span: Span) -> Self {
        if self.line.is_none() {
            self.line = Some(span.start.line + 1);
            self.column = Some(span.start.column + 1);
        }
        self
    }

    /// Attaches the script name if none is recorded yet.
    pub(crate) fn with_file(mut self, file: &str) -> Self {
        if self.file.is_none() {
            self.file = Some(file.to_owned());
        }
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The script name, when the error carries a source location.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// 1-based line number, when known.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// 1-based column number, when known.
    #[must_use]
    pub fn column(&self) -> Option<u32> {
        self.column
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            let file = self.file.as_deref().unwrap_or("<eval>");
            write!(f, " at {file}:{line}:{column}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}
