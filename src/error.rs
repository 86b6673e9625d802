use std::fmt;

use thiserror::Error;

/// A single compile-time error, tagged with the source position of the
/// previously recognized token (where the offending construct ended).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub pos: usize,
    pub msg: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: line {} pos {}: {}", self.line, self.pos, self.msg)
    }
}

/// Returned by `compile` when one or more diagnostics were reported.
/// No output module exists in this case.
#[derive(Debug, Error)]
#[error("compilation failed with {} error(s)", .diagnostics.len())]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}
