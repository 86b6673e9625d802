pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use error::CompileError;
use lexer::Scanner;
use parser::Parser;

/// Compiles a source program to a WebAssembly text module in one pass.
/// When anything was reported, the partial module text is withheld and the
/// diagnostics are returned instead.
pub fn compile(source: &str) -> Result<String, CompileError> {
    log::debug!("compiling {} bytes of source", source.len());
    let scanner = Scanner::new(source);
    let parser = Parser::new(scanner);
    let (module, diagnostics) = parser.program();
    if diagnostics.is_empty() {
        log::debug!("emitted {} bytes of module text", module.len());
        Ok(module)
    } else {
        log::debug!("compilation failed with {} diagnostics", diagnostics.len());
        Err(CompileError::new(diagnostics))
    }
}
