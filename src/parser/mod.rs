mod expr;
mod parser;

pub use parser::*;
