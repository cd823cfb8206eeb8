pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod registers;
pub mod template;

use error::Result;
use interpreter::Value;

/// Parses and runs `source` with the default step limit, returning the
/// program's terminal value.
pub fn interpret(source: &str) -> Result<Value> {
    let program = parser::parse_program(source)?;
    Ok(interpreter::run(&program)?.value)
}
