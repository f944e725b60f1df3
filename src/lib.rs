//! Lexer, parser and tree-walking evaluator for a small expression-oriented
//! language with first-class lambdas.
//!
//! ```
//! let result = lam::run("add = lambda (a, b) a + b; add(3, 4)").unwrap();
//! assert_eq!(result, lam::Object::Number(7.0));
//! ```

pub mod ast;
pub mod cursor;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod native;
pub mod object;
pub mod parser;
mod stack;
pub mod token;

use std::io::Write;

pub use crate::ast::Expression;
pub use crate::env::Env;
pub use crate::error::{Error, ErrorKind};
pub use crate::evaluator::Evaluator;
pub use crate::lexer::Lexer;
pub use crate::native::native;
pub use crate::object::Object;
pub use crate::parser::Parser;

/// Parses a whole source text into a `Program` node.
pub fn parse(source: &str) -> Result<Expression, Error> {
    Parser::new(Lexer::new(source)).parse_toplevel()
}

/// Parses and evaluates `source` in a fresh global scope, printing to stdout.
pub fn run(source: &str) -> Result<Object, Error> {
    run_with(source, &mut Evaluator::new())
}

pub fn run_with<W: Write>(source: &str, evaluator: &mut Evaluator<W>) -> Result<Object, Error> {
    let program = parse(source)?;
    let env = Env::from(native());
    let result = evaluator.evaluate(&program, &env)?;
    evaluator.flush()?;
    Ok(result)
}
