//! The expression language: lexer, parser, tree, and evaluator.

mod ast;
mod eval;
mod lexer;
mod operators;
mod parser;

pub use ast::{Expr, Operator, Reference};
pub use eval::Evaluator;
pub use lexer::{Lexer, Spanned, Token};
pub use operators::apply as apply_operator;
pub use parser::{parse, parse_reference};
