pub mod ast;
pub mod ast_printer;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod span;
pub mod token;
