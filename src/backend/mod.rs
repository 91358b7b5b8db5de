pub mod analysis;
pub mod assembler;
pub mod ast;
pub mod codegen;
