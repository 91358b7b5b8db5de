use crate::backend::assembler::Lowering;
use crate::backend::ast::{Inst, Program};

/// Renders a lowering as assembly text. A lowered program is one instruction per line with no
/// trailing newline; a stub is `halt` followed by a newline.
pub fn codegen(lowering: &Lowering) -> String {
    match lowering {
        Lowering::Program(program) => assemble_program(program),
        Lowering::Stub(_) => format!("{}\n", Inst::Halt),
    }
}

fn assemble_program(program: &Program) -> String {
    program
        .body
        .iter()
        .map(Inst::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
