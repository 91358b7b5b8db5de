//! A toy compiler for `func f(x, y byte) byte { ... }` targeting a small stack machine, plus
//! column-oriented user statistics.
//!
//! The compiler pipeline:
//! - `frontend::lexer` turns source text into tokens that keep literal text verbatim.
//! - `frontend::parser` builds a single [`Function`] node.
//! - `backend::analysis` checks the `(byte, byte) -> byte` signature, in strict mode only.
//! - `backend::assembler` recognises `return <integer literal>` and lowers it.
//! - `backend::codegen` renders `pushi`/`pop`/`halt` text.
//!
//! Anything other than a literal return compiles to a lone `halt` unless
//! [`CompileOptions::strict`] is set, in which case it is reported as an error.

pub mod backend;
pub mod frontend;
pub mod metrics;

use crate::backend::analysis::{SemanticError, check_signature};
use crate::backend::assembler::{Lowering, Unsupported, assemble};
use crate::backend::codegen::codegen;
use crate::frontend::ast::Function;
use crate::frontend::diagnostic::Diagnostic;
use crate::frontend::lexer::LexerError;
use crate::frontend::parser::{ParserError, parse_source};
use crate::frontend::source::SourceFile;
use crate::frontend::span::Span;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject unsupported bodies and wrong signatures instead of emitting `halt`.
    pub strict: bool,
}

/// Compiles a parsed function. Never fails: unsupported bodies become `halt\n`.
pub fn compile(func: &Function) -> Result<String, CompileError> {
    compile_with(func, CompileOptions::default())
}

pub fn compile_with(func: &Function, options: CompileOptions) -> Result<String, CompileError> {
    lower(func, options).map(|lowering| codegen(&lowering))
}

/// Runs the strict-mode checks and lowers `func` once. A [`Lowering::Stub`] is only returned in
/// lenient mode; callers that want to report the fallback inspect it before rendering.
pub fn lower(func: &Function, options: CompileOptions) -> Result<Lowering, CompileError> {
    if options.strict {
        check_signature(func)?;
    }
    match assemble(func) {
        Lowering::Stub(unsupported) if options.strict => Err(CompileError::Unsupported(unsupported)),
        lowering => Ok(lowering),
    }
}

/// Lexes, parses and compiles `src`.
pub fn compile_source(src: &str, options: CompileOptions) -> Result<String, CompileError> {
    let func = parse_source(src)?;
    compile_with(&func, options)
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Lexer(LexerError),
    Parser(ParserError),
    Semantic(SemanticError),
    Unsupported(Unsupported),
}

impl CompileError {
    /// Where in the source the error points; the end of input for a truncated file.
    pub fn span(&self, source: &SourceFile) -> Span {
        match self {
            CompileError::Lexer(err) => err.span(),
            CompileError::Parser(err) => err.span().unwrap_or_else(|| {
                let end = source.content.trim_end().len();
                Span::new(end, end)
            }),
            CompileError::Semantic(err) => err.span(),
            CompileError::Unsupported(unsupported) => unsupported.span,
        }
    }

    pub fn to_diagnostic(&self, source: Arc<SourceFile>) -> Diagnostic {
        let span = self.span(&source);
        Diagnostic::error(self.to_string(), source, span)
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lexer(err) => write!(f, "{}", err),
            CompileError::Parser(err) => write!(f, "{}", err),
            CompileError::Semantic(err) => write!(f, "{}", err),
            CompileError::Unsupported(unsupported) => write!(f, "{}", unsupported),
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompileError::Lexer(err) => Some(err),
            CompileError::Parser(err) => Some(err),
            CompileError::Semantic(err) => Some(err),
            CompileError::Unsupported(unsupported) => Some(unsupported),
        }
    }
}

impl From<LexerError> for CompileError {
    fn from(err: LexerError) -> Self {
        CompileError::Lexer(err)
    }
}

impl From<ParserError> for CompileError {
    fn from(err: ParserError) -> Self {
        CompileError::Parser(err)
    }
}

impl From<SemanticError> for CompileError {
    fn from(err: SemanticError) -> Self {
        CompileError::Semantic(err)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::assembler::UnsupportedKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn lenient_mode_degrades_to_halt() {
        test_utils::init_test_logging();
        let out = compile_source("func f(x, y byte) byte { return x }", CompileOptions::default());
        assert_eq!(out, Ok("halt\n".to_string()));
    }

    #[test]
    fn strict_mode_reports_unsupported_body() {
        let strict = CompileOptions { strict: true };
        let err = compile_source("func f(x, y byte) byte { return x * 2 }", strict).unwrap_err();
        let CompileError::Unsupported(unsupported) = &err else {
            panic!("expected unsupported, got {err:?}");
        };
        assert_eq!(unsupported.kind, UnsupportedKind::NonLiteral("binary expression"));
        assert_eq!(
            compile_source("func f(x, y byte) byte { return 9 }", strict),
            Ok("pushi 9\npop 0\nhalt".to_string())
        );
    }

    #[test]
    fn strict_mode_checks_signature_first() {
        let strict = CompileOptions { strict: true };
        let err = compile_source("func f(x int, y byte) byte { return 1 }", strict).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(SemanticError::ParamType { .. })));
        // Lenient mode leaves the signature to the caller.
        assert_eq!(
            compile_source("func f(x int, y byte) byte { return 1 }", CompileOptions::default()),
            Ok("pushi 1\npop 0\nhalt".to_string())
        );
    }

    #[test]
    fn lowering_once_matches_compiled_text() {
        let func = parse_source("func f(x, y byte) byte { return x + y }").unwrap();
        let lowering = lower(&func, CompileOptions::default()).unwrap();
        let Lowering::Stub(unsupported) = &lowering else {
            panic!("expected a stub, got {lowering:?}");
        };
        assert_eq!(unsupported.kind, UnsupportedKind::NonLiteral("binary expression"));
        assert_eq!(Ok(codegen(&lowering)), compile(&func));

        let strict = CompileOptions { strict: true };
        assert!(matches!(lower(&func, strict), Err(CompileError::Unsupported(_))));

        let func = parse_source("func f(x, y byte) byte { return 0x1A }").unwrap();
        let lowering = lower(&func, strict).unwrap();
        assert!(matches!(lowering, Lowering::Program(_)));
        assert_eq!(Ok(codegen(&lowering)), compile_with(&func, strict));
    }

    #[test]
    fn truncated_input_points_at_end() {
        let source = SourceFile::anonymous("func f(x, y byte) byte {\n  return 5\n");
        let err = compile_source(&source.content, CompileOptions::default()).unwrap_err();
        assert_eq!(err, CompileError::Parser(ParserError::Eot));
        assert_eq!(err.span(&source), Span::new(35, 35));
        assert_eq!(err.to_diagnostic(source).message, "unexpected end of input");
    }
}
