use crate::backend::ast::{Address, Inst, Program};
use crate::frontend::ast::{Expr, ExprKind, Function, Stmt, StmtKind};
use crate::frontend::span::Span;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of lowering one function.
#[derive(Debug, Clone, PartialEq)]
pub enum Lowering {
    /// The body matched the literal return pattern.
    Program(Program),
    /// The body is outside what can be lowered; only `halt` is emitted.
    Stub(Unsupported),
}

/// Why a function could not be lowered.
#[derive(Debug, Clone, PartialEq)]
pub struct Unsupported {
    pub kind: UnsupportedKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnsupportedKind {
    NoReturn,
    ResultCount(usize),
    NonLiteral(&'static str),
}

impl Display for Unsupported {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            UnsupportedKind::NoReturn => write!(f, "function body has no return statement"),
            UnsupportedKind::ResultCount(n) => {
                write!(f, "return must have exactly one result, found {}", n)
            }
            UnsupportedKind::NonLiteral(shape) => {
                write!(f, "cannot lower {}; only integer literals are supported", shape)
            }
        }
    }
}

impl Error for Unsupported {}

/// Lowers the first `return` of the body. Only `return <integer literal>` produces code; every
/// other shape yields a stub carrying the reason.
pub fn assemble(func: &Function) -> Lowering {
    match assemble_function(func) {
        Ok(body) => Lowering::Program(Program::new(func.name.clone(), body)),
        Err(unsupported) => {
            tracing::debug!(function = %func.name, reason = %unsupported, "emitting halt-only stub");
            Lowering::Stub(unsupported)
        }
    }
}

fn assemble_function(func: &Function) -> Result<Vec<Inst>, Unsupported> {
    let ret = func
        .body
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::Return(results) => Some((stmt, results)),
            StmtKind::Expr(_) => None,
        })
        .ok_or(Unsupported {
            kind: UnsupportedKind::NoReturn,
            span: func.span,
        })?;
    assemble_return(ret.0, ret.1)
}

fn assemble_return(stmt: &Stmt, results: &[Expr]) -> Result<Vec<Inst>, Unsupported> {
    let [expr] = results else {
        return Err(Unsupported {
            kind: UnsupportedKind::ResultCount(results.len()),
            span: stmt.span,
        });
    };
    let mut instructions = vec![];
    assemble_expression(&mut instructions, expr)?;
    instructions.push(Inst::Pop(Address::RETURN));
    instructions.push(Inst::Halt);
    Ok(instructions)
}

fn assemble_expression(instructions: &mut Vec<Inst>, expr: &Expr) -> Result<(), Unsupported> {
    match &expr.kind {
        ExprKind::IntLit(text) => {
            instructions.push(Inst::PushI(text.clone()));
            Ok(())
        }
        // TODO: lower parameter references by reading Address::PARAMS.
        kind @ (ExprKind::Ident(_)
        | ExprKind::Unary(..)
        | ExprKind::Binary(..)
        | ExprKind::Paren(_)) => Err(Unsupported {
            kind: UnsupportedKind::NonLiteral(kind.describe()),
            span: expr.span,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse_source;
    use pretty_assertions::assert_eq;

    fn lower(src: &str) -> Lowering {
        assemble(&parse_source(src).unwrap())
    }

    fn stub_kind(src: &str) -> UnsupportedKind {
        match lower(src) {
            Lowering::Stub(unsupported) => unsupported.kind,
            other => panic!("expected stub, got {other:?}"),
        }
    }

    #[test]
    fn literal_return_lowers_to_three_instructions() {
        let Lowering::Program(program) = lower("func f(x, y byte) byte { return 5 }") else {
            panic!("expected program");
        };
        assert_eq!(program.name, "f");
        assert_eq!(
            program.body,
            vec![Inst::PushI("5".into()), Inst::Pop(Address::RETURN), Inst::Halt]
        );
    }

    #[test]
    fn statements_before_the_return_are_skipped() {
        assert!(matches!(
            lower("func f(x, y byte) byte { x + y; return 7; return x }"),
            Lowering::Program(p) if p.body[0] == Inst::PushI("7".into())
        ));
    }

    #[test]
    fn only_the_first_return_counts() {
        assert_eq!(
            stub_kind("func f(x, y byte) byte { return x; return 1 }"),
            UnsupportedKind::NonLiteral("identifier")
        );
    }

    #[test]
    fn reports_each_unsupported_shape() {
        assert_eq!(stub_kind("func f(x, y byte) byte {}"), UnsupportedKind::NoReturn);
        assert_eq!(stub_kind("func f(x, y byte) byte { x }"), UnsupportedKind::NoReturn);
        assert_eq!(stub_kind("func f(x, y byte) byte { return }"), UnsupportedKind::ResultCount(0));
        assert_eq!(
            stub_kind("func f(x, y byte) byte { return 1, 2 }"),
            UnsupportedKind::ResultCount(2)
        );
        assert_eq!(
            stub_kind("func f(x, y byte) byte { return x + y }"),
            UnsupportedKind::NonLiteral("binary expression")
        );
        assert_eq!(
            stub_kind("func f(x, y byte) byte { return -5 }"),
            UnsupportedKind::NonLiteral("unary expression")
        );
        assert_eq!(
            stub_kind("func f(x, y byte) byte { return (5) }"),
            UnsupportedKind::NonLiteral("parenthesized expression")
        );
    }

    #[test]
    fn stub_points_at_offending_expression() {
        let Lowering::Stub(unsupported) = lower("func f(x, y byte) byte { return x + y }") else {
            panic!("expected stub");
        };
        assert_eq!(unsupported.span, Span::new(32, 37));
        assert_eq!(
            unsupported.to_string(),
            "cannot lower binary expression; only integer literals are supported"
        );
    }
}
