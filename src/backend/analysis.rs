use crate::backend::ast::Address;
use crate::frontend::ast::{Function, TypeName};
use crate::frontend::span::Span;

/// The only type the target machine knows about.
pub const BYTE: &str = "byte";

/// Checks that `func` has the calling convention the backend assumes: two `byte` parameters
/// mapped onto [`Address::PARAMS`] and a `byte` result.
pub fn check_signature(func: &Function) -> Result<(), SemanticError> {
    if func.params.len() != Address::PARAMS.len() {
        return Err(SemanticError::ParamCount(func.params.len(), func.span));
    }
    if let Some(param) = func.params.iter().find(|param| param.ty != BYTE) {
        return Err(SemanticError::ParamType {
            name: param.name.clone(),
            ty: param.ty.clone(),
            span: func.span,
        });
    }
    match &func.result {
        Some(ty) if ty == BYTE => Ok(()),
        other => Err(SemanticError::ResultType(other.clone(), func.span)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticError {
    ParamCount(usize, Span),
    ParamType {
        name: String,
        ty: TypeName,
        span: Span,
    },
    ResultType(Option<TypeName>, Span),
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::ParamCount(_, span)
            | SemanticError::ParamType { span, .. }
            | SemanticError::ResultType(_, span) => *span,
        }
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticError::ParamCount(n, _) => {
                write!(f, "expected {} parameters, found {}", Address::PARAMS.len(), n)
            }
            SemanticError::ParamType { name, ty, .. } => {
                write!(f, "parameter `{}` has type `{}`, expected `{}`", name, ty, BYTE)
            }
            SemanticError::ResultType(Some(ty), _) => {
                write!(f, "result has type `{}`, expected `{}`", ty, BYTE)
            }
            SemanticError::ResultType(None, _) => write!(f, "missing `{}` result type", BYTE),
        }
    }
}

impl std::error::Error for SemanticError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse_source;

    fn check(src: &str) -> Result<(), SemanticError> {
        check_signature(&parse_source(src).unwrap())
    }

    #[test]
    fn accepts_two_bytes_to_byte() {
        assert_eq!(check("func f(x, y byte) byte { return 5 }"), Ok(()));
        assert_eq!(check("func g(a byte, b byte) byte {}"), Ok(()));
    }

    #[test]
    fn rejects_other_signatures() {
        assert!(matches!(
            check("func f(x byte) byte {}"),
            Err(SemanticError::ParamCount(1, _))
        ));
        assert!(matches!(
            check("func f(x byte, y int) byte {}"),
            Err(SemanticError::ParamType { ref name, .. }) if name == "y"
        ));
        assert_eq!(
            check("func f(x, y byte) {}").unwrap_err().to_string(),
            "missing `byte` result type"
        );
        assert_eq!(
            check("func f(x, y byte) int {}").unwrap_err().to_string(),
            "result has type `int`, expected `byte`"
        );
    }
}
