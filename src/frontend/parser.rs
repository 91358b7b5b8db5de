use crate::frontend::ast::{
    BinaryOp, Block, Expr, ExprKind, Function, Param, Stmt, StmtKind, TypeName, UnaryOp,
};
use crate::frontend::parser::ParserError::UnexpectedToken;
use crate::frontend::span::Span;
use crate::frontend::token::{Keyword, Symbol, Token, TokenKind};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::vec::IntoIter;

macro_rules! match_keyword {
    ($self:ident, $keyword:expr $(, $keywords:expr)*) => {
        if let Some(tok) = $self.peek() {
            match tok.kind {
                TokenKind::Keyword(s) if s == $keyword $(|| s == $keywords)* => {
                    $self.advance();
                    Some((s, tok.span))
                },
                _ => None,
            }
        } else {
            None
        }
    };
}

macro_rules! match_symbol {
    ($self:ident, $symbol:expr $(, $symbols:expr)*) => {
        if let Some(tok) = $self.peek() {
            match tok.kind {
                TokenKind::Symbol(s) if s == $symbol $(|| s == $symbols)* => {
                    $self.advance();
                    Some((s, tok.span))
                },
                _ => None,
            }
        } else {
            None
        }
    };
}

/// Parses exactly one function definition. Statements may be separated by `;` or simply follow
/// one another; newlines carry no meaning.
#[derive(Debug)]
pub struct Parser {
    tokens: IntoIter<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let iter = tokens.into_iter();
        Parser { tokens: iter }
    }

    pub fn parse(&mut self) -> Result<Function, ParserError> {
        let func = self.parse_function()?;
        if let Some(token) = self.peek() {
            return Err(ParserError::UnconsumedToken(token));
        }
        tracing::trace!(name = %func.name, statements = func.body.len(), "parsed function");
        Ok(func)
    }

    pub fn parse_function(&mut self) -> Result<Function, ParserError> {
        let start = self.expect_keyword(Keyword::Func)?.span;
        let (name, _) = self.expect_ident()?;
        self.expect_symbol(Symbol::OpenParen)?;
        let params = self.parse_params()?;
        self.expect_symbol(Symbol::CloseParen)?;
        let result = self.parse_result_type()?;
        let (body, end) = self.parse_block()?;
        Ok(Function::new(name, params, result, body, start + end))
    }

    /// Parameter groups share their trailing type: `x, y byte, z int`.
    fn parse_params(&mut self) -> Result<Vec<Param>, ParserError> {
        let mut params = Vec::new();
        if matches!(self.peek_kind(), Some(TokenKind::Symbol(Symbol::CloseParen))) {
            return Ok(params);
        }

        let mut pending: Vec<String> = Vec::new();
        loop {
            let (name, _) = self.expect_ident()?;
            pending.push(name);
            if match_symbol!(self, Symbol::Comma).is_some() {
                continue;
            }
            let (ty, _) = self.expect_ident()?;
            params.extend(pending.drain(..).map(|name| Param::new(name, ty.clone())));
            if match_symbol!(self, Symbol::Comma).is_none() {
                break;
            }
        }
        Ok(params)
    }

    fn parse_result_type(&mut self) -> Result<Option<TypeName>, ParserError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(_)) => Ok(Some(self.expect_ident()?.0)),
            _ => Ok(None),
        }
    }

    fn parse_block(&mut self) -> Result<(Block, Span), ParserError> {
        let open = self.expect_symbol(Symbol::OpenBrace)?.span;
        let mut body = Vec::new();
        loop {
            while match_symbol!(self, Symbol::Semicolon).is_some() {}
            if let Some((_, close)) = match_symbol!(self, Symbol::CloseBrace) {
                return Ok((body, open + close));
            }
            body.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParserError> {
        if let Some((_, span)) = match_keyword!(self, Keyword::Return) {
            let mut results = Vec::new();
            let mut span = span;
            if self.can_start_expression() {
                loop {
                    let expr = self.parse_expression(0)?;
                    span = span + expr.span;
                    results.push(expr);
                    if match_symbol!(self, Symbol::Comma).is_none() {
                        break;
                    }
                }
            }
            return Ok(StmtKind::Return(results).into_stmt(span));
        }

        let expr = self.parse_expression(0)?;
        let span = expr.span;
        Ok(StmtKind::Expr(Box::new(expr)).into_stmt(span))
    }

    fn can_start_expression(&self) -> bool {
        match self.peek_kind() {
            Some(TokenKind::IntNumber(_) | TokenKind::Identifier(_)) => true,
            Some(TokenKind::Symbol(sym)) => {
                *sym == Symbol::OpenParen || self.parse_unary_op(sym).is_some()
            }
            _ => false,
        }
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<Expr, ParserError> {
        let mut left = self.parse_factor()?;
        loop {
            if let Some(TokenKind::Symbol(sym)) = self.peek_kind() {
                if let Some(op) = self.parse_binary_op(sym) {
                    let precedence = self.binop_precedence(&op);
                    if precedence >= min_precedence {
                        self.advance();
                        let right = self.parse_expression(precedence + 1)?;
                        let span = left.span + right.span;
                        left = ExprKind::Binary(op, left.into(), right.into()).into_expr(span);
                        continue;
                    }
                }
            }
            break Ok(left);
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParserError> {
        let token = self.peek().ok_or(ParserError::Eot)?;
        if let TokenKind::Symbol(sym) = &token.kind {
            if let Some(op) = self.parse_unary_op(sym) {
                self.advance();
                let expr = self.parse_factor()?;
                let span = token.span + expr.span;
                return Ok(ExprKind::Unary(op, expr.into()).into_expr(span));
            }
        }
        match token.kind {
            TokenKind::IntNumber(text) => {
                self.advance();
                Ok(ExprKind::IntLit(text).into_expr(token.span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(ExprKind::Ident(name).into_expr(token.span))
            }
            TokenKind::Symbol(Symbol::OpenParen) => {
                self.advance();
                let expr = self.parse_expression(0)?;
                let close = self.expect_symbol(Symbol::CloseParen)?.span;
                Ok(ExprKind::Paren(expr.into()).into_expr(token.span + close))
            }
            _ => Err(UnexpectedToken(token)),
        }
    }

    fn parse_unary_op(&self, sym: &Symbol) -> Option<UnaryOp> {
        match sym {
            Symbol::Minus => Some(UnaryOp::Negate),
            Symbol::Caret => Some(UnaryOp::Complement),
            Symbol::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }

    fn parse_binary_op(&self, sym: &Symbol) -> Option<BinaryOp> {
        match sym {
            Symbol::Plus => Some(BinaryOp::Add),
            Symbol::Minus => Some(BinaryOp::Subtract),
            Symbol::Star => Some(BinaryOp::Multiply),
            Symbol::Slash => Some(BinaryOp::Divide),
            Symbol::Percent => Some(BinaryOp::Remainder),
            Symbol::Ampersand => Some(BinaryOp::BitwiseAnd),
            Symbol::Pipe => Some(BinaryOp::BitwiseOr),
            Symbol::Caret => Some(BinaryOp::BitwiseXor),
            Symbol::LessLess => Some(BinaryOp::ShiftLeft),
            Symbol::GreaterGreater => Some(BinaryOp::ShiftRight),
            _ => None,
        }
    }

    fn binop_precedence(&self, op: &BinaryOp) -> u8 {
        match op {
            BinaryOp::Multiply => 50,
            BinaryOp::Divide => 50,
            BinaryOp::Remainder => 50,
            BinaryOp::ShiftLeft => 50,
            BinaryOp::ShiftRight => 50,
            BinaryOp::BitwiseAnd => 50,
            BinaryOp::Add => 45,
            BinaryOp::Subtract => 45,
            BinaryOp::BitwiseOr => 45,
            BinaryOp::BitwiseXor => 45,
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.as_slice().first().cloned()
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.as_slice().first().map(|tok| &tok.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParserError> {
        if let Some(tok) = self.peek() {
            return match tok.kind {
                TokenKind::Identifier(ident) => {
                    self.advance();
                    Ok((ident, tok.span))
                }
                _ => Err(UnexpectedToken(tok)),
            };
        }
        Err(ParserError::Eot)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, ParserError> {
        self.advance_if(|kind| matches!(kind, TokenKind::Keyword(kw) if *kw == keyword))
            .unwrap_or(Err(ParserError::Eot))
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<Token, ParserError> {
        self.advance_if(|kind| matches!(kind, TokenKind::Symbol(sym) if *sym == symbol))
            .unwrap_or(Err(ParserError::Eot))
    }

    /// `None` at end of tokens, otherwise the consumed token or an `UnexpectedToken` error.
    fn advance_if(
        &mut self,
        predicate: impl FnOnce(&TokenKind) -> bool,
    ) -> Option<Result<Token, ParserError>> {
        let tok = self.peek()?;
        if predicate(&tok.kind) {
            self.advance();
            Some(Ok(tok))
        } else {
            Some(Err(UnexpectedToken(tok)))
        }
    }
}

/// Lexes and parses a complete source text.
pub fn parse_source(src: &str) -> Result<Function, crate::CompileError> {
    let tokens = crate::frontend::lexer::Lexer::new(src).to_tokens()?;
    Ok(Parser::new(tokens).parse()?)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParserError {
    UnexpectedToken(Token),
    UnconsumedToken(Token),
    Eot, // end-of-tokens
}

impl ParserError {
    /// Location of the offending token; `None` when the input ended early.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParserError::UnexpectedToken(token) | ParserError::UnconsumedToken(token) => {
                Some(token.span)
            }
            ParserError::Eot => None,
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::UnexpectedToken(token) => write!(f, "unexpected token `{}`", token.kind),
            ParserError::UnconsumedToken(token) => {
                write!(f, "unconsumed token in stream `{}`", token.kind)
            }
            ParserError::Eot => write!(f, "unexpected end of input"),
        }
    }
}

impl Error for ParserError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Result<Function, ParserError> {
        Parser::new(Lexer::new(src).to_tokens().unwrap()).parse()
    }

    fn body_kinds(src: &str) -> Vec<StmtKind> {
        parse(src).unwrap().body.into_iter().map(|s| s.kind).collect()
    }

    fn strip(expr: &Expr) -> ExprKind {
        match &expr.kind {
            ExprKind::Binary(op, l, r) => ExprKind::Binary(
                *op,
                Box::new(Expr::new(strip(l), Span::default())),
                Box::new(Expr::new(strip(r), Span::default())),
            ),
            other => other.clone(),
        }
    }

    #[test]
    fn parses_grouped_params_and_result() {
        let func = parse("func f(x, y byte) byte { return 5 }").unwrap();
        assert_eq!(func.name, "f");
        assert_eq!(func.params, vec![Param::new("x", "byte"), Param::new("y", "byte")]);
        assert_eq!(func.result.as_deref(), Some("byte"));
        assert_eq!(func.span, Span::new(0, 35));
    }

    #[test]
    fn parses_mixed_param_groups() {
        let func = parse("func g(a byte, b, c int) {}").unwrap();
        assert_eq!(
            func.params,
            vec![Param::new("a", "byte"), Param::new("b", "int"), Param::new("c", "int")]
        );
        assert_eq!(func.result, None);
        assert!(func.body.is_empty());
    }

    #[test]
    fn return_keeps_literal_text() {
        let kinds = body_kinds("func f(x, y byte) byte { return 0x1A }");
        let StmtKind::Return(results) = &kinds[0] else {
            panic!("expected return, got {:?}", kinds[0]);
        };
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, ExprKind::IntLit("0x1A".into()));
    }

    #[test]
    fn return_lists_and_bare_return() {
        let kinds = body_kinds("func f(x, y byte) byte { return; return 1, 2 }");
        assert!(matches!(&kinds[0], StmtKind::Return(r) if r.is_empty()));
        assert!(matches!(&kinds[1], StmtKind::Return(r) if r.len() == 2));
    }

    #[test]
    fn multiplication_binds_tighter() {
        let kinds = body_kinds("func f(x, y byte) byte { return x + y * 2 }");
        let StmtKind::Return(results) = &kinds[0] else {
            panic!("expected return");
        };
        let ident = |n: &str| Box::new(Expr::new(ExprKind::Ident(n.into()), Span::default()));
        let expected = ExprKind::Binary(
            BinaryOp::Add,
            ident("x"),
            Box::new(Expr::new(
                ExprKind::Binary(
                    BinaryOp::Multiply,
                    ident("y"),
                    Box::new(Expr::new(ExprKind::IntLit("2".into()), Span::default())),
                ),
                Span::default(),
            )),
        );
        assert_eq!(strip(&results[0]), expected);
    }

    #[test]
    fn negative_literal_is_unary() {
        let kinds = body_kinds("func f(x, y byte) byte { return -5 }");
        let StmtKind::Return(results) = &kinds[0] else {
            panic!("expected return");
        };
        assert!(matches!(results[0].kind, ExprKind::Unary(UnaryOp::Negate, _)));
    }

    #[test]
    fn expression_statements_precede_return() {
        let kinds = body_kinds("func f(x, y byte) byte { x; (y) return 3 }");
        assert!(matches!(&kinds[0], StmtKind::Expr(e) if matches!(e.kind, ExprKind::Ident(_))));
        assert!(matches!(&kinds[1], StmtKind::Expr(e) if matches!(e.kind, ExprKind::Paren(_))));
        assert!(matches!(&kinds[2], StmtKind::Return(_)));
    }

    #[test]
    fn errors_carry_offending_token() {
        let err = parse("func f(x, y byte) byte { return 5 } }").unwrap_err();
        assert!(matches!(err, ParserError::UnconsumedToken(_)));
        assert_eq!(err.span(), Some(Span::new(36, 37)));

        let err = parse("func f(x, y) byte {}").unwrap_err();
        assert!(matches!(
            err,
            ParserError::UnexpectedToken(ref t) if t.kind == TokenKind::Symbol(Symbol::CloseParen)
        ));

        assert_eq!(parse("func f(x, y byte) byte { return 5").unwrap_err(), ParserError::Eot);
    }
}
