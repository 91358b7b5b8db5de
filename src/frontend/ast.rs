use crate::frontend::span::Span;

/// A single parsed function definition, e.g. `func f(x, y byte) byte { return 5 }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub result: Option<TypeName>,
    pub body: Block,
    pub span: Span,
}

pub type Block = Vec<Stmt>;

impl Function {
    pub fn new(
        name: String,
        params: Vec<Param>,
        result: Option<TypeName>,
        body: Block,
        span: Span,
    ) -> Self {
        Self {
            name,
            params,
            result,
            body,
            span,
        }
    }
}

pub type TypeName = String;

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Box<Expr>),
    /// `return a, b, ...`; the list may be empty.
    Return(Vec<Expr>),
}

impl StmtKind {
    pub fn into_stmt(self, span: Span) -> Stmt {
        Stmt::new(self, span)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal, stored as written in the source.
    IntLit(String),
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),
}

impl ExprKind {
    pub fn into_expr(self, span: Span) -> Expr {
        Expr::new(self, span)
    }

    /// Short human-readable name of the expression shape.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::IntLit(_) => "integer literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Unary(..) => "unary expression",
            ExprKind::Binary(..) => "binary expression",
            ExprKind::Paren(_) => "parenthesized expression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Complement,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}
