use crate::frontend::ast::*;
use std::io::{self, Write};

/// A printer for AST nodes that writes to a given writer.
pub struct AstPrinter<W: Write> {
    writer: W,
    indent: usize,
}

impl<W: Write> AstPrinter<W> {
    /// Creates a new AST printer that writes to the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer, indent: 0 }
    }

    /// Prints the given function.
    pub fn print_function(&mut self, function: &Function) -> io::Result<()> {
        writeln!(self.writer, "Function: {}", function.name)?;
        self.indent += 2;
        for param in &function.params {
            self.print_indent()?;
            writeln!(self.writer, "Param: {} {}", param.name, param.ty)?;
        }
        self.print_indent()?;
        match &function.result {
            Some(ty) => writeln!(self.writer, "Result: {}", ty)?,
            None => writeln!(self.writer, "Result: (none)")?,
        }
        self.print_indent()?;
        writeln!(self.writer, "Body:")?;
        self.indent += 2;
        for stmt in &function.body {
            self.print_stmt(stmt)?;
        }
        self.indent -= 4;
        Ok(())
    }

    /// Prints the given statement.
    fn print_stmt(&mut self, stmt: &Stmt) -> io::Result<()> {
        self.print_indent()?;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                writeln!(self.writer, "Statement: Expression")?;
                self.indent += 2;
                self.print_expr(expr)?;
                self.indent -= 2;
            }
            StmtKind::Return(results) => {
                writeln!(self.writer, "Statement: Return")?;
                self.indent += 2;
                for expr in results {
                    self.print_expr(expr)?;
                }
                self.indent -= 2;
            }
        }
        Ok(())
    }

    /// Prints the given expression.
    fn print_expr(&mut self, expr: &Expr) -> io::Result<()> {
        self.print_indent()?;
        match &expr.kind {
            ExprKind::Binary(op, lhs, rhs) => {
                writeln!(self.writer, "Expression: Binary {:?}", op)?;
                self.indent += 2;
                self.print_expr(lhs)?;
                self.print_expr(rhs)?;
                self.indent -= 2;
            }
            ExprKind::IntLit(text) => {
                writeln!(self.writer, "Expression: Integer {}", text)?;
            }
            ExprKind::Ident(name) => {
                writeln!(self.writer, "Expression: Identifier {}", name)?;
            }
            ExprKind::Paren(inner) => {
                writeln!(self.writer, "Expression: Paren")?;
                self.indent += 2;
                self.print_expr(inner)?;
                self.indent -= 2;
            }
            ExprKind::Unary(op, operand) => {
                writeln!(self.writer, "Expression: Unary {:?}", op)?;
                self.indent += 2;
                self.print_expr(operand)?;
                self.indent -= 2;
            }
        }
        Ok(())
    }

    /// Prints the current indentation.
    fn print_indent(&mut self) -> io::Result<()> {
        write!(self.writer, "{:1$}", "", self.indent)
    }
}
