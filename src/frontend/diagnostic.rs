use colored::*;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::frontend::source::SourceFile;
use crate::frontend::span::Span;

/// A diagnostic message with source code context and highlighting.
#[derive(Debug)]
pub struct Diagnostic {
    pub message: String,
    pub source_file: Arc<SourceFile>,
    pub span: Span,
    pub level: DiagnosticLevel,
}

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl Display for DiagnosticLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "{}", "error".red().bold()),
            DiagnosticLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
        }
    }
}

impl Diagnostic {
    /// Creates a new diagnostic message.
    pub fn new(
        message: String,
        source_file: Arc<SourceFile>,
        span: Span,
        level: DiagnosticLevel,
    ) -> Self {
        Self {
            message,
            source_file,
            span,
            level,
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(message: String, source_file: Arc<SourceFile>, span: Span) -> Self {
        Self::new(message, source_file, span, DiagnosticLevel::Error)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(message: String, source_file: Arc<SourceFile>, span: Span) -> Self {
        Self::new(message, source_file, span, DiagnosticLevel::Warning)
    }

    /// Formats the diagnostic message with source code context and highlighting.
    pub fn format(&self) -> String {
        let src = &self.source_file.content;
        let mut result = String::new();

        result.push_str(&format!("{}: {}\n", self.level, self.message.bold()));

        let (line_number, column_start, column_end) = self.get_line_and_column(src);

        result.push_str(&format!(
            " {} {}:{}:{}\n",
            "-->".cyan().bold(),
            self.source_file.name.to_string().cyan(),
            line_number.to_string().cyan(),
            (column_start + 1).to_string().cyan()
        ));

        if line_number > 1 {
            let prev_line = self.get_line(src, line_number - 1);
            result.push_str(&format!(
                "{:>4} {} {}\n",
                (line_number - 1).to_string().cyan(),
                "|".cyan().bold(),
                prev_line
            ));
        }

        let line = self.get_line(src, line_number);
        result.push_str(&format!(
            "{:>4} {} {}\n",
            line_number.to_string().cyan(),
            "|".cyan().bold(),
            line
        ));

        // An empty span (end of input) still gets one caret.
        let width = (column_end - column_start).max(1);
        let highlight = match self.level {
            DiagnosticLevel::Error => "^".repeat(width).red().bold(),
            DiagnosticLevel::Warning => "^".repeat(width).yellow().bold(),
        };

        result.push_str(&format!(
            "     {} {}{}\n",
            "|".blue().bold(),
            " ".repeat(column_start),
            highlight
        ));

        let next_line = self.get_line(src, line_number + 1);
        if !next_line.is_empty() {
            result.push_str(&format!(
                "{:>4} {} {}\n",
                (line_number + 1).to_string().cyan(),
                "|".cyan().bold(),
                next_line
            ));
        }

        result
    }

    /// Gets the 1-based line and the 0-based start and end columns of the span.
    fn get_line_and_column(&self, src: &str) -> (usize, usize, usize) {
        let mut line_number = 1;
        let mut line_start = 0;

        for (i, c) in src.char_indices() {
            if i == self.span.start {
                // Columns count characters, not bytes.
                let column_start = src[line_start..i].chars().count();

                // The highlight stops at the end of the line.
                let line_end = src[i..].find('\n').map_or(src.len(), |n| i + n);
                let highlight_end = self.span.end.min(line_end).max(i);
                let column_end = column_start + src[i..highlight_end].chars().count();

                return (line_number, column_start, column_end);
            }

            if c == '\n' {
                line_number += 1;
                line_start = i + 1;
            }
        }

        // If we get here, the span is at the end of the file
        let column = src[line_start..].chars().count();
        (line_number, column, column)
    }

    /// Gets the line at the given 1-based line number, or `""` when out of range.
    fn get_line<'a>(&self, src: &'a str, line_number: usize) -> &'a str {
        src.lines().nth(line_number.wrapping_sub(1)).unwrap_or("")
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
