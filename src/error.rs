//! Error types for the Noema interpreter

use thiserror::Error;

use crate::diag;

/// Noema interpreter errors
///
/// Every variant carries the 1-based source line and column of the token or
/// AST node that triggered it (0 when unknown, e.g. for output failures).
/// [`Error::diagnostic`] renders the canonical `path:line:col: kind: message`
/// prefix consumed by the CLI and by external formatters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Lexical errors
    /// Error produced while scanning source text
    ///
    /// **Triggered by:** illegal characters, tabs in whitespace, indentation
    /// that is not a multiple of 4, inconsistent dedents, unterminated
    /// string literals
    #[error("{message}")]
    Lex {
        /// Line number where the error occurred
        line: usize,
        /// Column number where the error occurred
        column: usize,
        /// Error description
        message: String,
    },

    // Syntactic errors
    /// Error produced while parsing the token stream
    ///
    /// **Triggered by:** expected-token mismatches, malformed statements,
    /// stray INDENT/DEDENT tokens, end of input inside a block
    #[error("{message}")]
    Syntax {
        /// Line number where the error occurred
        line: usize,
        /// Column number where the error occurred
        column: usize,
        /// Error description
        message: String,
    },

    // Runtime errors
    /// Reference to a variable that was never assigned
    #[error("undefined variable '{name}'")]
    UndefinedVariable {
        /// Variable name
        name: String,
        /// Line number of the reference
        line: usize,
        /// Column number of the reference
        column: usize,
    },

    /// Operand of the wrong kind for an operator
    #[error("{message}")]
    Type {
        /// Error description naming the operator and operand types
        message: String,
        /// Line number of the offending expression
        line: usize,
        /// Column number of the offending expression
        column: usize,
    },

    /// Division with a zero divisor
    #[error("division by zero")]
    DivisionByZero {
        /// Line number of the division
        line: usize,
        /// Column number of the division
        column: usize,
    },

    /// Modulo with a zero divisor
    #[error("modulo by zero")]
    ModuloByZero {
        /// Line number of the modulo
        line: usize,
        /// Column number of the modulo
        column: usize,
    },

    /// Variable store is full and cannot accept a new name
    #[error("too many variables (limit {limit})")]
    StoreFull {
        /// Configured capacity of the variable store
        limit: usize,
        /// Line number of the assignment
        line: usize,
        /// Column number of the assignment
        column: usize,
    },

    /// Failure writing print output
    #[error("i/o error: {message}")]
    Io {
        /// Underlying error description
        message: String,
    },
}

impl Error {
    /// Diagnostic kind string for the stage that produced this error
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Lex { .. } => "lexer error",
            Error::Syntax { .. } => "parser error",
            _ => "runtime error",
        }
    }

    /// Source line of the error, 0 when unknown
    pub fn line(&self) -> usize {
        match self {
            Error::Lex { line, .. }
            | Error::Syntax { line, .. }
            | Error::UndefinedVariable { line, .. }
            | Error::Type { line, .. }
            | Error::DivisionByZero { line, .. }
            | Error::ModuloByZero { line, .. }
            | Error::StoreFull { line, .. } => *line,
            Error::Io { .. } => 0,
        }
    }

    /// Source column of the error, 0 when unknown
    pub fn column(&self) -> usize {
        match self {
            Error::Lex { column, .. }
            | Error::Syntax { column, .. }
            | Error::UndefinedVariable { column, .. }
            | Error::Type { column, .. }
            | Error::DivisionByZero { column, .. }
            | Error::ModuloByZero { column, .. }
            | Error::StoreFull { column, .. } => *column,
            Error::Io { .. } => 0,
        }
    }

    /// Renders the full one-line diagnostic for this error
    ///
    /// The format is `path:line:col: kind: message`, dropping the column or
    /// the whole location when unknown. An empty `path` falls back to the
    /// `<stdin>` placeholder.
    pub fn diagnostic(&self, path: &str) -> String {
        diag::format(path, self.line(), self.column(), self.kind(), &self.to_string())
    }
}

/// Result type for Noema operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        let lex = Error::Lex {
            line: 1,
            column: 1,
            message: "bad".to_string(),
        };
        assert_eq!(lex.kind(), "lexer error");

        let syn = Error::Syntax {
            line: 1,
            column: 1,
            message: "bad".to_string(),
        };
        assert_eq!(syn.kind(), "parser error");

        let run = Error::DivisionByZero { line: 3, column: 7 };
        assert_eq!(run.kind(), "runtime error");
    }

    #[test]
    fn test_diagnostic_rendering() {
        let err = Error::UndefinedVariable {
            name: "x".to_string(),
            line: 2,
            column: 5,
        };
        assert_eq!(
            err.diagnostic("script.noema"),
            "script.noema:2:5: runtime error: undefined variable 'x'"
        );
    }

    #[test]
    fn test_diagnostic_without_location() {
        let err = Error::Io {
            message: "broken pipe".to_string(),
        };
        assert_eq!(
            err.diagnostic(""),
            "<stdin>: runtime error: i/o error: broken pipe"
        );
    }
}
