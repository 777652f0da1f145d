//! Syntactic analysis: statements, expressions, and the program tree

pub mod ast;
pub mod parser;

pub use ast::{BinaryOp, Branch, Expression, ExprKind, Program, Statement, StmtKind, UnaryOp};
pub use parser::{Parser, PRINT_BUILTIN};
