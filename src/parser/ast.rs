use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete Noema program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Program {
    /// Top-level statements in the program
    pub statements: Vec<Statement>,
}

/// A statement together with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// What the statement does
    pub kind: StmtKind,
    /// Line number of the statement's first token (1-indexed)
    pub line: usize,
    /// Column number of the statement's first token (1-indexed)
    pub column: usize,
}

/// Statement forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Module import: `import sonus` (no-op placeholder today)
    Import {
        /// Imported module name
        module: String,
    },

    /// Variable assignment: `x = expr`
    Assignment {
        /// Name of the variable to assign to
        target: String,
        /// Expression whose value is stored
        value: Expression,
    },

    /// The print builtin: `sonus.dic(expr)`
    Print {
        /// Argument expression to render
        arg: Expression,
    },

    /// Conditional chain: `si expr:` with optional `aliosi`/`alio` branches
    Conditional {
        /// Branches in declaration order; only the last may lack a condition
        branches: Vec<Branch>,
    },
}

/// One branch of a conditional chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch condition; `None` marks the unconditional trailing `alio`
    pub condition: Option<Expression>,
    /// Statements executed when the branch is taken
    pub body: Vec<Statement>,
}

/// An expression node together with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// What the expression computes
    pub kind: ExprKind,
    /// Line number of the expression's first token (1-indexed)
    pub line: usize,
    /// Column number of the expression's first token (1-indexed)
    pub column: usize,
}

/// Expression forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Integer literal
    Int(i64),
    /// Boolean literal (`verum` / `falsum`)
    Bool(bool),
    /// String literal
    Str(String),
    /// Null literal (`nulla`)
    Null,

    /// Variable reference
    Variable(String),

    /// Unary operation
    Unary {
        /// Unary operator to apply
        op: UnaryOp,
        /// Operand expression
        operand: Box<Expression>,
    },

    /// Binary operation
    Binary {
        /// Binary operator to apply
        op: BinaryOp,
        /// Left operand expression
        left: Box<Expression>,
        /// Right operand expression
        right: Box<Expression>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    /// Addition (also string concatenation) operator (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,
    /// Modulo operator (%)
    Mod,

    // Comparison
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than operator (>)
    Gt,
    /// Greater than or equal operator (>=)
    GtEq,

    // Logical
    /// Logical AND operator (`et`)
    And,
    /// Logical OR operator (`aut`)
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation operator (-x)
    Neg,
    /// Logical NOT operator (`non`)
    Not,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "et",
            BinaryOp::Or => "aut",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "neg"),
            UnaryOp::Not => write!(f, "non"),
        }
    }
}

/// Parenthesized line-oriented rendering, as used by the AST dumper
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ExprKind::Int(n) => write!(f, "{}", n),
            ExprKind::Bool(b) => write!(f, "{}", if *b { "verum" } else { "falsum" }),
            ExprKind::Str(s) => write!(f, "\"{}\"", s),
            ExprKind::Null => write!(f, "nulla"),
            ExprKind::Variable(name) => write!(f, "{}", name),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => write!(f, "non {}", operand),
                UnaryOp::Neg => write!(f, "(-{})", operand),
            },
            ExprKind::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
        }
    }
}
