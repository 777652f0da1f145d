use std::io::{self, Write};

use tracing::debug;

use super::environment::Environment;
use super::value::Value;
use crate::error::{Error, Result};
use crate::parser::{BinaryOp, Branch, Expression, ExprKind, Program, Statement, StmtKind, UnaryOp};

/// Tree-walking evaluator
///
/// Walks the program tree directly, holding one flat variable store and a
/// writable sink for `sonus.dic` output. Execution stops at the first
/// runtime error; every runtime error carries the source position of the
/// node that raised it.
pub struct Evaluator {
    env: Environment,
    out: Box<dyn Write>,
}

impl Evaluator {
    /// Creates an evaluator printing to stdout
    pub fn new() -> Self {
        Evaluator::with_output(Box::new(io::stdout()))
    }

    /// Creates an evaluator printing to the given sink
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Evaluator {
            env: Environment::new(),
            out,
        }
    }

    /// The variable store, mostly useful for inspection after a run
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Executes a program from top to bottom
    pub fn execute(&mut self, program: &Program) -> Result<()> {
        for statement in &program.statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<()> {
        match &statement.kind {
            StmtKind::Import { module } => {
                // Imports only gate name resolution at parse time; there is
                // nothing to load.
                debug!(module = %module, "import");
                Ok(())
            }
            StmtKind::Assignment { target, value } => {
                let value = self.evaluate(value)?;
                if !self.env.set(target, value) {
                    return Err(Error::StoreFull {
                        limit: self.env.capacity(),
                        line: statement.line,
                        column: statement.column,
                    });
                }
                Ok(())
            }
            StmtKind::Print { arg } => {
                let value = self.evaluate(arg)?;
                writeln!(self.out, "{}", value).map_err(|e| Error::Io {
                    message: e.to_string(),
                })?;
                Ok(())
            }
            StmtKind::Conditional { branches } => self.execute_branches(branches),
        }
    }

    /// Runs the first branch whose condition is truthy (or absent)
    fn execute_branches(&mut self, branches: &[Branch]) -> Result<()> {
        for branch in branches {
            let taken = match &branch.condition {
                Some(condition) => self.evaluate(condition)?.is_truthy(),
                None => true,
            };
            if taken {
                for statement in &branch.body {
                    self.execute_statement(statement)?;
                }
                return Ok(());
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Variable(name) => {
                self.env.get(name).ok_or_else(|| Error::UndefinedVariable {
                    name: name.clone(),
                    line: expr.line,
                    column: expr.column,
                })
            }
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                        other => Err(self.type_error(
                            expr,
                            format!("unary '-' requires an integer, got {}", other.type_name()),
                        )),
                    },
                }
            }
            ExprKind::Binary { op, left, right } => {
                // et / aut short-circuit: the right side is not evaluated
                // when the left side decides.
                match op {
                    BinaryOp::And => {
                        let lhs = self.evaluate(left)?;
                        if !lhs.is_truthy() {
                            return Ok(Value::Bool(false));
                        }
                        let rhs = self.evaluate(right)?;
                        return Ok(Value::Bool(rhs.is_truthy()));
                    }
                    BinaryOp::Or => {
                        let lhs = self.evaluate(left)?;
                        if lhs.is_truthy() {
                            return Ok(Value::Bool(true));
                        }
                        let rhs = self.evaluate(right)?;
                        return Ok(Value::Bool(rhs.is_truthy()));
                    }
                    _ => {}
                }

                let lhs = self.evaluate(left)?;
                let rhs = self.evaluate(right)?;
                self.apply_binary(expr, *op, lhs, rhs)
            }
        }
    }

    fn apply_binary(
        &self,
        expr: &Expression,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value> {
        match op {
            BinaryOp::Add => match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (a, b) => Err(self.type_error(
                    expr,
                    format!(
                        "operator '+' requires two integers or two strings, got {} and {}",
                        a.type_name(),
                        b.type_name()
                    ),
                )),
            },
            BinaryOp::Sub => self.int_arith(expr, op, lhs, rhs, i64::wrapping_sub),
            BinaryOp::Mul => self.int_arith(expr, op, lhs, rhs, i64::wrapping_mul),
            BinaryOp::Div => match (lhs, rhs) {
                (Value::Int(_), Value::Int(0)) => Err(Error::DivisionByZero {
                    line: expr.line,
                    column: expr.column,
                }),
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(b))),
                (a, b) => Err(self.arith_type_error(expr, op, &a, &b)),
            },
            BinaryOp::Mod => match (lhs, rhs) {
                (Value::Int(_), Value::Int(0)) => Err(Error::ModuloByZero {
                    line: expr.line,
                    column: expr.column,
                }),
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_rem(b))),
                (a, b) => Err(self.arith_type_error(expr, op, &a, &b)),
            },
            BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
            BinaryOp::NotEq => Ok(Value::Bool(lhs != rhs)),
            BinaryOp::Lt => self.int_compare(expr, op, lhs, rhs, |a, b| a < b),
            BinaryOp::LtEq => self.int_compare(expr, op, lhs, rhs, |a, b| a <= b),
            BinaryOp::Gt => self.int_compare(expr, op, lhs, rhs, |a, b| a > b),
            BinaryOp::GtEq => self.int_compare(expr, op, lhs, rhs, |a, b| a >= b),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled before evaluation"),
        }
    }

    fn int_arith(
        &self,
        expr: &Expression,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
        f: fn(i64, i64) -> i64,
    ) -> Result<Value> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(f(a, b))),
            (a, b) => Err(self.arith_type_error(expr, op, &a, &b)),
        }
    }

    fn int_compare(
        &self,
        expr: &Expression,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
        f: fn(i64, i64) -> bool,
    ) -> Result<Value> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(f(a, b))),
            (a, b) => Err(self.arith_type_error(expr, op, &a, &b)),
        }
    }

    fn arith_type_error(&self, expr: &Expression, op: BinaryOp, a: &Value, b: &Value) -> Error {
        self.type_error(
            expr,
            format!(
                "operator '{}' requires integers, got {} and {}",
                op,
                a.type_name(),
                b.type_name()
            ),
        )
    }

    fn type_error(&self, expr: &Expression, message: String) -> Error {
        Error::Type {
            message,
            line: expr.line,
            column: expr.column,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}
