use tracing::debug;

use super::ast::{BinaryOp, Branch, Expression, ExprKind, Program, Statement, StmtKind, UnaryOp};
use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind};

/// Exact callee name of the print builtin
pub const PRINT_BUILTIN: &str = "sonus.dic";

/// Recursive-descent parser over the pull-based token stream
///
/// Uses one-token lookahead only, with precedence climbing for expressions.
/// Errors are sticky: the first parse error latches, the parser skips ahead
/// to the next NEWLINE/DEDENT/EOF boundary and keeps scanning so cascading
/// problems still make progress, but only the first message is surfaced.
/// A lexical error always takes precedence over anything the parser derived
/// from the degraded token stream.
pub struct Parser {
    lexer: Lexer,
    error: Option<Error>,
}

impl Parser {
    /// Creates a parser over the given lexer
    pub fn new(lexer: Lexer) -> Self {
        Parser { lexer, error: None }
    }

    /// Creates a parser directly over source text
    pub fn from_source(source: &str) -> Self {
        Parser::new(Lexer::new(source))
    }

    /// Parses a complete program
    ///
    /// Returns the first error of the run (lexical before syntactic) or the
    /// finished statement list.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut program = Program::default();

        loop {
            self.skip_newlines();

            let tok = self.lexer.peek_token();
            if tok.kind == TokenKind::Eof {
                break;
            }

            match self.parse_statement() {
                Ok(stmt) => program.statements.push(stmt),
                Err(err) => {
                    self.latch(err);
                    self.synchronize();
                }
            }
        }

        if let Some(err) = self.lexer.error() {
            return Err(err.clone());
        }
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        debug!(statements = program.statements.len(), "parsed program");
        Ok(program)
    }

    fn latch(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Skips ahead to the next statement boundary after an error
    fn synchronize(&mut self) {
        loop {
            match self.lexer.peek_token().kind {
                TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof => return,
                _ => {
                    self.lexer.next_token();
                }
            }
        }
    }

    fn skip_newlines(&mut self) {
        while self.lexer.peek_token().kind == TokenKind::Newline {
            self.lexer.next_token();
        }
    }

    fn syntax_at(&self, tok: &Token, message: &str) -> Error {
        Error::Syntax {
            line: tok.line,
            column: tok.column,
            message: message.to_string(),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        let tok = self.lexer.next_token();
        if tok.kind != kind {
            return Err(self.syntax_at(&tok, what));
        }
        Ok(tok)
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Result<Statement> {
        let tok = self.lexer.peek_token();
        match &tok.kind {
            TokenKind::Import => {
                self.lexer.next_token();
                self.parse_import(&tok)
            }
            TokenKind::Si => self.parse_conditional(),
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.lexer.next_token();
                if name == PRINT_BUILTIN {
                    self.parse_print(&tok)
                } else {
                    self.parse_assignment(&tok, name)
                }
            }
            TokenKind::Aliosi => {
                self.lexer.next_token();
                Err(self.syntax_at(&tok, "'aliosi' without matching 'si'"))
            }
            TokenKind::Alio => {
                self.lexer.next_token();
                Err(self.syntax_at(&tok, "'alio' without matching 'si'"))
            }
            TokenKind::Indent => {
                self.lexer.next_token();
                Err(self.syntax_at(&tok, "unexpected indentation"))
            }
            TokenKind::Dedent => {
                self.lexer.next_token();
                Err(self.syntax_at(&tok, "unexpected dedent"))
            }
            _ => {
                let bad = self.lexer.next_token();
                Err(self.syntax_at(&bad, "unexpected token"))
            }
        }
    }

    fn parse_import(&mut self, kw: &Token) -> Result<Statement> {
        let tok = self.lexer.next_token();
        let module = match tok.kind {
            TokenKind::Identifier(name) => name,
            _ => return Err(self.syntax_at(&tok, "expected module name after 'import'")),
        };
        self.end_of_statement()?;
        Ok(Statement {
            kind: StmtKind::Import { module },
            line: kw.line,
            column: kw.column,
        })
    }

    fn parse_assignment(&mut self, ident: &Token, target: String) -> Result<Statement> {
        let nx = self.lexer.peek_token();
        if nx.kind != TokenKind::Assign {
            return Err(self.syntax_at(&nx, "expected assignment or call"));
        }
        self.lexer.next_token();

        let value = self.parse_expression()?;
        self.end_of_statement()?;
        Ok(Statement {
            kind: StmtKind::Assignment { target, value },
            line: ident.line,
            column: ident.column,
        })
    }

    fn parse_print(&mut self, ident: &Token) -> Result<Statement> {
        self.expect(TokenKind::LeftParen, "expected '(' after sonus.dic")?;
        let arg = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after argument")?;
        self.end_of_statement()?;
        Ok(Statement {
            kind: StmtKind::Print { arg },
            line: ident.line,
            column: ident.column,
        })
    }

    fn parse_conditional(&mut self) -> Result<Statement> {
        let si = self.lexer.next_token(); // si

        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon, "expected ':' after condition")?;
        let body = self.parse_block()?;

        let mut branches = vec![Branch {
            condition: Some(condition),
            body,
        }];

        loop {
            match self.lexer.peek_token().kind {
                TokenKind::Aliosi => {
                    self.lexer.next_token();
                    let condition = self.parse_expression()?;
                    self.expect(TokenKind::Colon, "expected ':' after condition")?;
                    let body = self.parse_block()?;
                    branches.push(Branch {
                        condition: Some(condition),
                        body,
                    });
                }
                TokenKind::Alio => {
                    self.lexer.next_token();
                    self.expect(TokenKind::Colon, "expected ':' after 'alio'")?;
                    let body = self.parse_block()?;
                    branches.push(Branch {
                        condition: None,
                        body,
                    });
                    break;
                }
                _ => break,
            }
        }

        Ok(Statement {
            kind: StmtKind::Conditional { branches },
            line: si.line,
            column: si.column,
        })
    }

    /// A block is NEWLINE, INDENT, statements, DEDENT
    fn parse_block(&mut self) -> Result<Vec<Statement>> {
        self.expect(TokenKind::Newline, "expected newline after ':'")?;
        self.expect(TokenKind::Indent, "expected indented block")?;

        let mut statements = Vec::new();
        loop {
            self.skip_newlines();

            let tok = self.lexer.peek_token();
            match tok.kind {
                TokenKind::Dedent => {
                    self.lexer.next_token();
                    return Ok(statements);
                }
                TokenKind::Eof => {
                    return Err(self.syntax_at(&tok, "unexpected end of input inside block"));
                }
                _ => statements.push(self.parse_statement()?),
            }
        }
    }

    fn end_of_statement(&mut self) -> Result<()> {
        let tok = self.lexer.peek_token();
        match tok.kind {
            TokenKind::Newline => {
                self.lexer.next_token();
                Ok(())
            }
            // A file or block may end without a trailing newline.
            TokenKind::Eof | TokenKind::Dedent => Ok(()),
            _ => Err(self.syntax_at(&tok, "expected newline after statement")),
        }
    }

    // ---- expressions, lowest precedence first ----

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.lexer.peek_token().kind == TokenKind::Aut {
            self.lexer.next_token();
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_equality()?;
        while self.lexer.peek_token().kind == TokenKind::Et {
            self.lexer.next_token();
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.lexer.peek_token().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.lexer.next_token();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.lexer.peek_token().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.lexer.next_token();
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expression> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.lexer.peek_token().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.lexer.next_token();
            let right = self.parse_factor()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.lexer.peek_token().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.lexer.next_token();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Unary operators recurse into themselves so prefixes chain
    fn parse_unary(&mut self) -> Result<Expression> {
        let tok = self.lexer.peek_token();
        let op = match tok.kind {
            TokenKind::Non => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_primary(),
        };
        self.lexer.next_token();

        let operand = self.parse_unary()?;
        Ok(Expression {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            line: tok.line,
            column: tok.column,
        })
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let tok = self.lexer.next_token();
        let kind = match tok.kind {
            TokenKind::Integer(n) => ExprKind::Int(n),
            TokenKind::Str(s) => ExprKind::Str(s),
            TokenKind::Verum => ExprKind::Bool(true),
            TokenKind::Falsum => ExprKind::Bool(false),
            TokenKind::Nulla => ExprKind::Null,
            TokenKind::Identifier(name) => ExprKind::Variable(name),
            TokenKind::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "expected ')' after expression")?;
                return Ok(inner);
            }
            _ => return Err(self.syntax_at(&tok, "expected expression")),
        };

        Ok(Expression {
            kind,
            line: tok.line,
            column: tok.column,
        })
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let (line, column) = (left.line, left.column);
    Expression {
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program> {
        Parser::from_source(source).parse_program()
    }

    fn parse_ok(source: &str) -> Program {
        match parse(source) {
            Ok(program) => program,
            Err(err) => panic!("parse failed: {}", err),
        }
    }

    #[test]
    fn test_assignment() {
        let program = parse_ok("x = 5\n");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0].kind {
            StmtKind::Assignment { target, value } => {
                assert_eq!(target, "x");
                assert_eq!(value.kind, ExprKind::Int(5));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_import() {
        let program = parse_ok("import sonus\n");
        match &program.statements[0].kind {
            StmtKind::Import { module } => assert_eq!(module, "sonus"),
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[test]
    fn test_print_call() {
        let program = parse_ok("sonus.dic(42)\n");
        match &program.statements[0].kind {
            StmtKind::Print { arg } => assert_eq!(arg.kind, ExprKind::Int(42)),
            other => panic!("expected print, got {:?}", other),
        }
    }

    #[test]
    fn test_only_exact_print_name_is_a_call() {
        // Any other identifier followed by '(' is not a call form.
        let err = parse("vox.dic(1)\n").unwrap_err();
        assert!(err.to_string().contains("expected assignment or call"));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let program = parse_ok("x = 2 + 3 * 4\n");
        match &program.statements[0].kind {
            StmtKind::Assignment { value, .. } => {
                assert_eq!(value.to_string(), "(2 + (3 * 4))");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_parens_override_precedence() {
        let program = parse_ok("x = (2 + 3) * 4\n");
        match &program.statements[0].kind {
            StmtKind::Assignment { value, .. } => {
                assert_eq!(value.to_string(), "((2 + 3) * 4)");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_precedence() {
        // non binds tighter than aut.
        let program = parse_ok("x = non verum aut verum\n");
        match &program.statements[0].kind {
            StmtKind::Assignment { value, .. } => {
                assert_eq!(value.to_string(), "(non verum aut verum)");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        let program = parse_ok("x = 10 - 3 - 2\n");
        match &program.statements[0].kind {
            StmtKind::Assignment { value, .. } => {
                assert_eq!(value.to_string(), "((10 - 3) - 2)");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_chained_unary() {
        let program = parse_ok("x = non non verum\n");
        match &program.statements[0].kind {
            StmtKind::Assignment { value, .. } => {
                assert_eq!(value.to_string(), "non non verum");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_chain() {
        let source = "si a == 1:\n    x = 1\naliosi a == 2:\n    x = 2\nalio:\n    x = 3\n";
        let program = parse_ok(source);
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0].kind {
            StmtKind::Conditional { branches } => {
                assert_eq!(branches.len(), 3);
                assert!(branches[0].condition.is_some());
                assert!(branches[1].condition.is_some());
                assert!(branches[2].condition.is_none());
                assert_eq!(branches[2].body.len(), 1);
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_conditionals() {
        let source = "si verum:\n    si falsum:\n        x = 1\n    y = 2\n";
        let program = parse_ok(source);
        match &program.statements[0].kind {
            StmtKind::Conditional { branches } => {
                assert_eq!(branches[0].body.len(), 2);
                assert!(matches!(
                    branches[0].body[0].kind,
                    StmtKind::Conditional { .. }
                ));
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_parenthesized_expression() {
        let program = parse_ok("x = (1 +\n     2 +\n     3)\n");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_stray_indent_rejected() {
        let err = parse("x = 1\n    y = 2\n").unwrap_err();
        assert!(err.to_string().contains("unexpected indentation"));
        assert_eq!(err.kind(), "parser error");
    }

    #[test]
    fn test_block_requires_indent() {
        let err = parse("si verum:\nx = 1\n").unwrap_err();
        assert!(err.to_string().contains("expected indented block"));
    }

    #[test]
    fn test_header_without_block() {
        let err = parse("si verum:\n").unwrap_err();
        assert!(err.to_string().contains("expected indented block"));
    }

    #[test]
    fn test_alio_without_si() {
        let err = parse("alio:\n    x = 1\n").unwrap_err();
        assert!(err.to_string().contains("'alio' without matching 'si'"));
    }

    #[test]
    fn test_reserved_keyword_rejected() {
        let err = parse("dum verum:\n    x = 1\n").unwrap_err();
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_first_error_wins() {
        let err = parse("x = \ny = \n").unwrap_err();
        assert_eq!(err.line(), 1, "only the first error is surfaced");
    }

    #[test]
    fn test_lexer_error_takes_precedence() {
        // Line 1 has a parse error, line 2 a lexical error; the lexical
        // error is what the caller sees.
        let err = parse("x =\ny = $\n").unwrap_err();
        assert_eq!(err.kind(), "lexer error");
    }

    #[test]
    fn test_error_location() {
        let err = parse("x 5\n").unwrap_err();
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 3);
    }

    #[test]
    fn test_statement_without_trailing_newline() {
        let program = parse_ok("x = 1");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_empty_source() {
        let program = parse_ok("");
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_comment_only_source() {
        let program = parse_ok("# tantum notae\n\n# aliae notae\n");
        assert!(program.statements.is_empty());
    }
}
