//! Debug dumps of the token stream and the program tree
//!
//! These back the `--tokens` and `--ast` flags. The formats are plain text,
//! one token or statement per line, meant for eyeballing and for golden
//! tests rather than machine consumption.

use std::io::Write;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, TokenKind};
use crate::parser::{Program, Statement, StmtKind};

fn io_err(e: std::io::Error) -> Error {
    Error::Io {
        message: e.to_string(),
    }
}

/// Writes the token stream, one token per line
///
/// Each line is `line:col  KIND  lexeme` with the kind name padded so the
/// lexemes align. Stops after the EOF token; a lexical error ends the dump
/// and is returned.
pub fn dump_tokens(source: &str, out: &mut dyn Write) -> Result<()> {
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        if let Some(err) = lexer.error() {
            return Err(err.clone());
        }
        writeln!(
            out,
            "{}:{}  {:<11}  {}",
            token.line,
            token.column,
            token.kind.kind_name(),
            token.lexeme
        )
        .map_err(io_err)?;
        if token.kind == TokenKind::Eof {
            return Ok(());
        }
    }
}

/// Writes the program tree, blocks indented by two spaces
pub fn dump_ast(program: &Program, out: &mut dyn Write) -> Result<()> {
    for statement in &program.statements {
        dump_statement(statement, 0, out)?;
    }
    Ok(())
}

fn dump_statement(statement: &Statement, depth: usize, out: &mut dyn Write) -> Result<()> {
    let pad = "  ".repeat(depth);
    match &statement.kind {
        StmtKind::Import { module } => {
            writeln!(out, "{}IMPORT {}", pad, module).map_err(io_err)?;
        }
        StmtKind::Assignment { target, value } => {
            writeln!(out, "{}ASSIGN {} = {}", pad, target, value).map_err(io_err)?;
        }
        StmtKind::Print { arg } => {
            writeln!(out, "{}CALL sonus.dic({})", pad, arg).map_err(io_err)?;
        }
        StmtKind::Conditional { branches } => {
            for (i, branch) in branches.iter().enumerate() {
                match (&branch.condition, i) {
                    (Some(cond), 0) => {
                        writeln!(out, "{}SI {}:", pad, cond).map_err(io_err)?;
                    }
                    (Some(cond), _) => {
                        writeln!(out, "{}ALIOSI {}:", pad, cond).map_err(io_err)?;
                    }
                    (None, _) => {
                        writeln!(out, "{}ALIO:", pad).map_err(io_err)?;
                    }
                }
                for inner in &branch.body {
                    dump_statement(inner, depth + 1, out)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn tokens(source: &str) -> String {
        let mut buf = Vec::new();
        dump_tokens(source, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn ast(source: &str) -> String {
        let program = Parser::from_source(source).parse_program().unwrap();
        let mut buf = Vec::new();
        dump_ast(&program, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_token_dump_format() {
        let out = tokens("x = 5\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "1:1  IDENTIFIER   x");
        assert_eq!(lines[1], "1:3  ASSIGN       =");
        assert_eq!(lines[2], "1:5  NUMBER       5");
        assert_eq!(lines[3], "1:6  NEWLINE      NEWLINE");
        assert!(lines[4].contains("EOF"));
    }

    #[test]
    fn test_token_dump_surfaces_lexer_error() {
        let mut buf = Vec::new();
        let err = dump_tokens("x = $\n", &mut buf).unwrap_err();
        assert_eq!(err.kind(), "lexer error");
    }

    #[test]
    fn test_ast_dump_shapes() {
        let source = concat!(
            "import sonus\n",
            "x = 2 + 3 * 4\n",
            "si x == 14:\n",
            "    sonus.dic(\"ita\")\n",
            "alio:\n",
            "    sonus.dic(\"minime\")\n",
        );
        let expected = concat!(
            "IMPORT sonus\n",
            "ASSIGN x = (2 + (3 * 4))\n",
            "SI (x == 14):\n",
            "  CALL sonus.dic(\"ita\")\n",
            "ALIO:\n",
            "  CALL sonus.dic(\"minime\")\n",
        );
        assert_eq!(ast(source), expected);
    }
}
