use tracing::trace;

use super::token::{Token, TokenKind};
use crate::error::Error;

/// Fixed indentation unit, in columns
pub const INDENT_SPACES: usize = 4;
/// Maximum nesting depth of the indentation stack
pub const MAX_INDENT_DEPTH: usize = 256;

/// Indentation-aware scanner for Noema source text
///
/// Works line by line and synthesizes NEWLINE, INDENT and DEDENT tokens from
/// the off-side rule: the indentation unit is 4 spaces, tabs are rejected,
/// and a stack of indentation levels turns width changes into structural
/// tokens. Multi-level jumps are observable as repeated single-level tokens,
/// drained one per call from pending counters. Inside parentheses all
/// structural token generation is suspended, so expressions may span lines.
///
/// The error policy is sticky: the first lexical error latches and every
/// later call returns an EOF token without further scanning. A single
/// buffered token backs [`Lexer::peek_token`].
pub struct Lexer {
    /// Source split into physical lines, each keeping its trailing newline
    lines: Vec<Vec<char>>,
    /// Current line number (1-indexed; 0 before the first line is read)
    line_num: usize,
    /// Current position within the current line
    pos: usize,
    /// Stack of indentation levels in units of 4 columns, starts at [0]
    indent_stack: Vec<usize>,
    /// INDENT tokens still owed from a multi-level jump
    pending_indents: usize,
    /// DEDENT tokens still owed from a multi-level drop
    pending_dedents: usize,
    /// Open parenthesis depth; positive depth suspends structural tokens
    paren_depth: usize,
    /// Single-token lookahead buffer
    peeked: Option<Token>,
    /// First lexical error, latched forever
    error: Option<Error>,
}

impl Lexer {
    /// Creates a new lexer over the given source text
    ///
    /// CRLF line endings are normalized to LF before scanning.
    pub fn new(source: &str) -> Self {
        let lines = source
            .split_inclusive('\n')
            .map(|raw| {
                let line = raw.strip_suffix("\r\n").map(|s| format!("{}\n", s));
                match line {
                    Some(normalized) => normalized.chars().collect(),
                    None => raw.chars().collect(),
                }
            })
            .collect();

        Lexer {
            lines,
            line_num: 0,
            pos: 0,
            indent_stack: vec![0],
            pending_indents: 0,
            pending_dedents: 0,
            paren_depth: 0,
            peeked: None,
            error: None,
        }
    }

    /// Consumes and returns the next token
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan_token()
    }

    /// Returns the next token without consuming it
    pub fn peek_token(&mut self) -> Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan_token());
        }
        // Buffer was just filled above.
        self.peeked.clone().unwrap_or_else(|| self.eof_token())
    }

    /// Returns true once a lexical error has latched
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The latched lexical error, if any
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    fn set_error(&mut self, line: usize, column: usize, message: impl Into<String>) {
        if self.error.is_some() {
            return;
        }
        let message = message.into();
        trace!(line, column, %message, "lexical error latched");
        self.error = Some(Error::Lex {
            line,
            column,
            message,
        });
    }

    fn eof_token(&self) -> Token {
        Token::new(TokenKind::Eof, "", self.line_num, 1)
    }

    fn scan_token(&mut self) -> Token {
        loop {
            if self.error.is_some() {
                return self.eof_token();
            }

            if self.pending_indents > 0 {
                self.pending_indents -= 1;
                return Token::new(TokenKind::Indent, "INDENT", self.line_num, 1);
            }
            if self.pending_dedents > 0 {
                self.pending_dedents -= 1;
                return Token::new(TokenKind::Dedent, "DEDENT", self.line_num, 1);
            }

            // Acquire the next significant line when the current one is spent.
            while self.line_len() == 0 || self.pos >= self.line_len() {
                if !self.read_next_line() {
                    let depth = self.indent_stack.len() - 1;
                    if depth > 0 {
                        self.indent_stack.truncate(1);
                        self.pending_dedents = depth - 1;
                        return Token::new(TokenKind::Dedent, "DEDENT", self.line_num, 1);
                    }
                    return self.eof_token();
                }

                if self.line_is_blank_or_comment() {
                    self.pos = self.line_len();
                    continue;
                }

                if self.paren_depth == 0 {
                    if let Some(tok) = self.handle_indentation() {
                        return tok;
                    }
                } else {
                    self.skip_inline_ws();
                    if self.error.is_some() {
                        return self.eof_token();
                    }
                }
                break;
            }

            self.skip_inline_ws();
            if self.error.is_some() {
                return self.eof_token();
            }

            let col = self.pos + 1;
            let c = match self.peek_char() {
                Some(c) => c,
                None => {
                    // Trailing spaces on a line with no newline character.
                    if self.paren_depth == 0 {
                        return Token::new(TokenKind::Newline, "NEWLINE", self.line_num, col);
                    }
                    continue;
                }
            };

            if c == '#' {
                self.pos = self.line_len();
                if self.paren_depth == 0 {
                    return Token::new(TokenKind::Newline, "NEWLINE", self.line_num, col);
                }
                continue;
            }

            if c == '\n' {
                self.advance();
                if self.paren_depth == 0 {
                    return Token::new(TokenKind::Newline, "NEWLINE", self.line_num, col);
                }
                continue;
            }

            if c == '"' {
                return self.scan_string(col);
            }
            if c.is_ascii_digit() {
                return self.scan_number(col);
            }
            if c.is_ascii_alphabetic() || c == '_' {
                return self.scan_identifier_or_keyword(col);
            }

            return self.scan_operator_or_punct(col);
        }
    }

    /// Compares the new line's indentation with the stack top and produces
    /// the structural token owed, if any
    fn handle_indentation(&mut self) -> Option<Token> {
        let old_level = self.indent_stack.last().copied().unwrap_or(0);

        let spaces = self.count_indent_spaces();
        if self.error.is_some() {
            return Some(self.eof_token());
        }

        if spaces % INDENT_SPACES != 0 {
            self.set_error(self.line_num, 1, "indentation must be multiple of 4 spaces");
            return Some(self.eof_token());
        }

        let new_level = spaces / INDENT_SPACES;

        if new_level > old_level {
            if self.indent_stack.len() + (new_level - old_level) > MAX_INDENT_DEPTH {
                self.set_error(self.line_num, 1, "indent stack overflow");
                return Some(self.eof_token());
            }
            // Push every intermediate level so INDENT and DEDENT counts
            // stay balanced even across multi-unit jumps.
            for level in old_level + 1..=new_level {
                self.indent_stack.push(level);
            }
            self.pending_indents = (new_level - old_level) - 1;
            return Some(Token::new(TokenKind::Indent, "INDENT", self.line_num, 1));
        }

        if new_level < old_level {
            let mut pops = 0;
            while self.indent_stack.len() > 1
                && self.indent_stack.last().copied().unwrap_or(0) > new_level
            {
                self.indent_stack.pop();
                pops += 1;
            }
            if self.indent_stack.last().copied().unwrap_or(0) != new_level {
                self.set_error(self.line_num, 1, "inconsistent dedent");
                return Some(self.eof_token());
            }
            self.pending_dedents = pops - 1;
            return Some(Token::new(TokenKind::Dedent, "DEDENT", self.line_num, 1));
        }

        None
    }

    fn scan_string(&mut self, start_col: usize) -> Token {
        self.advance(); // opening "

        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    self.set_error(self.line_num, start_col, "unterminated string literal");
                    return self.eof_token();
                }
                Some('"') => {
                    self.advance(); // closing "
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Token::new(TokenKind::Str(value.clone()), value, self.line_num, start_col)
    }

    fn scan_number(&mut self, start_col: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }

        match text.parse::<i64>() {
            Ok(value) => Token::new(TokenKind::Integer(value), text, self.line_num, start_col),
            Err(_) => {
                self.set_error(self.line_num, start_col, "number literal out of range");
                self.eof_token()
            }
        }
    }

    fn scan_identifier_or_keyword(&mut self, start_col: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '.') {
                break;
            }
            text.push(c);
            self.advance();
        }

        match TokenKind::keyword(&text) {
            Some(kind) => Token::new(kind, text, self.line_num, start_col),
            None => Token::new(
                TokenKind::Identifier(text.clone()),
                text,
                self.line_num,
                start_col,
            ),
        }
    }

    fn scan_operator_or_punct(&mut self, start_col: usize) -> Token {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return self.eof_token(),
        };
        self.advance();
        let line = self.line_num;

        match c {
            '=' => {
                if self.match_char('=') {
                    Token::new(TokenKind::EqEq, "==", line, start_col)
                } else {
                    Token::new(TokenKind::Assign, "=", line, start_col)
                }
            }
            '!' => {
                if self.match_char('=') {
                    Token::new(TokenKind::NotEq, "!=", line, start_col)
                } else {
                    self.set_error(line, start_col, "unexpected '!'");
                    self.eof_token()
                }
            }
            '<' => {
                if self.match_char('=') {
                    Token::new(TokenKind::LtEq, "<=", line, start_col)
                } else {
                    Token::new(TokenKind::Lt, "<", line, start_col)
                }
            }
            '>' => {
                if self.match_char('=') {
                    Token::new(TokenKind::GtEq, ">=", line, start_col)
                } else {
                    Token::new(TokenKind::Gt, ">", line, start_col)
                }
            }
            '+' => Token::new(TokenKind::Plus, "+", line, start_col),
            '-' => Token::new(TokenKind::Minus, "-", line, start_col),
            '*' => Token::new(TokenKind::Star, "*", line, start_col),
            '/' => Token::new(TokenKind::Slash, "/", line, start_col),
            '%' => Token::new(TokenKind::Percent, "%", line, start_col),
            '(' => {
                self.paren_depth += 1;
                Token::new(TokenKind::LeftParen, "(", line, start_col)
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                Token::new(TokenKind::RightParen, ")", line, start_col)
            }
            '[' => Token::new(TokenKind::LeftBracket, "[", line, start_col),
            ']' => Token::new(TokenKind::RightBracket, "]", line, start_col),
            ':' => Token::new(TokenKind::Colon, ":", line, start_col),
            ',' => Token::new(TokenKind::Comma, ",", line, start_col),
            other => {
                self.set_error(line, start_col, format!("unexpected character '{}'", other));
                self.eof_token()
            }
        }
    }

    fn count_indent_spaces(&mut self) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek_char() {
            match c {
                ' ' => {
                    count += 1;
                    self.advance();
                }
                '\t' => {
                    self.set_error(
                        self.line_num,
                        self.pos + 1,
                        "tab character is not allowed (use 4 spaces)",
                    );
                    return 0;
                }
                _ => break,
            }
        }
        count
    }

    fn skip_inline_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                ' ' => {
                    self.advance();
                }
                '\t' => {
                    self.set_error(
                        self.line_num,
                        self.pos + 1,
                        "tab character is not allowed (use 4 spaces)",
                    );
                    return;
                }
                _ => return,
            }
        }
    }

    fn line_is_blank_or_comment(&self) -> bool {
        let line = match self.current_line() {
            Some(line) => line,
            None => return true,
        };
        let mut i = 0;
        while i < line.len() && line[i] == ' ' {
            i += 1;
        }
        i >= line.len() || line[i] == '\n' || line[i] == '#'
    }

    fn read_next_line(&mut self) -> bool {
        if self.line_num >= self.lines.len() {
            return false;
        }
        self.line_num += 1;
        self.pos = 0;
        true
    }

    fn current_line(&self) -> Option<&[char]> {
        if self.line_num == 0 {
            return None;
        }
        self.lines.get(self.line_num - 1).map(Vec::as_slice)
    }

    fn line_len(&self) -> usize {
        self.current_line().map_or(0, <[char]>::len)
    }

    fn peek_char(&self) -> Option<char> {
        self.current_line()
            .and_then(|line| line.get(self.pos))
            .copied()
    }

    fn advance(&mut self) {
        if self.pos < self.line_len() {
            self.pos += 1;
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn test_simple_assignment() {
        assert_eq!(
            kinds("x = 5\n"),
            vec![
                TokenKind::Identifier("x".to_string()),
                TokenKind::Assign,
                TokenKind::Integer(5),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dotted_identifier_is_one_token() {
        let toks = kinds("sonus.dic(\"salve\")\n");
        assert_eq!(toks[0], TokenKind::Identifier("sonus.dic".to_string()));
        assert_eq!(toks[1], TokenKind::LeftParen);
        assert_eq!(toks[2], TokenKind::Str("salve".to_string()));
        assert_eq!(toks[3], TokenKind::RightParen);
    }

    #[test]
    fn test_keywords_and_comparators() {
        let toks = kinds("si a <= 3:\n");
        assert_eq!(
            toks,
            vec![
                TokenKind::Si,
                TokenKind::Identifier("a".to_string()),
                TokenKind::LtEq,
                TokenKind::Integer(3),
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_dedent() {
        let toks = kinds("si verum:\n    x = 1\ny = 2\n");
        assert_eq!(
            toks,
            vec![
                TokenKind::Si,
                TokenKind::Verum,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Assign,
                TokenKind::Integer(1),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Identifier("y".to_string()),
                TokenKind::Assign,
                TokenKind::Integer(2),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_drains_dedents() {
        let toks = kinds("si verum:\n    si verum:\n        x = 1\n");
        let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
        let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
        assert_eq!(toks.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_multi_level_jump_emits_single_level_tokens() {
        // An 8-space jump from level 0 is two observable INDENTs.
        let toks = kinds("si verum:\n        x = 1\n");
        let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let toks = kinds("x = 1\n\n   \n# nota\ny = 2\n");
        assert!(!toks.contains(&TokenKind::Indent));
        let idents: Vec<_> = toks
            .iter()
            .filter(|k| matches!(k, TokenKind::Identifier(_)))
            .collect();
        assert_eq!(idents.len(), 2);
    }

    #[test]
    fn test_inline_comment_produces_newline() {
        let toks = kinds("x = 1  # nota\n");
        assert_eq!(toks[3], TokenKind::Newline);
        assert_eq!(toks[4], TokenKind::Eof);
    }

    #[test]
    fn test_parens_suspend_structure() {
        let toks = kinds("x = (1 +\n    2)\n");
        // No INDENT and only the trailing NEWLINE appears.
        assert!(!toks.contains(&TokenKind::Indent));
        assert!(!toks.contains(&TokenKind::Dedent));
        let newlines = toks.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn test_tab_is_rejected() {
        let mut lexer = Lexer::new("\tx = 1\n");
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Eof);
        assert!(lexer.has_error());
        let err = lexer.error().cloned();
        assert!(err
            .map(|e| e.to_string().contains("tab character"))
            .unwrap_or(false));
    }

    #[test]
    fn test_bad_indent_width() {
        let mut lexer = Lexer::new("si verum:\n   x = 1\n");
        loop {
            if lexer.next_token().kind == TokenKind::Eof {
                break;
            }
        }
        assert!(lexer.has_error());
        assert_eq!(
            lexer.error().map(Error::column),
            Some(1),
            "indentation errors pin to column 1"
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("x = \"salve\n");
        lexer.next_token(); // x
        lexer.next_token(); // =
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Eof);
        assert!(lexer.has_error());
    }

    #[test]
    fn test_sticky_first_error_wins() {
        // Both lines contain lexical errors; only the first latches.
        let mut lexer = Lexer::new("x = $\ny = @\n");
        loop {
            if lexer.next_token().kind == TokenKind::Eof {
                break;
            }
        }
        let err = lexer.error().cloned();
        assert_eq!(err.as_ref().map(Error::line), Some(1));
        assert!(err
            .map(|e| e.to_string().contains('$'))
            .unwrap_or(false));
    }

    #[test]
    fn test_peek_then_next() {
        let mut lexer = Lexer::new("x = 1\n");
        let peeked = lexer.peek_token();
        let next = lexer.next_token();
        assert_eq!(peeked, next);
        assert_eq!(
            lexer.next_token().kind,
            TokenKind::Assign,
            "peek must not consume"
        );
    }

    #[test]
    fn test_crlf_normalized() {
        assert_eq!(
            kinds("x = 1\r\ny = 2\r\n"),
            kinds("x = 1\ny = 2\n")
        );
    }

    #[test]
    fn test_no_trailing_newline() {
        let toks = kinds("x = 1");
        assert_eq!(
            toks,
            vec![
                TokenKind::Identifier("x".to_string()),
                TokenKind::Assign,
                TokenKind::Integer(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_out_of_range() {
        let mut lexer = Lexer::new("x = 99999999999999999999999\n");
        loop {
            if lexer.next_token().kind == TokenKind::Eof {
                break;
            }
        }
        assert!(lexer.has_error());
    }
}
