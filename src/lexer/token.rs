use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where the token appears (1-indexed)
    pub line: usize,
    /// Column number where the token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

/// All possible token types in Noema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Integer(i64),
    /// String literal (double-quoted, no escape processing)
    Str(String),

    /// Identifier; may contain `.` so dotted builtin names lex as one token
    Identifier(String),

    // Keywords with semantics today
    /// `si` keyword (if)
    Si,
    /// `aliosi` keyword (else-if)
    Aliosi,
    /// `alio` keyword (else)
    Alio,
    /// `import` keyword
    Import,
    /// `verum` literal keyword (true)
    Verum,
    /// `falsum` literal keyword (false)
    Falsum,
    /// `nulla` literal keyword (null)
    Nulla,
    /// `et` keyword (logical and)
    Et,
    /// `aut` keyword (logical or)
    Aut,
    /// `non` keyword (logical not)
    Non,

    // Keywords reserved for future language features
    /// `pro` keyword (reserved: for loops)
    Pro,
    /// `dum` keyword (reserved: while loops)
    Dum,
    /// `frange` keyword (reserved: break)
    Frange,
    /// `perge` keyword (reserved: continue)
    Perge,
    /// `munus` keyword (reserved: function definitions)
    Munus,
    /// `redit` keyword (reserved: return)
    Redit,
    /// `conare` keyword (reserved: try)
    Conare,
    /// `nisi` keyword (reserved: except)
    Nisi,
    /// `denique` keyword (reserved: finally)
    Denique,
    /// `iacta` keyword (reserved: throw)
    Iacta,
    /// `in` keyword (reserved: membership)
    In,

    // Operators
    /// Plus operator (+)
    Plus,
    /// Minus operator (-)
    Minus,
    /// Star operator (*)
    Star,
    /// Slash operator (/)
    Slash,
    /// Percent operator (%)
    Percent,

    // Comparators
    /// Equality comparator (==)
    EqEq,
    /// Inequality comparator (!=)
    NotEq,
    /// Less than comparator (<)
    Lt,
    /// Less than or equal comparator (<=)
    LtEq,
    /// Greater than comparator (>)
    Gt,
    /// Greater than or equal comparator (>=)
    GtEq,

    /// Assignment operator (=)
    Assign,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left bracket [ (reserved)
    LeftBracket,
    /// Right bracket ] (reserved)
    RightBracket,
    /// Colon (:)
    Colon,
    /// Comma delimiter (reserved)
    Comma,

    // Structural
    /// End of a logical line
    Newline,
    /// One indentation level opened
    Indent,
    /// One indentation level closed
    Dedent,

    // Special
    /// End of input marker
    Eof,
}

impl TokenKind {
    /// Looks up the keyword token for a scanned word, if it is one
    pub fn keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "si" => TokenKind::Si,
            "aliosi" => TokenKind::Aliosi,
            "alio" => TokenKind::Alio,
            "import" => TokenKind::Import,
            "verum" => TokenKind::Verum,
            "falsum" => TokenKind::Falsum,
            "nulla" => TokenKind::Nulla,
            "et" => TokenKind::Et,
            "aut" => TokenKind::Aut,
            "non" => TokenKind::Non,
            "pro" => TokenKind::Pro,
            "dum" => TokenKind::Dum,
            "frange" => TokenKind::Frange,
            "perge" => TokenKind::Perge,
            "munus" => TokenKind::Munus,
            "redit" => TokenKind::Redit,
            "conare" => TokenKind::Conare,
            "nisi" => TokenKind::Nisi,
            "denique" => TokenKind::Denique,
            "iacta" => TokenKind::Iacta,
            "in" => TokenKind::In,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Si
                | TokenKind::Aliosi
                | TokenKind::Alio
                | TokenKind::Import
                | TokenKind::Verum
                | TokenKind::Falsum
                | TokenKind::Nulla
                | TokenKind::Et
                | TokenKind::Aut
                | TokenKind::Non
                | TokenKind::Pro
                | TokenKind::Dum
                | TokenKind::Frange
                | TokenKind::Perge
                | TokenKind::Munus
                | TokenKind::Redit
                | TokenKind::Conare
                | TokenKind::Nisi
                | TokenKind::Denique
                | TokenKind::Iacta
                | TokenKind::In
        )
    }

    /// Coarse category name, as printed by the token dumper
    pub fn kind_name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Identifier(_) => "IDENTIFIER",
            TokenKind::Integer(_) => "NUMBER",
            TokenKind::Str(_) => "STRING",
            k if k.is_keyword() => "KEYWORD",
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent => "OPERATOR",
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => "COMPARATOR",
            TokenKind::Assign => "ASSIGN",
            TokenKind::LeftParen | TokenKind::RightParen => "PAREN",
            TokenKind::LeftBracket | TokenKind::RightBracket => "BRACKET",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            _ => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(id) => write!(f, "{}", id),
            _ => write!(f, "{}", self.kind_name()),
        }
    }
}
