//! Lexical analysis for Noema
//!
//! Converts source text into a lazily-produced token stream, reconstructing
//! block structure from indentation as synthetic NEWLINE/INDENT/DEDENT
//! tokens.

mod scanner;
mod token;

pub use scanner::{Lexer, INDENT_SPACES, MAX_INDENT_DEPTH};
pub use token::{Token, TokenKind};
