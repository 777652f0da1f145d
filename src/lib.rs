//! Noema: an indentation-structured scripting language
//!
//! The pipeline has three stages. The [`lexer`] turns source text into a
//! token stream, synthesizing INDENT and DEDENT tokens from leading
//! whitespace. The [`parser`] builds a program tree with precedence
//! climbing for expressions. The [`runtime`] walks that tree against a
//! flat variable store.
//!
//! Each stage reports at most one error, the first one it hit, positioned
//! as `path:line:col: kind: message`.
//!
//! # Example
//!
//! ```
//! let source = "x = 2 + 3 * 4\nsonus.dic(x)\n";
//! let output = noema::run_to_string(source).unwrap();
//! assert_eq!(output, "14\n");
//! ```

pub mod diag;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use error::{Error, Result};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, Program};
pub use runtime::{Environment, Evaluator, Value};

/// Parses and executes a program, printing to stdout
pub fn run(source: &str) -> Result<()> {
    let program = Parser::from_source(source).parse_program()?;
    Evaluator::new().execute(&program)
}

/// Parses and executes a program, printing to the given sink
pub fn run_with_output(source: &str, out: Box<dyn std::io::Write>) -> Result<()> {
    let program = Parser::from_source(source).parse_program()?;
    Evaluator::with_output(out).execute(&program)
}

/// Parses and executes a program, returning everything it printed
///
/// Convenient for tests and small embeddings.
pub fn run_to_string(source: &str) -> Result<String> {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Buf(Arc<Mutex<Vec<u8>>>);

    impl Write for Buf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.lock().map_err(poisoned)?.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn poisoned<T>(_: T) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, "output buffer poisoned")
    }

    let buf = Buf(Arc::new(Mutex::new(Vec::new())));
    run_with_output(source, Box::new(buf.clone()))?;

    let bytes = buf.0.lock().map_err(|_| Error::Io {
        message: "output buffer poisoned".to_string(),
    })?;
    String::from_utf8(bytes.clone()).map_err(|e| Error::Io {
        message: e.to_string(),
    })
}
