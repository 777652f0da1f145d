use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as ArgParser;
use tracing_subscriber::EnvFilter;

use noema::{diag, dump, Evaluator, Parser};

#[derive(ArgParser, Debug)]
#[command(name = "noema", version, about = "The Noema language interpreter")]
struct Args {
    /// Script to run; reads stdin when omitted
    script: Option<PathBuf>,

    /// Dump the token stream instead of running
    #[arg(long)]
    tokens: bool,

    /// Dump the parsed program tree instead of running
    #[arg(long)]
    ast: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let (source, label) = match load_source(&args) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("noema: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&args, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.diagnostic(&label));
            ExitCode::FAILURE
        }
    }
}

fn load_source(args: &Args) -> anyhow::Result<(String, String)> {
    match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("cannot read '{}'", path.display()))?;
            Ok((source, path.display().to_string()))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("cannot read stdin")?;
            Ok((source, diag::UNNAMED_INPUT.to_string()))
        }
    }
}

fn dispatch(args: &Args, source: &str) -> noema::Result<()> {
    if args.tokens {
        return dump::dump_tokens(source, &mut io::stdout().lock());
    }

    let program = Parser::from_source(source).parse_program()?;

    if args.ast {
        return dump::dump_ast(&program, &mut io::stdout().lock());
    }

    let mut evaluator = Evaluator::with_output(Box::new(io::stdout()));
    evaluator.execute(&program)?;
    io::stdout().flush().map_err(|e| noema::Error::Io {
        message: e.to_string(),
    })
}
