use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use lam::evaluator::DEFAULT_MAX_DEPTH;
use lam::{Env, Evaluator, Lexer};
use tracing::{debug, warn};

/// Runs a lam program.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Source file to run.
    #[clap(value_parser)]
    path: PathBuf,

    /// Print the token stream before running.
    #[clap(long, action)]
    tokens: bool,

    /// Print the parsed program before running.
    #[clap(long, action)]
    ast: bool,

    /// Maximum depth of nested lambda calls.
    #[clap(long, value_parser, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run(args: &Args, source: &str) -> Result<(), lam::Error> {
    if args.tokens {
        let tokens = Lexer::new(source).collect::<Result<Vec<_>, _>>()?;
        println!("Tokens: {:#?}", tokens);
    }

    let program = lam::parse(source)?;
    if args.ast {
        println!("Parsed: {}", program);
    }

    let env = Env::from(lam::native());
    let mut evaluator = Evaluator::new().max_depth(args.max_depth);
    evaluator.evaluate(&program, &env)?;
    evaluator.flush()
}

fn main() {
    init_tracing();
    let args = Args::parse();

    debug!(path = %args.path.display(), "reading source");
    let source = fs::read_to_string(&args.path).unwrap_or_else(|e| {
        eprintln!("Failed to read '{}': {}", args.path.display(), e);
        process::exit(1);
    });

    if let Err(e) = run(&args, &source) {
        warn!(kind = ?e.kind(), "evaluation failed");
        io::stdout().flush().ok();
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
