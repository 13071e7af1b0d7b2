//!
//! Command-line front end for the Mimic interpreter.
//!

mod shell;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use mimic_interpreter::runtime::Runtime;

#[derive(Debug, Clone, PartialEq, Parser)]
#[clap(about, author)]
struct Options {
    /// File to evaluate.
    #[clap(name = "FILE")]
    file: Option<PathBuf>,

    /// Evaluate the given expression and print its result.
    #[clap(short = 'e', long)]
    eval: Option<String>,
}

fn main() -> Result<()> {
    let options = Options::parse();

    let mut rt = Runtime::new();
    let ctx = rt.ground_context();

    if let Some(expression) = options.eval {
        let value = rt.evaluate_source(&expression, &ctx)?;
        println!("{}", value.display_string());
        return Ok(());
    }

    match options.file {
        Some(file) => {
            let source = fs::read_to_string(&file)
                .with_context(|| format!("couldn't read file '{}'", file.display()))?;
            rt.evaluate_source(&source, &ctx)
                .with_context(|| format!("couldn't evaluate file '{}'", file.display()))?;
            Ok(())
        }
        None => shell::interactive(&mut rt, &ctx),
    }
}
