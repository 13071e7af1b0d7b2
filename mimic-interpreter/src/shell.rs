use std::io::{self, BufRead, Write};

use anyhow::Result;

use mimic_interpreter::object::Object;
use mimic_interpreter::runtime::Runtime;

/// Launches an interactive read-eval-print loop within the given runtime.
pub fn interactive(rt: &mut Runtime, ctx: &Object) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut counter = 0;
    let mut line = String::new();

    loop {
        write!(&mut stdout, "({}) mimic> ", counter)?;
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let source = line.trim();
        if source.is_empty() {
            continue;
        }
        if source == "exit" || source == "quit" {
            return Ok(());
        }
        match rt.evaluate_source(source, ctx) {
            Ok(value) => println!("= {}", value.display_string()),
            Err(error) => eprintln!("error: {}", error),
        }
        counter += 1;
    }
}
