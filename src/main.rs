use std::io::{self, BufRead, IsTerminal};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use scheme::Interpreter;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut interp = Interpreter::new();

    // Evaluation tracing for debugging (set via env var SCHEME_TRACE=1)
    if std::env::var("SCHEME_TRACE")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        interp.trace = true;
    }

    let mut load_files: Vec<String> = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--load" => {
                if i + 1 < args.len() {
                    load_files.push(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("--load requires a file path");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Usage: scheme [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --load <file>    Evaluate a source file before starting the REPL");
                println!("  --help, -h       Show this help message");
                println!();
                println!("Environment variables:");
                println!("  SCHEME_TRACE=1   Print each form and result to stderr");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Try 'scheme --help' for usage information.");
                std::process::exit(1);
            }
        }
    }

    for path in &load_files {
        load_file(&mut interp, path);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        run_interactive(&mut interp);
    } else {
        run_piped(&mut interp);
    }
}

/// Evaluate every form of a source file, collecting between forms.
fn load_file(interp: &mut Interpreter, path: &str) {
    let input = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let mut pos = 0;
    let mut count = 0;
    loop {
        match interp.run_at(&input, pos) {
            Ok(Some((_, next))) => {
                pos = next;
                count += 1;
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("{}: expression {}: {}", path, count + 1, e);
                std::process::exit(1);
            }
        }
    }
}

/// Interactive shell: one top-level form per line, results on stdout,
/// errors on stderr. Ctrl-C clears the line, Ctrl-D exits.
fn run_interactive(interp: &mut Interpreter) {
    let mut editor = DefaultEditor::new().expect("failed to initialize line editor");

    println!("Scheme interpreter");
    println!(
        "  Heap: {} cells used, Symbols: {} interned",
        interp.heap.total_cells(),
        interp.symbols.count()
    );
    println!("Ready.\n");

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                report(interp.run(&line));
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }
    }
}

/// Piped mode: each line of stdin is one top-level form.
fn run_piped(interp: &mut Interpreter) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => report(interp.run(&line)),
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }
    }
}

fn report(outcome: scheme::SchemeResult<Option<String>>) {
    match outcome {
        Ok(Some(text)) => println!("{}", text),
        Ok(None) => {}
        Err(e) => eprintln!("{}", e),
    }
}
