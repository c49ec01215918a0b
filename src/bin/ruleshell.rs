//! # ruleshell Entry Point
//!
//! Binary entry point for the interactive interpreter.
//!
//! ## Usage
//!
//! ```bash
//! # Start the interpreter
//! ruleshell
//!
//! # Start with debug logging
//! ruleshell --debug
//!
//! # Show version
//! ruleshell --version
//! ```

use eyre::{bail, Result, WrapErr};
use ruleshell::cli::history::history_path;
use ruleshell::{logging, CommandRegistry, Repl};
use std::env;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut debug = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("ruleshell {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--debug" | "-D" => {
                debug = true;
            }
            other => {
                print_usage();
                bail!("Unknown option: {}", other);
            }
        }
    }

    logging::init(debug);

    let registry = CommandRegistry::with_builtins().wrap_err("failed to register commands")?;

    print_welcome();

    let mut repl = Repl::new(registry, history_path())?;
    repl.run()?;

    Ok(())
}

fn print_welcome() {
    let version = format!("ruleshell version {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("*************************************************************");
    println!("*                                                           *");
    println!("*            W E L C O M E  to  R U L E S H E L L           *");
    println!("*                                                           *");
    println!("*    {:<55}*", version);
    println!("*                                                           *");
    println!("*                 Type 'help' for in-line help.             *");
    println!("*                                                           *");
    println!("*************************************************************");
    println!();
}

fn print_usage() {
    println!("ruleshell - interactive command interpreter");
    println!();
    println!("USAGE:");
    println!("    ruleshell [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -D, --debug        Enable debug logging");
    println!("    -h, --help         Print help information");
    println!("    -V, --version      Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    RULESHELL_HISTORY  History file location (empty disables history)");
}
