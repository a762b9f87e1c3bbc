use std::process::ExitCode;

use colored::Colorize;

mod cli;
mod commands;

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    match commands::run(argv) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
