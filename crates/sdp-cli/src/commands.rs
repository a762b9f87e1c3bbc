use std::process::{ExitCode, ExitStatus};

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use sdp_core::{forward, DeployConfig, StackDeployer, DIGEST_HEX_LEN};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command, StackArgs, StackCommand};

pub fn run(argv: Vec<String>) -> anyhow::Result<ExitCode> {
    let config = DeployConfig::from_env().context("failed to read current directory")?;
    init_logging(config.verbose);

    match Cli::try_parse_from(&argv) {
        Ok(cli) => match cli.command {
            Command::Stack(StackArgs {
                command: StackCommand::Deploy(args),
            }) => cmd_deploy(config, args.forwarded()),
        },
        Err(err) if err.kind() == ErrorKind::DisplayVersion => {
            print!("{}", err.render());
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => cmd_usage(&config),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .ok();
}

fn cmd_deploy(config: DeployConfig, args: Vec<String>) -> anyhow::Result<ExitCode> {
    tracing::debug!(?args, "docker-sdp stack deploy");
    let status = StackDeployer::new(config).run(&args)?;
    Ok(exit_code(status))
}

fn cmd_usage(config: &DeployConfig) -> anyhow::Result<ExitCode> {
    println!();
    println!(
        "{} v{}",
        "docker-stack-deploy (docker-sdp)".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", "=".repeat(39));
    println!();
    println!("docker-sdp wraps `docker stack deploy` and adds the following features:");
    println!();
    println!(
        "- appends the first {DIGEST_HEX_LEN} characters of the SHA-1 hash of the contents of any \
         config/secret to its name so rolling updates always pick up new content"
    );
    println!();
    println!("Usage: {} [...]", "docker-sdp stack deploy".cyan());
    println!();
    println!("Usage of docker stack deploy follows:");

    let docker = forward::locate_executable(&config.docker_candidates)?;
    let help = ["stack", "deploy", "--help"].map(String::from);
    let status = forward::run(&docker, &help, &config.working_dir)?;
    Ok(exit_code(status))
}

/// Docker's exit status as ours; a signal death maps to `128 + signal`.
fn exit_code(status: ExitStatus) -> ExitCode {
    ExitCode::from(exit_code_value(status))
}

fn exit_code_value(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return clamp_code(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128u8.wrapping_add(signal as u8);
        }
    }
    1
}

/// Codes outside `0..=255` (possible on Windows) become a plain failure.
fn clamp_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_codes_become_failure() {
        assert_eq!(clamp_code(0), 0);
        assert_eq!(clamp_code(7), 7);
        assert_eq!(clamp_code(255), 255);
        assert_eq!(clamp_code(256), 1);
        assert_eq!(clamp_code(300), 1);
        assert_eq!(clamp_code(-1), 1);
    }
}

#[cfg(all(test, unix))]
mod unix_tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn exit_code_passes_through() {
        assert_eq!(exit_code_value(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code_value(ExitStatus::from_raw(7 << 8)), 7);
    }

    #[test]
    fn signal_maps_to_128_plus() {
        assert_eq!(exit_code_value(ExitStatus::from_raw(9)), 137);
    }
}
