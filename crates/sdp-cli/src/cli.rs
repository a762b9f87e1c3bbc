use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docker-sdp",
    about = "docker stack deploy with automatic secret and config rotation",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage docker stacks
    Stack(StackArgs),
}

#[derive(Args)]
pub struct StackArgs {
    #[command(subcommand)]
    pub command: StackCommand,
}

#[derive(Subcommand)]
pub enum StackCommand {
    /// Deploy a stack, rotating file-backed secrets and configs
    #[command(disable_help_flag = true)]
    Deploy(DeployArgs),
}

#[derive(Args)]
pub struct DeployArgs {
    /// Arguments forwarded to `docker stack deploy`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

impl DeployArgs {
    /// The argument vector docker receives, program name excluded.
    pub fn forwarded(&self) -> Vec<String> {
        ["stack", "deploy"]
            .into_iter()
            .map(String::from)
            .chain(self.args.iter().cloned())
            .collect()
    }
}
