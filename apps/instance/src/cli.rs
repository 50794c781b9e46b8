use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "webguard-instance", version, about = "WebGuard monitoring instance")]
pub struct Cli {
    /// Optional TOML configuration file; environment variables take precedence
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the scheduler and the liveness endpoint (default)
    Serve,

    /// Run every monitoring job once and exit
    Monitoring,
}

impl Cli {
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
