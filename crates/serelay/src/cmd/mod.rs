use clap::{Args, Subcommand};
use std::path::PathBuf;

use serelay_relay::Role;
use serelay_transport::{DEFAULT_BAUD_RATE, DEFAULT_DEVICE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod forward;
pub mod relay;
pub mod version;

/// Source file used when none is given.
pub const DEFAULT_INPUT: &str = "default.csv";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a file over the serial link and capture records coming back.
    Relay(RelayArgs),
    /// Forward raw bytes between the serial link and stdin/stdout.
    Forward(ForwardArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: Option<OutputFormat>) -> CliResult<i32> {
    match command {
        Command::Relay(args) => relay::run(args, format),
        Command::Forward(args) => forward::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RelayArgs {
    /// Serial device path.
    #[arg(short = 'p', long = "port", env = "SERELAY_PORT", default_value = DEFAULT_DEVICE)]
    pub port: PathBuf,
    /// File to transmit.
    #[arg(short = 'f', long = "input", env = "SERELAY_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,
    /// File receiving decoded records. Default: stdout.
    #[arg(short = 'o', long = "output", env = "SERELAY_OUTPUT")]
    pub output: Option<PathBuf>,
    /// Line speed in baud.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// End the receiver after this many consecutive idle reads.
    /// Default: run until transmission and transit delay are over.
    #[arg(long, value_name = "READS")]
    pub idle_limit: Option<u32>,
    /// Unrecognised arguments. Reported, then ignored.
    #[arg(allow_hyphen_values = true, hide = true)]
    pub unknown: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ForwardArgs {
    /// Serial device path.
    #[arg(short = 'p', long = "port", env = "SERELAY_PORT", default_value = DEFAULT_DEVICE)]
    pub port: PathBuf,
    /// Copy device input to stdout.
    #[arg(short = 'c', long, conflicts_with = "server")]
    pub client: bool,
    /// Copy stdin to the device (default).
    #[arg(short = 's', long)]
    pub server: bool,
    /// Keep reading through idle timeouts until interrupted.
    #[arg(long, requires = "client")]
    pub follow: bool,
    /// Line speed in baud.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Unrecognised arguments. Reported, then ignored.
    #[arg(allow_hyphen_values = true, hide = true)]
    pub unknown: Vec<String>,
}

impl ForwardArgs {
    pub fn role(&self) -> Role {
        if self.client {
            Role::Client
        } else {
            Role::Server
        }
    }
}

/// Unknown arguments never abort a run; each one is reported on stderr.
pub fn report_unknown(unknown: &[String]) {
    for arg in unknown {
        eprintln!("warning: unknown argument {arg:?} ignored");
        tracing::debug!(argument = %arg, "unknown argument ignored");
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Include build and feature details.
    #[arg(long)]
    pub extended: bool,
}
