//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use ohouse_probe::Priority;
use std::path::PathBuf;

/// Ohouse Android end-to-end runner
#[derive(Parser, Debug)]
#[command(name = "ohprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// YAML configuration file (environment variables still override it)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios on the device
    Run(RunArgs),

    /// List registered scenarios
    List(ListArgs),

    /// Print the resolved configuration with the password masked
    Config(ConfigArgs),

    /// Show or switch the device network
    Network(NetworkArgs),

    /// Force-stop an app and return to the launcher
    Terminate(TerminateArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only scenarios whose id contains this text
    #[arg(short, long, value_name = "ID")]
    pub filter: Option<String>,

    /// Only scenarios with this priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Stop after the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Write the JSON suite report here
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Save a screenshot here for each failed scenario
    #[arg(long, value_name = "DIR")]
    pub screenshots: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only scenarios whose id contains this text
    #[arg(short, long, value_name = "ID")]
    pub filter: Option<String>,

    /// Only scenarios with this priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,
}

/// Arguments for the config command
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Write the YAML here instead of standard output
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Arguments for the network command
#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Network action
    #[command(subcommand)]
    pub action: NetworkAction,
}

/// Network actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAction {
    /// Report whether the device has a usable data path
    Status,
    /// Turn mobile data and WiFi on
    Enable,
    /// Turn mobile data and WiFi off
    Disable,
}

/// Arguments for the terminate command
#[derive(Args, Debug, Default)]
pub struct TerminateArgs {
    /// Package to stop (defaults to the configured app package)
    pub package: Option<String>,
}

/// Scenario priority argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
    /// Core journeys
    P1,
    /// Important variations
    P2,
    /// Edge cases and UI details
    P3,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::P1 => Self::P1,
            PriorityArg::P2 => Self::P2,
            PriorityArg::P3 => Self::P3,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Always use colors
    Always,
    /// Automatic detection
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Always => Self::Always,
            ColorArg::Auto => Self::Auto,
            ColorArg::Never => Self::Never,
        }
    }
}
