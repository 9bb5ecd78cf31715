//! ohprobe: command-line runner for the Ohouse Android end-to-end suite
//!
//! ## Usage
//!
//! ```bash
//! ohprobe run --priority p1 --report reports/run.json
//! ohprobe run --filter LOGIN_00 --fail-fast --screenshots shots
//! ohprobe list
//! ohprobe config --config suite.yaml
//! ohprobe network disable
//! ohprobe terminate net.bucketplace
//! ```

#![warn(missing_docs)]

mod commands;
mod config;
mod device;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ListArgs, NetworkAction, NetworkArgs, PriorityArg, RunArgs,
    TerminateArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use device::{network, terminate, with_controller};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::{outcome_label, ProgressReporter};
pub use runner::{
    format_scenario_list, list_scenarios, load_app_config, print_scenarios, render_config,
    show_config, verdict, SuiteRunner,
};
