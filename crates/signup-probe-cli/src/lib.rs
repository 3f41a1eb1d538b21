//! Command-line runner for the signup-probe suite.
//!
//! ```bash
//! signup-probe test                          # every case on every project
//! signup-probe test -p chromium -g TC_GN_    # one project, gender cases
//! signup-probe test --dry-run                # in-memory form, no browser
//! signup-probe list                          # print case ids
//! signup-probe config > suite.yaml           # dump the resolved config
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigSource, ListArgs, ReporterArg, TestArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
