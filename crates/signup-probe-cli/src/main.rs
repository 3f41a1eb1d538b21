//! signup-probe: end-to-end tests for the account signup form
//!
//! ## Usage
//!
//! ```bash
//! signup-probe test --headless --reporter list
//! RUST_LOG=signup_probe=debug signup-probe test -g TC_SUBMIT_
//! ```

use clap::Parser;
use signup_probe_cli::{handlers, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

/// Logs go to stderr; `RUST_LOG` wins over the `-v` level
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn run(config: &CliConfig, command: Commands) -> CliResult<()> {
    match command {
        Commands::Test(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(handlers::execute_test(config, &args))
        }
        Commands::List(args) => handlers::execute_list(&args),
        Commands::Config(args) => handlers::execute_config(&args),
    }
}
