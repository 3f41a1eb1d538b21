//! CLI command definitions using clap

use crate::error::CliResult;
use clap::{Args, Parser, Subcommand, ValueEnum};
use signup_probe::{ReporterKind, SuiteConfig};
use std::path::{Path, PathBuf};

/// End-to-end tests for the account signup form
#[derive(Parser, Debug)]
#[command(name = "signup-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the signup suite
    Test(TestArgs),

    /// List test cases without running them
    List(ListArgs),

    /// Print the resolved configuration as YAML
    Config(ConfigArgs),
}

/// Suite config file shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// YAML suite configuration (defaults when omitted)
    #[arg(short, long, env = "SIGNUP_PROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConfigSource {
    /// Load the file, or fall back to environment-adjusted defaults
    pub fn load(&self) -> CliResult<SuiteConfig> {
        Ok(match self.config.as_deref() {
            Some(path) => load_file(path)?,
            None => SuiteConfig::from_env(),
        })
    }
}

fn load_file(path: &Path) -> CliResult<SuiteConfig> {
    Ok(SuiteConfig::load(path)?)
}

/// Arguments for the test command
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct TestArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Run only this browser project (repeatable)
    #[arg(short, long = "project", value_name = "NAME")]
    pub projects: Vec<String>,

    /// Concurrent tests
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Extra attempts after a failure
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-test timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Report format (repeatable)
    #[arg(short, long = "reporter", value_name = "KIND")]
    pub reporters: Vec<ReporterArg>,

    /// Report and artifact directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Only run cases whose id, group or title contains PATTERN
    #[arg(short, long, value_name = "PATTERN")]
    pub grep: Option<String>,

    /// Application base URL
    #[arg(long, env = "SIGNUP_PROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Show browser windows
    #[arg(long, conflicts_with = "headless")]
    pub headed: bool,

    /// Hide browser windows
    #[arg(long)]
    pub headless: bool,

    /// Run against the in-memory signup form instead of a browser
    #[arg(long)]
    pub dry_run: bool,
}

impl TestArgs {
    /// Load the suite configuration and apply command-line overrides
    pub fn resolve_config(&self) -> CliResult<SuiteConfig> {
        let mut config = self.source.load()?;

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(timeout) = self.timeout {
            config.timeouts.test_ms = timeout;
        }
        if !self.reporters.is_empty() {
            config.reporters = self.reporters.iter().map(|r| (*r).into()).collect();
        }
        if let Some(output) = &self.output {
            config.output_dir.clone_from(output);
        }
        if self.grep.is_some() {
            config.grep.clone_from(&self.grep);
        }
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }

        let headless = if self.headed {
            false
        } else {
            self.headless || config.headless
        };
        config = config.with_headless(headless);
        config.projects = config.select_projects(&self.projects)?;
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Only list cases whose id, group or title contains PATTERN
    #[arg(short, long, value_name = "PATTERN")]
    pub grep: Option<String>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Print the built-in defaults, ignoring the file and CI adjustments
    #[arg(long, conflicts_with = "config")]
    pub defaults: bool,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReporterArg {
    /// `index.html` bundle
    Html,
    /// Console list
    List,
    /// `results.json`
    Json,
}

impl From<ReporterArg> for ReporterKind {
    fn from(arg: ReporterArg) -> Self {
        match arg {
            ReporterArg::Html => Self::Html,
            ReporterArg::List => Self::List,
            ReporterArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
