//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Config file used when `--config` is not given. A missing default file is not an error.
pub const DEFAULT_CONFIG_PATH: &str = "drstat.toml";

/// drstat -- statistics tables from detailed-router logs and evaluator reports.
///
/// Use `drstat <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "drstat", version, about, long_about = None)]
pub struct Cli {
    /// Path to the drstat.toml configuration file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract statistics from router logs and evaluator reports.
    Stat(StatArgs),

    /// Inspect and validate extraction profiles.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- stat ----

/// Scan explicit files or a run directory and print router/evaluator tables.
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Log files to scan; evaluator reports are detected automatically.
    #[arg(required_unless_present = "dir", conflicts_with = "dir")]
    pub files: Vec<PathBuf>,

    /// Run directory with one sub-directory per case.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// YAML profile replacing the built-in router log profile.
    #[arg(long)]
    pub route_profile: Option<PathBuf>,

    /// YAML profile replacing the built-in evaluator report profile.
    #[arg(long)]
    pub eval_profile: Option<PathBuf>,

    /// Number of files scanned concurrently (overrides stat.jobs).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

// ---- rules ----

/// Inspect and validate extraction profiles.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List the rules of the active profiles.
    List {
        /// Show only one profile.
        #[arg(long)]
        profile: Option<ProfileKind>,
    },
    /// Validate a YAML profile file or a directory of them.
    Validate {
        /// Profile file or directory containing `.yml`/`.yaml` files.
        path: PathBuf,
    },
}

/// Profile slots used by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileKind {
    /// Router log profile.
    Route,
    /// Evaluator report profile.
    Eval,
}

impl ProfileKind {
    /// Name of the matching built-in profile.
    pub fn builtin_name(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Eval => "eval",
        }
    }
}

// ---- config ----

/// Manage drstat configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, stat).
        #[arg(long)]
        section: Option<String>,
    },
}
