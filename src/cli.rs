//! Command-line definitions.
//!
//! Lives in the library so xtask can generate man pages from the same
//! definitions the binary parses.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[cfg(not(feature = "release"))]
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    " ",
    env!("IMSG_BUILD_DATE"),
    ")"
);

#[cfg(feature = "release")]
const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("IMSG_BUILD_DATE"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "imsg",
    version,
    long_version = LONG_VERSION,
    about = "Summarize your recent Messages conversations with an LLM",
    long_about = "Reads recent conversations from the local Messages database, replaces every \
                  contact with an anonymous label, keeps the latest messages per contact and asks \
                  an LLM for a narrative summary and a list of notable events. Nothing is stored.",
    propagate_version = true
)]
pub struct Cli {
    /// Enable debug logging on stderr (or set IMSG_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze recent messages and print a summary
    Analyze(AnalyzeArgs),

    /// Show anonymized per-contact message counts without calling any LLM
    Preview(PreviewArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Flags shared by commands that read the Messages database.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Number of days back to analyze [default: 30]
    #[arg(long, value_name = "N")]
    pub days: Option<u32>,

    /// Path to the Messages database [default: ~/Library/Messages/chat.db]
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Skip the consent prompt (you consent to reading your messages)
    #[arg(long)]
    pub consent: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// LLM API provider: openai or anthropic [default: anthropic]
    #[arg(long = "api", value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the anonymized text sent to the provider
    #[arg(long)]
    pub show_request: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
