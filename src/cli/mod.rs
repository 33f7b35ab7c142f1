//! CLI module for A.R.E.S Deep Research
//!
//! Provides command-line interface parsing for the ares-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A.R.E.S Deep Research
///
/// Breaks a research question into sub-topics, researches them in parallel with
/// web search, and writes a cited report.
#[derive(Parser, Debug)]
#[command(
    name = "ares-research",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "A.R.E.S Deep Research - multi-agent web research",
    long_about = "A.R.E.S Deep Research\n\n\
                  A supervisor model splits a research question into sub-topics, delegates each one\n\
                  to an isolated researcher with web search, and writes a cited report from the\n\
                  combined findings.",
    after_help = "EXAMPLES:\n    \
                  ares-research init                          # Scaffold research.toml\n    \
                  ares-research run \"Compare solar vs wind\"   # Research a question\n    \
                  ares-research run -o report.md --no-clarify \"...\"\n    \
                  ares-research config --validate             # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "research.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log format (overrides [logging] format)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question and print the report
    Run {
        /// The research question
        query: String,

        /// Skip the clarifying-question step
        #[arg(long)]
        no_clarify: bool,

        /// Also write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum supervisor decision cycles
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_iterations: Option<u32>,

        /// Parallel researchers the supervisor may launch per decision
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_concurrent: Option<u32>,
    },

    /// Initialize research.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure
        #[arg(long, default_value = "ollama", value_parser = ["ollama", "openai", "both"])]
        provider: String,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
