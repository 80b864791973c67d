//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Verification condition generator and prover for specified component programs.\n\n\
    Input is a resolved compilation unit serialized as JSON.\n\n\
    Typical use:\n  \
    1. assertive check unit.json\n  \
    2. assertive generate unit.json --format theory\n  \
    3. assertive prove unit.json --simplify";

#[derive(Parser)]
#[command(name = "assertive")]
#[command(about = "Verification condition generator and prover")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Flags shared by every command that renders conditions.
#[derive(Args, Debug, Clone)]
pub(crate) struct OutputArgs {
    /// Include the proof-rule trace (and prover step logs when proving)
    #[arg(long, default_value_t = false)]
    pub(crate) verbose: bool,

    /// Output format: text | theory | json
    #[arg(long, default_value = "text")]
    pub(crate) format: String,

    /// Also write the rendered output to this file
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate verification conditions without proving them
    #[command(display_order = 10)]
    Generate {
        /// Path to the serialized compilation unit
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate verification conditions and attempt to prove each one
    #[command(display_order = 20)]
    Prove {
        /// Path to the serialized compilation unit
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Eliminate hypothesis-defined variables before searching
        #[arg(long, default_value_t = false)]
        simplify: bool,

        /// Search strategy: default | legacy
        #[arg(long, default_value = "default")]
        strategy: String,

        /// Longest chain of rewrites explored per condition
        #[arg(long, default_value_t = 6)]
        max_path_length: usize,

        /// Rewrites tried per condition before giving up
        #[arg(long, default_value_t = 20_000)]
        max_steps: usize,

        /// Wall-clock limit per condition in seconds (unlimited when absent)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Load and type-check a compilation unit without generating anything
    #[command(display_order = 30)]
    Check {
        /// Path to the serialized compilation unit
        file: PathBuf,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },
}
