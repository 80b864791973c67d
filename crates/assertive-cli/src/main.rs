#![doc = include_str!("../README.md")]

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::prove::ProveArgs;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate { file, output } => {
            commands::generate::run_generate_command(file, output)?;
        }
        Commands::Prove {
            file,
            output,
            simplify,
            strategy,
            max_path_length,
            max_steps,
            timeout,
        } => {
            commands::prove::run_prove_command(
                file,
                output,
                ProveArgs {
                    simplify,
                    strategy,
                    max_path_length,
                    max_steps,
                    timeout,
                },
            )?;
        }
        Commands::Check { file, format } => {
            commands::check::run_check_command(file, format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertive_engine::OutputFormat;
    use assertive_prover::Strategy;
    use std::path::PathBuf;

    fn prove_args(cli: Cli) -> (cli::OutputArgs, ProveArgs) {
        match cli.command {
            Commands::Prove {
                output,
                simplify,
                strategy,
                max_path_length,
                max_steps,
                timeout,
                ..
            } => (
                output,
                ProveArgs {
                    simplify,
                    strategy,
                    max_path_length,
                    max_steps,
                    timeout,
                },
            ),
            _ => panic!("expected prove command"),
        }
    }

    #[test]
    fn prove_defaults_match_pipeline_defaults() {
        let cli = Cli::try_parse_from(["assertive", "prove", "unit.json"]).unwrap();
        let (output, args) = prove_args(cli);
        let options = commands::prove::prove_options(&args, &output).unwrap();
        assert!(options.generate_proofs);
        assert!(!options.simplify);
        assert_eq!(options.strategy, Strategy::Guided);
        assert_eq!(options.prover_options(), assertive_prover::ProverOptions::default());
        assert_eq!(options.format, OutputFormat::Text);
    }

    #[test]
    fn prove_accepts_every_search_flag() {
        let cli = Cli::try_parse_from([
            "assertive",
            "prove",
            "unit.json",
            "--simplify",
            "--strategy",
            "legacy",
            "--max-path-length",
            "3",
            "--max-steps",
            "50",
            "--timeout",
            "9",
            "--format",
            "json",
            "--verbose",
        ])
        .unwrap();
        let (output, args) = prove_args(cli);
        let options = commands::prove::prove_options(&args, &output).unwrap();
        assert!(options.simplify && options.verbose);
        assert_eq!(options.strategy, Strategy::Legacy);
        assert_eq!((options.max_path_length, options.max_steps), (3, 50));
        assert_eq!(options.timeout_secs, Some(9));
        assert_eq!(options.format, OutputFormat::Json);
    }

    #[test]
    fn generate_takes_output_path() {
        let cli = Cli::try_parse_from(["assertive", "generate", "unit.json", "--out", "vcs.txt"]).unwrap();
        match cli.command {
            Commands::Generate { file, output } => {
                assert_eq!(file, PathBuf::from("unit.json"));
                assert_eq!(output.out, Some(PathBuf::from("vcs.txt")));
                assert!(!output.verbose);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn generate_rejects_search_flags() {
        assert!(Cli::try_parse_from(["assertive", "generate", "unit.json", "--simplify"]).is_err());
    }

    #[test]
    fn bad_strategy_is_reported_not_panicked() {
        let cli = Cli::try_parse_from(["assertive", "prove", "unit.json", "--strategy", "bfs"]).unwrap();
        let (output, args) = prove_args(cli);
        assert!(commands::prove::prove_options(&args, &output).is_err());
    }
}
