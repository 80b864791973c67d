use std::path::PathBuf;
use tracing::info;

use assertive_engine::{pipeline, PipelineOptions};

use super::helpers::{
    apply_output_args, emit, parse_strategy, pipeline_error, read_source, render_phase_profile_summary,
};
use crate::cli::OutputArgs;

pub(crate) struct ProveArgs {
    pub(crate) simplify: bool,
    pub(crate) strategy: String,
    pub(crate) max_path_length: usize,
    pub(crate) max_steps: usize,
    pub(crate) timeout: Option<u64>,
}

pub(crate) fn prove_options(args: &ProveArgs, output: &OutputArgs) -> miette::Result<PipelineOptions> {
    let mut options = PipelineOptions {
        generate_proofs: true,
        simplify: args.simplify,
        strategy: parse_strategy(&args.strategy)?,
        max_path_length: args.max_path_length,
        max_steps: args.max_steps,
        timeout_secs: args.timeout,
        ..PipelineOptions::default()
    };
    apply_output_args(&mut options, output)?;
    Ok(options)
}

/// Exit status 2 when any condition is unproved or any obligation failed.
pub(crate) fn run_prove_command(file: PathBuf, output: OutputArgs, args: ProveArgs) -> miette::Result<()> {
    let source = read_source(&file)?;
    let options = prove_options(&args, &output)?;

    let report = pipeline::run(&source, &options).map_err(pipeline_error)?;
    if let Some(summary) = report.summary() {
        info!(
            file = %file.display(),
            %summary,
            phases = %render_phase_profile_summary(&report),
            "proving complete"
        );
    }
    emit(&report, &options, &output)?;

    if !report.is_success() {
        std::process::exit(2);
    }
    Ok(())
}
