use std::path::PathBuf;
use tracing::info;

use assertive_engine::{pipeline, PipelineOptions};

use super::helpers::{apply_output_args, emit, pipeline_error, read_source, render_phase_profile_summary};
use crate::cli::OutputArgs;

pub(crate) fn run_generate_command(file: PathBuf, output: OutputArgs) -> miette::Result<()> {
    let source = read_source(&file)?;
    let mut options = PipelineOptions::default();
    apply_output_args(&mut options, &output)?;

    let report = pipeline::run(&source, &options).map_err(pipeline_error)?;
    info!(
        file = %file.display(),
        conditions = report.conditions.len(),
        phases = %render_phase_profile_summary(&report),
        "generation complete"
    );
    emit(&report, &options, &output)?;

    if !report.failures.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}
