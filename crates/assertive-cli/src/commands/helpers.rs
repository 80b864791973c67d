//! Helpers shared by the command implementations.

use miette::{IntoDiagnostic, WrapErr};
use std::path::Path;

use assertive_engine::pipeline::PipelineError;
use assertive_engine::{render, OutputFormat, PipelineOptions, VerificationReport};
use assertive_prover::Strategy;

use crate::cli::OutputArgs;

pub(crate) fn read_source(path: &Path) -> miette::Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", path.display()))
}

pub(crate) fn parse_output_format(raw: &str) -> miette::Result<OutputFormat> {
    raw.parse::<OutputFormat>().map_err(|e| miette::miette!("{e}"))
}

pub(crate) fn parse_strategy(raw: &str) -> miette::Result<Strategy> {
    raw.parse::<Strategy>().map_err(|e| miette::miette!("{e}"))
}

/// Load errors keep their diagnostic codes; everything else is internal.
pub(crate) fn pipeline_error(err: PipelineError) -> miette::Report {
    match err {
        PipelineError::Load(load) => miette::Report::new(load),
        other => miette::miette!(
            code = "assertive::internal",
            help = "the input was accepted by the loader but violates the typing contract",
            "{other}"
        ),
    }
}

pub(crate) fn apply_output_args(options: &mut PipelineOptions, output: &OutputArgs) -> miette::Result<()> {
    options.verbose = output.verbose;
    options.format = parse_output_format(&output.format)?;
    Ok(())
}

/// Print the rendered report and optionally write it to `--out`.
pub(crate) fn emit(report: &VerificationReport, options: &PipelineOptions, output: &OutputArgs) -> miette::Result<()> {
    let rendered = render(report, options.format, options.verbose);
    if let Some(path) = &output.out {
        std::fs::write(path, &rendered)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot write {}", path.display()))?;
        eprintln!("Output written to {}", path.display());
    }
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub(crate) fn render_phase_profile_summary(report: &VerificationReport) -> String {
    report
        .phases
        .iter()
        .map(|p| format!("{}={}ms", p.phase, p.elapsed_ms))
        .collect::<Vec<_>>()
        .join(", ")
}
