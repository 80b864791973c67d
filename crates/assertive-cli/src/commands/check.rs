use serde_json::json;
use std::path::PathBuf;

use assertive_engine::pipeline;
use assertive_engine::OutputFormat;

use super::helpers::{parse_output_format, pipeline_error, read_source};

/// Load and preflight only. Exit status 1 on any problem.
pub(crate) fn run_check_command(file: PathBuf, format: String) -> miette::Result<()> {
    let format = parse_output_format(&format)?;
    let source = read_source(&file)?;
    let unit = pipeline::load(&source).map_err(pipeline_error)?;
    pipeline::preflight(&unit).map_err(pipeline_error)?;

    let modules: Vec<String> = unit
        .modules
        .iter()
        .map(|m| format!("{} {}", m.kind(), m.name()))
        .collect();
    match format {
        OutputFormat::Json => {
            let value = json!({
                "file": file.display().to_string(),
                "target": unit.target,
                "modules": modules,
                "theorems": unit.theorems().count(),
                "status": "ok",
            });
            println!("{value:#}");
        }
        OutputFormat::Text | OutputFormat::Theory => {
            println!("{}: ok", file.display());
            println!("  target: {}", unit.target);
            for module in &modules {
                println!("  {module}");
            }
        }
    }
    Ok(())
}
