//! Output renderers. Each is a pure function of a [`VerificationReport`].

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};
use std::str::FromStr;

use assertive_ir::Severity;
use assertive_term::VerificationCondition;

use crate::result::VerificationReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable condition blocks.
    #[default]
    Text,
    /// One lemma per condition, for an external proof assistant.
    Theory,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Theory => write!(f, "theory"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "theory" => Ok(OutputFormat::Theory),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format `{other}` (expected `text`, `theory` or `json`)")),
        }
    }
}

pub fn render(report: &VerificationReport, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Text => render_text(report, verbose),
        OutputFormat::Theory => render_theory(report),
        OutputFormat::Json => format!("{:#}", render_json(report)),
    }
}

pub fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

pub fn render_text(report: &VerificationReport, verbose: bool) -> String {
    let mut out = String::new();
    if verbose && !report.trace.is_empty() {
        out.push_str("Proof-rule trace:\n\n");
        for line in &report.trace {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
    }

    for (i, vc) in report.conditions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{vc}");
    }
    if report.conditions.is_empty() {
        let _ = writeln!(out, "No verification conditions for {}.", report.unit);
    }

    if !report.failures.is_empty() {
        out.push_str("\nAbandoned obligations:\n");
        for failure in &report.failures {
            let _ = writeln!(out, "  {}: [{}] {}", failure.obligation, failure.code, failure.message);
        }
    }

    // Errors already appear as abandoned obligations.
    let warnings: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    if !warnings.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for diagnostic in warnings {
            let _ = writeln!(out, "  {diagnostic}");
        }
    }

    if let Some(verdicts) = &report.verdicts {
        out.push_str("\nVerdicts:\n");
        for verdict in verdicts {
            let _ = writeln!(out, "  {verdict}");
            if verbose {
                for step in &verdict.log {
                    let _ = writeln!(out, "    {step}");
                }
            }
        }
        if let Some(summary) = report.summary() {
            let _ = writeln!(out, "\n{summary}");
        }
    }
    out
}

/// Lemma identifier for a condition name such as `3_1`.
fn lemma_name(vc: &VerificationCondition) -> String {
    let cleaned: String = vc
        .name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("VC_{cleaned}")
}

pub fn render_theory(report: &VerificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "theory {}_VCs", report.unit);
    let _ = writeln!(out, "begin");
    for vc in &report.conditions {
        out.push('\n');
        match vc.location() {
            Some(loc) if loc.has_position() => {
                let _ = writeln!(out, "(* {}: {loc} *)", vc.description());
            }
            _ => {
                let _ = writeln!(out, "(* {} *)", vc.description());
            }
        }
        let _ = writeln!(out, "lemma {}:", lemma_name(vc));
        for (i, fact) in vc.antecedent().iter().enumerate() {
            let keyword = if i == 0 { "assumes" } else { "    and" };
            let _ = writeln!(out, "  {keyword} \"{fact}\"");
        }
        for (i, goal) in vc.consequent().iter().enumerate() {
            let keyword = if i == 0 { "shows" } else { "  and" };
            let _ = writeln!(out, "  {keyword} \"{goal}\"");
        }
        if vc.consequent().is_empty() {
            let _ = writeln!(out, "  shows \"true\"");
        }
        let _ = writeln!(out, "  oops");
    }
    out.push('\n');
    let _ = writeln!(out, "end");
    out
}

pub fn vc_json(vc: &VerificationCondition) -> Value {
    json!({
        "name": vc.name(),
        "description": vc.description(),
        "location": vc.location(),
        "antecedent": vc.antecedent().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        "consequent": vc.consequent().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        "sha256": sha256_hex(&vc.to_string()),
    })
}

pub fn render_json(report: &VerificationReport) -> Value {
    let failures: Vec<Value> = report
        .failures
        .iter()
        .map(|f| {
            json!({
                "obligation": f.obligation,
                "code": f.code,
                "message": f.message,
                "location": f.location,
            })
        })
        .collect();
    let mut value = json!({
        "unit": report.unit,
        "vcs": report.conditions.iter().map(vc_json).collect::<Vec<_>>(),
        "failures": failures,
        "diagnostics": report.diagnostics,
    });
    if let Some(verdicts) = &report.verdicts {
        value["verdicts"] = json!(verdicts);
        value["summary"] = json!(report.summary());
    }
    value
}
