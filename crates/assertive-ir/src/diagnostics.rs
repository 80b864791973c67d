//! Diagnostics sink the core reports obligation-local problems to.

use serde::Serialize;
use std::fmt;

use assertive_term::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn error(code: &str, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity}[{}]: {}", self.code, self.message)?;
        match &self.location {
            Some(loc) if loc.has_position() => write!(f, " at {loc}"),
            _ => Ok(()),
        }
    }
}

/// Append-only receiver of diagnostics. One writer per compilation unit.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn error(&mut self, message: &str) {
        self.report(Diagnostic::error("error", message, None));
    }

    fn error_at(&mut self, location: &Location, message: &str) {
        self.report(Diagnostic::error("error", message, Some(location.clone())));
    }
}

/// In-memory sink preserving report order.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBuffer {
    entries: Vec<Diagnostic>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_order_and_severity() {
        let mut sink = DiagnosticBuffer::new();
        sink.report(Diagnostic::warning("malformed-rule", "dropped", None));
        sink.error_at(&Location::new("a.rb", 3, 1), "no specification for `Pop`");
        assert_eq!(sink.len(), 2);
        assert!(sink.has_errors());
        assert_eq!(
            sink.entries()[1].to_string(),
            "error[error]: no specification for `Pop` at a.rb(3:1)"
        );
    }
}
