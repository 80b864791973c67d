//! Human-readable log of the rules applied while generating conditions.

use std::fmt::Write;

use assertive_term::VerificationCondition;

use crate::assertive_code::{AssertiveCode, VerificationStatement};

const RULE: &str = "========================================";

#[derive(Debug, Clone, Default)]
pub struct ProofTrace {
    enabled: bool,
    lines: Vec<String>,
}

impl ProofTrace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn begin_obligation(&mut self, code: &AssertiveCode) {
        if !self.enabled {
            return;
        }
        self.lines.push(RULE.to_string());
        self.lines.push(format!("{} ({})", code.name(), code.module()));
        self.lines.push(RULE.to_string());
        let free: Vec<String> = code.free_vars().iter().map(|v| v.to_string()).collect();
        if !free.is_empty() {
            self.lines.push(format!("Free Variables: {}", free.join(", ")));
        }
    }

    pub fn record_rule(&mut self, applied: &VerificationStatement, branches: &[AssertiveCode]) {
        if !self.enabled {
            return;
        }
        let mut line = String::new();
        let _ = write!(line, "Applied {} Rule: {applied}", applied.rule_name());
        if branches.len() > 1 {
            let _ = write!(line, " ({} branches)", branches.len());
        }
        self.lines.push(line);
        if let Some(first) = branches.first() {
            self.lines.push(format!("    Goal: {}", first.folded_goal()));
        }
    }

    pub fn record_condition(&mut self, vc: &VerificationCondition) {
        if self.enabled {
            self.lines.push(format!("Collected VC {}: {}", vc.name(), vc.description()));
        }
    }

    pub fn record_failure(&mut self, obligation: &str, message: &str) {
        if self.enabled {
            self.lines.push(format!("Abandoned {obligation}: {message}"));
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertive_term::{Exp, MathType};

    #[test]
    fn disabled_trace_records_nothing() {
        let mut trace = ProofTrace::new(false);
        let code = AssertiveCode::new("Procedure P", "M");
        trace.begin_obligation(&code);
        trace.record_rule(&VerificationStatement::Remember, &[code]);
        assert!(trace.lines().is_empty());
        assert_eq!(trace.render(), "");
    }

    #[test]
    fn enabled_trace_shows_rule_and_goal() {
        let mut trace = ProofTrace::new(true);
        let mut code = AssertiveCode::new("Procedure P", "M");
        code.add_free_var("x", MathType::Integer);
        trace.begin_obligation(&code);
        code.confirm(Exp::var("x", MathType::Boolean));
        trace.record_rule(&VerificationStatement::Remember, &[code]);
        let text = trace.render();
        assert!(text.contains("Procedure P (M)"));
        assert!(text.contains("Free Variables: M::x : Z"));
        assert!(text.contains("Applied Remember Rule: Remember"));
        assert!(text.contains("    Goal: x"));
    }
}
