use serde::Serialize;
use std::fmt;
use std::time::Instant;

use assertive_ir::{Diagnostic, Severity};
use assertive_prover::{ProofOutcome, Verdict};
use assertive_term::VerificationCondition;
use assertive_vcgen::ObligationFailure;

/// Final classification of one condition or abandoned obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VcStatus {
    Proved,
    /// Search ended without a proof. Not a disproof.
    Unproved,
    FatalSpecMissing,
    /// Obligation abandoned for a reason other than a missing specification.
    Abandoned,
}

impl fmt::Display for VcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcStatus::Proved => write!(f, "proved"),
            VcStatus::Unproved => write!(f, "unproved"),
            VcStatus::FatalSpecMissing => write!(f, "fatal-spec-missing"),
            VcStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcVerdict {
    pub name: String,
    pub status: VcStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub steps: usize,
    pub elapsed_ms: u128,
    /// Applied rewrites, in order, for proved conditions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
}

impl VcVerdict {
    pub fn from_outcome(outcome: &ProofOutcome) -> Self {
        let (status, reason, log) = match &outcome.verdict {
            Verdict::Proved { log } => (VcStatus::Proved, None, log.iter().map(|s| s.to_string()).collect()),
            Verdict::Unproved { reason } => (VcStatus::Unproved, Some(reason.to_string()), Vec::new()),
        };
        Self {
            name: outcome.vc.clone(),
            status,
            reason,
            steps: outcome.steps,
            elapsed_ms: outcome.elapsed_ms,
            log,
        }
    }

    pub fn from_failure(failure: &ObligationFailure) -> Self {
        let status = if failure.code == "missing-specification" {
            VcStatus::FatalSpecMissing
        } else {
            VcStatus::Abandoned
        };
        Self {
            name: failure.obligation.clone(),
            status,
            reason: Some(failure.message.clone()),
            steps: 0,
            elapsed_ms: 0,
            log: Vec::new(),
        }
    }
}

impl fmt::Display for VcVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            VcStatus::Proved => write!(f, "VC {}: proved in {} step(s)", self.name, self.log.len()),
            VcStatus::Unproved => write!(
                f,
                "VC {}: unproved after {} step(s) ({})",
                self.name,
                self.steps,
                self.reason.as_deref().unwrap_or("search exhausted")
            ),
            status => write!(
                f,
                "{}: {status} ({})",
                self.name,
                self.reason.as_deref().unwrap_or("no reason recorded")
            ),
        }
    }
}

/// Wall-clock time spent in one pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseProfile {
    pub phase: String,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub proved: usize,
    pub unproved: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} proved, {} unproved, {} failed",
            self.proved, self.total, self.unproved, self.failed
        )
    }
}

/// Everything one run produced for a compilation unit.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub unit: String,
    pub conditions: Vec<VerificationCondition>,
    /// Present only when proving was requested.
    pub verdicts: Option<Vec<VcVerdict>>,
    pub failures: Vec<ObligationFailure>,
    pub diagnostics: Vec<Diagnostic>,
    /// Proof-rule trace, filled in verbose mode.
    pub trace: Vec<String>,
    pub phases: Vec<PhaseProfile>,
}

impl VerificationReport {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Self::default()
        }
    }

    pub fn record_phase(&mut self, phase: &str, started: Instant) {
        self.phases.push(PhaseProfile {
            phase: phase.to_string(),
            elapsed_ms: started.elapsed().as_millis(),
        });
    }

    pub fn summary(&self) -> Option<Summary> {
        let verdicts = self.verdicts.as_ref()?;
        let mut summary = Summary {
            total: verdicts.len(),
            ..Summary::default()
        };
        for verdict in verdicts {
            match verdict.status {
                VcStatus::Proved => summary.proved += 1,
                VcStatus::Unproved => summary.unproved += 1,
                VcStatus::FatalSpecMissing | VcStatus::Abandoned => summary.failed += 1,
            }
        }
        Some(summary)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// No abandoned obligation, no error diagnostic, and every condition
    /// proved when proving was requested.
    pub fn is_success(&self) -> bool {
        if !self.failures.is_empty() || self.has_errors() {
            return false;
        }
        match &self.verdicts {
            Some(verdicts) => verdicts.iter().all(|v| v.status == VcStatus::Proved),
            None => true,
        }
    }
}
