//! Drives every obligation of the target module through the proof rules.

use tracing::{debug, info, warn};

use assertive_ir::{Diagnostic, DiagnosticSink, ScopeLookup};
use assertive_term::{Location, VerificationCondition};

use crate::assertive_code::AssertiveCode;
use crate::collector::collect;
use crate::error::{RuleError, VcGenError};
use crate::obligations::{
    correspondence_obligation, facility_obligation, initialization_obligation, procedure_obligation,
};
use crate::rules::{self, RuleContext};
use crate::trace::ProofTrace;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    /// Keep a rule-by-rule trace of every obligation.
    pub trace: bool,
}

/// An obligation or branch that could not be completed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObligationFailure {
    pub obligation: String,
    pub code: &'static str,
    pub message: String,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub conditions: Vec<VerificationCondition>,
    pub failures: Vec<ObligationFailure>,
    pub trace: ProofTrace,
}

impl GenerationOutput {
    fn absorb(&mut self, other: GenerationOutput) {
        self.conditions.extend(other.conditions);
        self.failures.extend(other.failures);
    }
}

pub struct VcGenerator<'a> {
    scope: &'a dyn ScopeLookup,
    trace: ProofTrace,
    obligations: usize,
}

impl<'a> VcGenerator<'a> {
    pub fn new(scope: &'a dyn ScopeLookup, options: GeneratorOptions) -> Self {
        Self {
            scope,
            trace: ProofTrace::new(options.trace),
            obligations: 0,
        }
    }

    /// Generate the conditions of every obligation of the target module:
    /// facility instantiations, then representation rules, then procedures.
    ///
    /// A branch failing for a reason in the verified program is reported to
    /// `sink` and dropped; the rest of the pass continues. An untyped
    /// expression aborts the whole pass.
    pub fn generate(mut self, sink: &mut dyn DiagnosticSink) -> Result<GenerationOutput, VcGenError> {
        let scope = self.scope;
        let ctx = RuleContext::new(scope);
        let target = scope.target();
        info!(module = target.name(), kind = target.kind(), "generating verification conditions");

        let mut output = GenerationOutput::default();
        for facility in target.facilities() {
            let name = format!("Facility Instantiation of {}", facility.name);
            let built = facility_obligation(ctx, facility);
            output.absorb(self.run(&name, built, sink)?);
        }
        if let Some(realization) = target.as_realization() {
            for rep in &realization.representations {
                let name = format!("Correspondence Rule for {}", rep.type_name);
                output.absorb(self.run(&name, correspondence_obligation(ctx, rep), sink)?);
                let name = format!("Initialization Rule for {}", rep.type_name);
                output.absorb(self.run(&name, initialization_obligation(ctx, rep), sink)?);
            }
        }
        for procedure in target.procedures() {
            let name = format!("Procedure {}", procedure.name);
            output.absorb(self.run(&name, procedure_obligation(ctx, procedure), sink)?);
        }

        info!(
            conditions = output.conditions.len(),
            failures = output.failures.len(),
            "generation finished"
        );
        output.trace = self.trace;
        Ok(output)
    }

    /// Run a hand-built obligation to completion.
    pub fn run_obligation(&mut self, code: AssertiveCode, sink: &mut dyn DiagnosticSink) -> Result<GenerationOutput, VcGenError> {
        let name = code.name().to_string();
        self.run(&name, Ok(code), sink)
    }

    pub fn trace(&self) -> &ProofTrace {
        &self.trace
    }

    fn run(
        &mut self,
        obligation: &str,
        built: Result<AssertiveCode, RuleError>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<GenerationOutput, VcGenError> {
        self.obligations += 1;
        let mut output = GenerationOutput::default();
        match built {
            Ok(code) => self.discharge(self.obligations, code, sink, &mut output)?,
            Err(RuleError::Term(source)) => {
                return Err(VcGenError::internal(obligation, "obligation setup", source))
            }
            Err(err) => self.abandon(obligation, err, sink, &mut output),
        }
        Ok(output)
    }

    fn discharge(
        &mut self,
        index: usize,
        code: AssertiveCode,
        sink: &mut dyn DiagnosticSink,
        output: &mut GenerationOutput,
    ) -> Result<(), VcGenError> {
        let ctx = RuleContext::new(self.scope);
        let name = code.name().to_string();
        debug!(obligation = %name, index, "processing obligation");
        self.trace.begin_obligation(&code);

        let mut counter = 0;
        let mut work = vec![code];
        while let Some(mut branch) = work.pop() {
            let Some(stmt) = branch.pop() else {
                let vcs = collect(branch, index, &mut counter)
                    .map_err(|source| VcGenError::internal(&name, "condition collection", source))?;
                for vc in &vcs {
                    self.trace.record_condition(vc);
                }
                output.conditions.extend(vcs);
                continue;
            };
            let shown = stmt.to_string();
            let recorded = self.trace.is_enabled().then(|| stmt.clone());
            match rules::apply(ctx, branch, stmt) {
                Ok(mut next) => {
                    if let Some(applied) = recorded {
                        self.trace.record_rule(&applied, &next);
                    }
                    next.reverse();
                    work.extend(next);
                }
                Err(RuleError::Term(source)) => return Err(VcGenError::internal(&name, shown, source)),
                Err(err) => self.abandon(&name, err, sink, output),
            }
        }
        Ok(())
    }

    fn abandon(&mut self, obligation: &str, err: RuleError, sink: &mut dyn DiagnosticSink, output: &mut GenerationOutput) {
        warn!(obligation, error = %err, "abandoning branch");
        self.trace.record_failure(obligation, &err.to_string());
        sink.report(Diagnostic::error(
            err.code(),
            format!("{obligation}: {err}"),
            err.location().cloned(),
        ));
        output.failures.push(ObligationFailure {
            obligation: obligation.to_string(),
            code: err.code(),
            message: err.to_string(),
            location: err.location().cloned(),
        });
    }
}

/// Convenience wrapper around [`VcGenerator::generate`].
pub fn generate(
    scope: &dyn ScopeLookup,
    options: GeneratorOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<GenerationOutput, VcGenError> {
    VcGenerator::new(scope, options).generate(sink)
}
