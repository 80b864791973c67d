use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use assertive_ir::validation::{ensure_fully_typed, UntypedExpression};
use assertive_ir::{CompilationUnit, DiagnosticBuffer, DiagnosticSink, IrError, SymbolTable, TheoremDecl};
use assertive_prover::prover::{DEFAULT_MAX_PATH_LENGTH, DEFAULT_MAX_STEPS};
use assertive_prover::{
    ProofOutcome, ProofState, Prover, ProverOptions, RuleRegistrationError, Strategy, TheoremLibrary,
};
use assertive_term::VerificationCondition;
use assertive_vcgen::{GenerationOutput, GeneratorOptions, VcGenError};

use crate::render::OutputFormat;
use crate::result::{VcVerdict, VerificationReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Load error: {0}")]
    Load(#[from] IrError),
    #[error("Internal error: {0}")]
    Untyped(#[from] UntypedExpression),
    #[error("Internal error: {0}")]
    Internal(#[from] VcGenError),
    #[error("Theorem library error: {0}")]
    Library(#[from] RuleRegistrationError),
}

/// Run configuration. Consumed by the pipeline, never by the proof rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Run the prover after generation.
    pub generate_proofs: bool,
    /// Keep the proof-rule trace and the prover step logs.
    pub verbose: bool,
    /// Eliminate hypothesis-defined variables before searching.
    pub simplify: bool,
    pub strategy: Strategy,
    pub max_path_length: usize,
    pub max_steps: usize,
    pub timeout_secs: Option<u64>,
    pub format: OutputFormat,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            generate_proofs: false,
            verbose: false,
            simplify: false,
            strategy: Strategy::default(),
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_steps: DEFAULT_MAX_STEPS,
            timeout_secs: None,
            format: OutputFormat::default(),
        }
    }
}

impl PipelineOptions {
    pub fn prover_options(&self) -> ProverOptions {
        ProverOptions {
            max_path_length: self.max_path_length,
            max_steps: self.max_steps,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

pub fn load(source: &str) -> Result<CompilationUnit, PipelineError> {
    Ok(CompilationUnit::from_json(source)?)
}

/// Reject units containing untyped expressions before any rule runs.
pub fn preflight(unit: &CompilationUnit) -> Result<(), PipelineError> {
    ensure_fully_typed(unit)?;
    Ok(())
}

pub fn generate(
    unit: CompilationUnit,
    options: &PipelineOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<GenerationOutput, PipelineError> {
    let table = SymbolTable::new(unit)?;
    let generator_options = GeneratorOptions { trace: options.verbose };
    Ok(assertive_vcgen::generate(&table, generator_options, sink)?)
}

/// Prove each condition independently, in order.
pub fn prove(
    conditions: &[VerificationCondition],
    library: &TheoremLibrary,
    options: &PipelineOptions,
) -> Vec<ProofOutcome> {
    let chooser = options.strategy.chooser(library);
    let prover = Prover::new(chooser.as_ref(), options.prover_options());
    conditions
        .iter()
        .map(|vc| {
            let outcome = if options.simplify {
                prover.prove_state(vc.name(), ProofState::from_vc(vc).eliminate_variables())
            } else {
                prover.prove(vc)
            };
            debug!(vc = vc.name(), proved = outcome.verdict.is_proved(), steps = outcome.steps, "proof attempt finished");
            outcome
        })
        .collect()
}

/// Load a serialized compilation unit and verify it.
pub fn run(source: &str, options: &PipelineOptions) -> Result<VerificationReport, PipelineError> {
    let started = Instant::now();
    let unit = load(source)?;
    info!(target_module = %unit.target, modules = unit.modules.len(), "loaded compilation unit");
    let mut report = VerificationReport::new(unit.target.clone());
    report.record_phase("load", started);
    verify_into(unit, options, report)
}

/// Verify an already loaded unit.
pub fn verify_unit(unit: CompilationUnit, options: &PipelineOptions) -> Result<VerificationReport, PipelineError> {
    let report = VerificationReport::new(unit.target.clone());
    verify_into(unit, options, report)
}

fn verify_into(
    unit: CompilationUnit,
    options: &PipelineOptions,
    mut report: VerificationReport,
) -> Result<VerificationReport, PipelineError> {
    let mut sink = DiagnosticBuffer::new();

    let started = Instant::now();
    preflight(&unit)?;
    report.record_phase("preflight", started);

    let theorems: Vec<TheoremDecl> = unit.theorems().cloned().collect();

    let started = Instant::now();
    let output = generate(unit, options, &mut sink)?;
    report.record_phase("generate", started);
    info!(
        conditions = output.conditions.len(),
        failures = output.failures.len(),
        "generation finished"
    );
    for failure in &output.failures {
        warn!(obligation = %failure.obligation, code = failure.code, "obligation abandoned");
    }

    if options.generate_proofs {
        let started = Instant::now();
        let library = TheoremLibrary::from_theorems(&theorems, &mut sink)?;
        let outcomes = prove(&output.conditions, &library, options);
        let mut verdicts: Vec<VcVerdict> = outcomes.iter().map(VcVerdict::from_outcome).collect();
        verdicts.extend(output.failures.iter().map(VcVerdict::from_failure));
        report.verdicts = Some(verdicts);
        report.record_phase("prove", started);
        if let Some(summary) = report.summary() {
            info!(%summary, strategy = %options.strategy, "proving finished");
        }
    }

    report.trace = output.trace.lines().to_vec();
    report.conditions = output.conditions;
    report.failures = output.failures;
    report.diagnostics = sink.into_entries();
    Ok(report)
}
