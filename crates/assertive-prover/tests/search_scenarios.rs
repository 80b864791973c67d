//! Proof search over conditions built the way the generator builds them.

use assertive_ir::{DiagnosticBuffer, TheoremDecl};
use assertive_prover::{
    GuidedChooser, LegacyChooser, ProofState, Prover, ProverOptions, Strategy, TheoremLibrary, UnprovedReason,
    Verdict,
};
use assertive_term::{
    ops, to_pexp, BoundVar, Converter, Exp, MathType, PExp, Quantification, VerificationCondition,
};

fn z(name: &str) -> Exp {
    Exp::var(name, MathType::Integer)
}

fn plus(a: Exp, b: Exp) -> Exp {
    Exp::infix(ops::PLUS, a, b, MathType::Integer)
}

fn le(a: Exp, b: Exp) -> Exp {
    Exp::infix(ops::LESS_EQ, a, b, MathType::Boolean)
}

fn gt(a: Exp, b: Exp) -> Exp {
    Exp::infix(ops::GREATER, a, b, MathType::Boolean)
}

fn ints(names: &[&str]) -> Vec<BoundVar> {
    names.iter().map(|x| BoundVar::new(*x, MathType::Integer)).collect()
}

fn vc(name: &str, given: Vec<Exp>, goals: Vec<Exp>) -> VerificationCondition {
    let mut converter = Converter::new(given.iter().chain(&goals));
    VerificationCondition::new(
        name,
        "Ensures Clause of Push",
        None,
        given.iter().map(|e| converter.fact(e).unwrap()).collect(),
        goals.iter().map(|e| converter.goal(e).unwrap()).collect(),
    )
}

/// Proved by either strategy, with or without eliminating defined symbols
/// first.
fn proved_anyhow(library: &TheoremLibrary, condition: &VerificationCondition) -> bool {
    let initial = ProofState::from_vc(condition);
    [Strategy::Guided, Strategy::Legacy].into_iter().any(|strategy| {
        let chooser = strategy.chooser(library);
        let prover = Prover::new(chooser.as_ref(), ProverOptions::default());
        prover.prove_state(condition.name(), initial.clone()).verdict.is_proved()
            || prover.prove_state(condition.name(), initial.eliminate_variables()).verdict.is_proved()
    })
}

fn theorems() -> Vec<TheoremDecl> {
    let n = || z("n");
    let m = || z("m");
    vec![
        TheoremDecl {
            name: "Plus_Comm".into(),
            assertion: Exp::for_all(ints(&["n", "m"]), Exp::equals(plus(n(), m()), plus(m(), n()))),
        },
        TheoremDecl {
            name: "Plus_Zero".into(),
            assertion: Exp::for_all(ints(&["n"]), Exp::equals(plus(n(), Exp::int(0)), n())),
        },
        TheoremDecl {
            name: "Le_Refl".into(),
            assertion: Exp::for_all(ints(&["n"]), le(n(), n())),
        },
    ]
}

// ---------------------------------------------------------------------------
// Library construction
// ---------------------------------------------------------------------------

#[test]
fn non_equational_theorem_is_dropped_with_a_warning() {
    let mut sink = DiagnosticBuffer::new();
    let library = TheoremLibrary::from_theorems(&theorems(), &mut sink).unwrap();
    assert_eq!(library.len(), 3);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.entries()[0].code, "malformed-rule");
    assert!(sink.entries()[0].message.contains("Le_Refl"));
    assert!(!sink.has_errors());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn post_value_is_substituted_from_the_hypotheses() {
    let library = TheoremLibrary::new();
    let condition = vc(
        "3_1",
        vec![
            le(z("x"), Exp::int(5)),
            Exp::equals(z("?x"), plus(z("x"), Exp::int(1))),
        ],
        vec![le(z("?x"), plus(z("x"), Exp::int(1)))],
    );
    for strategy in [Strategy::Guided, Strategy::Legacy] {
        let chooser = strategy.chooser(&library);
        let out = Prover::new(chooser.as_ref(), ProverOptions::default()).prove(&condition);
        assert!(out.verdict.is_proved(), "{strategy}: {:?}", out.verdict);
        assert_eq!(out.vc, "3_1");
    }
}

#[test]
fn commutativity_then_identity_proves_the_goal() {
    let mut sink = DiagnosticBuffer::new();
    let library = TheoremLibrary::from_theorems(&theorems(), &mut sink).unwrap();
    let condition = vc(
        "1_2",
        vec![le(z("a"), z("b"))],
        vec![le(plus(Exp::int(0), z("a")), z("b"))],
    );
    let chooser = GuidedChooser::new(&library);
    let out = Prover::new(&chooser, ProverOptions::default()).prove(&condition);
    match out.verdict {
        Verdict::Proved { log } => {
            assert_eq!(log.len(), 1, "{log:?}");
            assert_eq!(log[0].rule, "Plus_Comm");
            assert_eq!(log[0].conjunct, 0);
        }
        other => panic!("expected a proof, got {other:?}"),
    }
}

#[test]
fn false_statement_is_unproved_not_an_error() {
    let mut sink = DiagnosticBuffer::new();
    let library = TheoremLibrary::from_theorems(&theorems(), &mut sink).unwrap();
    let condition = vc("2_1", vec![le(z("a"), z("b"))], vec![le(z("b"), z("a"))]);
    let chooser = LegacyChooser::new(&library);
    let out = Prover::new(&chooser, ProverOptions::default()).prove(&condition);
    assert_eq!(out.verdict, Verdict::Unproved { reason: UnprovedReason::SearchExhausted });
}

#[test]
fn zero_timeout_stops_before_the_first_step() {
    let mut sink = DiagnosticBuffer::new();
    let library = TheoremLibrary::from_theorems(&theorems(), &mut sink).unwrap();
    let condition = vc("2_1", vec![], vec![le(plus(z("a"), z("c")), z("a"))]);
    let chooser = GuidedChooser::new(&library);
    let options = ProverOptions {
        timeout: Some(std::time::Duration::ZERO),
        ..ProverOptions::default()
    };
    let out = Prover::new(&chooser, options).prove(&condition);
    assert_eq!(out.verdict, Verdict::Unproved { reason: UnprovedReason::Timeout });
    assert_eq!(out.steps, 0);
}

#[test]
fn variable_elimination_alone_can_prove() {
    let state = ProofState::new(
        vec![to_pexp(&Exp::equals(z("?y"), z("y"))).unwrap()],
        vec![to_pexp(&le(z("?y"), z("y"))).unwrap()],
    );
    assert!(state.eliminate_variables().is_proved());
}

// ---------------------------------------------------------------------------
// Quantified hypotheses
// ---------------------------------------------------------------------------

#[test]
fn existential_hypothesis_says_nothing_about_an_unrelated_goal() {
    let library = TheoremLibrary::new();
    let condition = vc(
        "4_1",
        vec![Exp::exists(ints(&["w"]), Exp::equals(z("x"), z("w"))), gt(z("y"), Exp::int(5))],
        vec![gt(z("x"), Exp::int(5))],
    );
    assert!(!proved_anyhow(&library, &condition));

    let bounded = vc(
        "4_2",
        vec![Exp::exists(ints(&["w"]), gt(z("w"), Exp::int(5)))],
        vec![gt(z("y"), Exp::int(5))],
    );
    assert!(!proved_anyhow(&library, &bounded));
}

#[test]
fn existential_hypothesis_still_witnesses_an_existential_goal() {
    let library = TheoremLibrary::new();
    let condition = vc(
        "4_3",
        vec![Exp::exists(ints(&["w"]), gt(z("w"), Exp::int(5)))],
        vec![Exp::exists(ints(&["v"]), gt(z("v"), Exp::int(5)))],
    );
    assert!(proved_anyhow(&library, &condition));
}

#[test]
fn witness_marked_fact_gives_no_rewrite() {
    let library = TheoremLibrary::new();
    let w = PExp::symbol("w", MathType::Integer).with_quantification(Quantification::ThereExists);
    let x = PExp::symbol("x", MathType::Integer);
    let marked = PExp::apply(ops::EQUALS, vec![x, w], assertive_term::ApplyStyle::Infix, MathType::Boolean);
    let condition = VerificationCondition::new(
        "4_4",
        "Ensures Clause of Push",
        None,
        vec![marked, to_pexp(&gt(z("y"), Exp::int(5))).unwrap()],
        vec![to_pexp(&gt(z("x"), Exp::int(5))).unwrap()],
    );
    assert!(!proved_anyhow(&library, &condition));
}

#[test]
fn universal_hypothesis_is_an_instantiable_rule() {
    let library = TheoremLibrary::new();
    let g = |arg: Exp| Exp::apply("g", vec![arg], MathType::Integer);
    let condition = vc(
        "4_5",
        vec![Exp::for_all(ints(&["n"]), Exp::equals(g(z("n")), plus(z("n"), Exp::int(1))))],
        vec![Exp::equals(g(Exp::int(3)), Exp::int(4))],
    );
    for strategy in [Strategy::Guided, Strategy::Legacy] {
        let chooser = strategy.chooser(&library);
        let out = Prover::new(chooser.as_ref(), ProverOptions::default()).prove(&condition);
        match out.verdict {
            Verdict::Proved { log } => assert_eq!(log[0].rule, "Given 1", "{strategy}"),
            other => panic!("{strategy}: expected a proof, got {other:?}"),
        }
    }
}
