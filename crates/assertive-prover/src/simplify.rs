//! Structural simplifier run between search steps.
//!
//! Every rewrite either returns a subterm or a literal, so the simplifier
//! terminates and never grows a term.

use assertive_term::{ops, PExp, Quantification};

pub fn simplify(exp: &PExp) -> PExp {
    if exp.args().is_empty() {
        return exp.clone();
    }
    let args: Vec<PExp> = exp.args().iter().map(simplify).collect();
    let rebuilt = if args.iter().zip(exp.args()).all(|(new, old)| new.ptr_eq(old)) {
        exp.clone()
    } else {
        exp.with_args(args)
    };
    reduce(&rebuilt).unwrap_or(rebuilt)
}

/// Simplify each conjunct, split the results along `and` and drop literal
/// `true`. A conjunct with existential symbols stays whole so that its
/// parts keep sharing one witness.
pub fn simplify_conjuncts(parts: &[PExp]) -> Vec<PExp> {
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        let simplified = simplify(part);
        let pieces = if has_existential(&simplified) {
            vec![simplified]
        } else {
            simplified.conjuncts()
        };
        for piece in pieces {
            if !piece.is_truth(true) && !out.contains(&piece) {
                out.push(piece);
            }
        }
    }
    out
}

pub fn has_existential(exp: &PExp) -> bool {
    exp.preorder()
        .any(|node| node.quantification() == Quantification::ThereExists)
}

fn truth(value: bool) -> Option<PExp> {
    Some(PExp::truth(value))
}

fn literal_ints(a: &PExp, b: &PExp) -> Option<(i64, i64)> {
    Some((a.int_value()?, b.int_value()?))
}

fn reduce(exp: &PExp) -> Option<PExp> {
    let args = exp.args();
    match (exp.name(), args) {
        (ops::NOT, [a]) => {
            if a.is_truth(true) {
                truth(false)
            } else if a.is_truth(false) {
                truth(true)
            } else {
                match (a.name(), a.args()) {
                    (ops::NOT, [inner]) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
        (ops::AND, [a, b]) => {
            if a.is_truth(false) || b.is_truth(false) {
                truth(false)
            } else if a.is_truth(true) || a == b {
                Some(b.clone())
            } else if b.is_truth(true) {
                Some(a.clone())
            } else {
                None
            }
        }
        (ops::OR, [a, b]) => {
            if a.is_truth(true) || b.is_truth(true) {
                truth(true)
            } else if a.is_truth(false) || a == b {
                Some(b.clone())
            } else if b.is_truth(false) {
                Some(a.clone())
            } else {
                None
            }
        }
        (ops::IMPLIES, [a, b]) => {
            if a.is_truth(true) {
                Some(b.clone())
            } else if a.is_truth(false) || b.is_truth(true) || a == b {
                truth(true)
            } else {
                None
            }
        }
        (ops::EQUALS, [a, b]) => {
            if a == b {
                truth(true)
            } else if a.is_literal() && b.is_literal() {
                truth(false)
            } else {
                None
            }
        }
        (ops::NOT_EQUALS, [a, b]) => {
            if a == b {
                truth(false)
            } else if a.is_literal() && b.is_literal() {
                truth(true)
            } else {
                None
            }
        }
        (ops::LESS | ops::LESS_EQ | ops::GREATER | ops::GREATER_EQ, [a, b]) => compare(exp.name(), a, b),
        (ops::PLUS, [a, b]) => {
            if let Some((x, y)) = literal_ints(a, b) {
                return x.checked_add(y).map(PExp::int);
            }
            if b.int_value() == Some(0) {
                Some(a.clone())
            } else if a.int_value() == Some(0) {
                Some(b.clone())
            } else {
                None
            }
        }
        (ops::MINUS, [a, b]) => {
            if let Some((x, y)) = literal_ints(a, b) {
                return x.checked_sub(y).map(PExp::int);
            }
            if b.int_value() == Some(0) {
                Some(a.clone())
            } else if a == b {
                Some(PExp::int(0))
            } else {
                None
            }
        }
        (ops::TIMES, [a, b]) => {
            if let Some((x, y)) = literal_ints(a, b) {
                return x.checked_mul(y).map(PExp::int);
            }
            if a.int_value() == Some(0) || b.int_value() == Some(0) {
                Some(PExp::int(0))
            } else if b.int_value() == Some(1) {
                Some(a.clone())
            } else if a.int_value() == Some(1) {
                Some(b.clone())
            } else {
                None
            }
        }
        _ => None,
    }
}

fn compare(op: &str, a: &PExp, b: &PExp) -> Option<PExp> {
    if let Some((x, y)) = literal_ints(a, b) {
        let holds = match op {
            ops::LESS => x < y,
            ops::LESS_EQ => x <= y,
            ops::GREATER => x > y,
            _ => x >= y,
        };
        return truth(holds);
    }
    if a == b {
        return truth(op == ops::LESS_EQ || op == ops::GREATER_EQ);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertive_term::{ApplyStyle, MathType};

    fn z(name: &str) -> PExp {
        PExp::symbol(name, MathType::Integer)
    }

    fn bin(op: &str, a: PExp, b: PExp) -> PExp {
        let ty = match op {
            ops::PLUS | ops::MINUS | ops::TIMES => MathType::Integer,
            _ => MathType::Boolean,
        };
        PExp::apply(op, vec![a, b], ApplyStyle::Infix, ty)
    }

    #[test]
    fn arithmetic_on_literals_folds() {
        let e = bin(ops::LESS_EQ, bin(ops::PLUS, PExp::int(2), PExp::int(3)), PExp::int(5));
        assert!(simplify(&e).is_truth(true));
        let e = bin(ops::EQUALS, bin(ops::TIMES, z("x"), PExp::int(1)), bin(ops::PLUS, PExp::int(0), z("x")));
        assert!(simplify(&e).is_truth(true));
    }

    #[test]
    fn boolean_identities() {
        let p = PExp::symbol("p", MathType::Boolean);
        let e = bin(ops::AND, PExp::truth(true), bin(ops::IMPLIES, PExp::truth(false), p.clone()));
        assert!(simplify(&e).is_truth(true));
        let not_not = PExp::apply(
            ops::NOT,
            vec![PExp::apply(ops::NOT, vec![p.clone()], ApplyStyle::Prefix, MathType::Boolean)],
            ApplyStyle::Prefix,
            MathType::Boolean,
        );
        assert_eq!(simplify(&not_not), p);
    }

    #[test]
    fn overflow_is_left_alone() {
        let e = bin(ops::PLUS, PExp::int(i64::MAX), PExp::int(1));
        assert_eq!(simplify(&e), e);
    }

    #[test]
    fn existential_conjuncts_are_not_split() {
        let w = z("w").with_quantification(Quantification::ThereExists);
        let both = bin(
            ops::AND,
            bin(ops::LESS, w.clone(), z("a")),
            bin(ops::LESS, PExp::int(0), w),
        );
        let plain = bin(ops::AND, bin(ops::LESS, z("b"), z("a")), PExp::truth(true));
        let out = simplify_conjuncts(&[both.clone(), plain]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], both);
        assert_eq!(out[1].to_string(), "b < a");
    }
}
