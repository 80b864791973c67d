//! Proptest strategies for well-typed expressions over a small vocabulary.
//!
//! Integer variables are drawn from `x`, `y`, `z`; boolean structure uses
//! `and`, `implies`, `not` and universal quantification over `x` or `w`.

use proptest::prelude::*;

use crate::exp::{ops, BoundVar, Exp};
use crate::types::MathType;

pub const INT_VARS: [&str; 3] = ["x", "y", "z"];

pub fn arb_int_var() -> impl Strategy<Value = Exp> {
    prop::sample::select(INT_VARS.to_vec()).prop_map(|n| Exp::var(n, MathType::Integer))
}

pub fn arb_int_exp() -> impl Strategy<Value = Exp> {
    let leaf = prop_oneof![
        3 => arb_int_var(),
        2 => (-5i64..5).prop_map(Exp::int),
        1 => arb_int_var().prop_map(Exp::old),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Exp::infix(ops::PLUS, a, b, MathType::Integer)),
            (inner.clone(), inner)
                .prop_map(|(a, b)| Exp::infix(ops::TIMES, a, b, MathType::Integer)),
        ]
    })
}

pub fn arb_bool_exp() -> impl Strategy<Value = Exp> {
    let atom = prop_oneof![
        (arb_int_exp(), arb_int_exp()).prop_map(|(a, b)| Exp::equals(a, b)),
        (arb_int_exp(), arb_int_exp()).prop_map(|(a, b)| Exp::less_than(a, b)),
        any::<bool>().prop_map(Exp::bool),
    ];
    atom.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Exp::infix(ops::AND, a, b, MathType::Boolean)),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Exp::infix(ops::IMPLIES, a, b, MathType::Boolean)),
            inner
                .clone()
                .prop_map(|a| Exp::apply(ops::NOT, vec![a], MathType::Boolean)),
            (prop::sample::select(vec!["x", "w"]), inner).prop_map(|(n, body)| {
                Exp::for_all(vec![BoundVar::new(n, MathType::Integer)], body)
            }),
        ]
    })
}
