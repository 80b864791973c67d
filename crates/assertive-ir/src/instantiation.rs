//! Renaming of a parameterized module's formal parameters to the actual
//! arguments supplied by a facility.

use assertive_term::{Exp, MathType};

use crate::ast::{ModuleArgument, ModuleParameter};

/// Formal-to-actual mapping for constants, types and operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instantiation {
    constants: Vec<(Exp, Exp)>,
    types: Vec<(String, MathType)>,
    operations: Vec<(String, String)>,
}

impl Instantiation {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Pair `params` with `args` positionally.
    pub fn between(params: &[ModuleParameter], args: &[ModuleArgument]) -> Result<Self, String> {
        if params.len() != args.len() {
            return Err(format!(
                "expected {} argument(s), found {}",
                params.len(),
                args.len()
            ));
        }
        let mut out = Self::default();
        for (param, arg) in params.iter().zip(args) {
            match (param, arg) {
                (ModuleParameter::Constant { name, ty }, ModuleArgument::Constant { value }) => {
                    out.constants
                        .push((Exp::var(name.clone(), ty.clone()), value.clone()));
                }
                (ModuleParameter::Type { name }, ModuleArgument::Type { ty }) => {
                    out.types.push((name.clone(), ty.clone()));
                }
                (ModuleParameter::Operation { operation }, ModuleArgument::Operation { name, .. }) => {
                    out.operations.push((operation.name.clone(), name.clone()));
                }
                (param, _) => {
                    return Err(format!(
                        "argument for parameter `{}` has the wrong kind",
                        param.name()
                    ))
                }
            }
        }
        Ok(out)
    }

    pub fn is_identity(&self) -> bool {
        self.constants.is_empty() && self.types.is_empty() && self.operations.is_empty()
    }

    pub fn constants(&self) -> &[(Exp, Exp)] {
        &self.constants
    }

    pub fn operations(&self) -> &[(String, String)] {
        &self.operations
    }

    pub fn extend(&mut self, other: Instantiation) {
        self.constants.extend(other.constants);
        self.types.extend(other.types);
        self.operations.extend(other.operations);
    }

    /// Rename every formal in `exp` to its actual.
    pub fn apply(&self, exp: &Exp) -> Exp {
        if self.is_identity() {
            return exp.clone();
        }
        let mut out = exp.substitute_all(&self.constants);
        for (name, ty) in &self.types {
            out = out.rename_type(name, ty);
        }
        for (from, to) in &self.operations {
            out = out.rename_operator(from, to);
        }
        out
    }

    pub fn apply_type(&self, ty: &MathType) -> MathType {
        self.types
            .iter()
            .fold(ty.clone(), |acc, (name, actual)| acc.rename(name, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::OperationDecl;

    #[test]
    fn renames_constants_types_and_operations() {
        let params = vec![
            ModuleParameter::Type {
                name: "Entry".into(),
            },
            ModuleParameter::Constant {
                name: "Max_Depth".into(),
                ty: MathType::Integer,
            },
            ModuleParameter::Operation {
                operation: OperationDecl::new("Are_Ordered"),
            },
        ];
        let args = vec![
            ModuleArgument::Type {
                ty: MathType::Integer,
            },
            ModuleArgument::Constant {
                value: Exp::int(10),
            },
            ModuleArgument::Operation {
                name: "Int_Less".into(),
                qualifier: None,
            },
        ];
        let inst = Instantiation::between(&params, &args).unwrap();
        let e = Exp::and(
            Exp::less_than(Exp::var("d", MathType::Integer), Exp::var("Max_Depth", MathType::Integer)),
            Exp::apply(
                "Are_Ordered",
                vec![Exp::var("e", MathType::named("Entry"))],
                MathType::Boolean,
            ),
        );
        let out = inst.apply(&e);
        assert_eq!(out.to_string(), "(d < 10) and Int_Less(e)");
        let (_, ordered) = out.binary("and").unwrap();
        assert_eq!(ordered.args()[0].ty, Some(MathType::Integer));
    }

    #[test]
    fn arity_and_kind_mismatch_are_rejected() {
        let params = vec![ModuleParameter::Type {
            name: "Entry".into(),
        }];
        assert!(Instantiation::between(&params, &[]).is_err());
        let wrong = vec![ModuleArgument::Constant {
            value: Exp::int(1),
        }];
        assert!(Instantiation::between(&params, &wrong)
            .unwrap_err()
            .contains("Entry"));
    }
}
