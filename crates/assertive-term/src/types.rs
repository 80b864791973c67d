use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved mathematical type attached to every expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MathType {
    Boolean,
    Integer,
    Natural,
    /// Universe type; every type is a subtype of it.
    Entity,
    /// A named model type such as `Str(Entry)` or a type family name.
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualifier: Option<String>,
    },
    Set {
        element: Box<MathType>,
    },
    Function {
        domain: Vec<MathType>,
        range: Box<MathType>,
    },
}

impl MathType {
    pub fn named(name: impl Into<String>) -> Self {
        MathType::Named {
            name: name.into(),
            qualifier: None,
        }
    }

    pub fn set_of(element: MathType) -> Self {
        MathType::Set {
            element: Box::new(element),
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, MathType::Boolean)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MathType::Integer | MathType::Natural)
    }

    /// Name of a named type, if this is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            MathType::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Subtype check used when binding pattern variables.
    ///
    /// `N` is a subtype of `Z`, everything is a subtype of `Entity`, and
    /// structured types are covariant in their components. Named types
    /// compare by name only, since qualifiers are resolved upstream.
    pub fn is_subtype_of(&self, other: &MathType) -> bool {
        match (self, other) {
            (_, MathType::Entity) => true,
            (MathType::Natural, MathType::Integer) => true,
            (MathType::Named { name: a, .. }, MathType::Named { name: b, .. }) => a == b,
            (MathType::Set { element: a }, MathType::Set { element: b }) => a.is_subtype_of(b),
            (
                MathType::Function {
                    domain: d1,
                    range: r1,
                },
                MathType::Function {
                    domain: d2,
                    range: r2,
                },
            ) => {
                d1.len() == d2.len()
                    && d1.iter().zip(d2).all(|(a, b)| b.is_subtype_of(a))
                    && r1.is_subtype_of(r2)
            }
            (a, b) => a == b,
        }
    }

    /// Replace every occurrence of the named type `name` with `replacement`.
    pub fn rename(&self, name: &str, replacement: &MathType) -> MathType {
        match self {
            MathType::Named { name: n, .. } if n == name => replacement.clone(),
            MathType::Set { element } => MathType::set_of(element.rename(name, replacement)),
            MathType::Function { domain, range } => MathType::Function {
                domain: domain.iter().map(|t| t.rename(name, replacement)).collect(),
                range: Box::new(range.rename(name, replacement)),
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for MathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathType::Boolean => write!(f, "B"),
            MathType::Integer => write!(f, "Z"),
            MathType::Natural => write!(f, "N"),
            MathType::Entity => write!(f, "Entity"),
            MathType::Named {
                name,
                qualifier: Some(q),
            } => write!(f, "{q}::{name}"),
            MathType::Named { name, .. } => write!(f, "{name}"),
            MathType::Set { element } => write!(f, "Set({element})"),
            MathType::Function { domain, range } => {
                let parts: Vec<String> = domain.iter().map(|t| t.to_string()).collect();
                write!(f, "({}) -> {range}", parts.join(" * "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_is_integer_subtype() {
        assert!(MathType::Natural.is_subtype_of(&MathType::Integer));
        assert!(!MathType::Integer.is_subtype_of(&MathType::Natural));
        assert!(MathType::Boolean.is_subtype_of(&MathType::Entity));
    }

    #[test]
    fn named_types_compare_by_name() {
        let a = MathType::Named {
            name: "Stack".into(),
            qualifier: Some("Stack_Template".into()),
        };
        assert!(a.is_subtype_of(&MathType::named("Stack")));
        assert!(!a.is_subtype_of(&MathType::named("Queue")));
    }

    #[test]
    fn rename_reaches_nested_types() {
        let ty = MathType::Function {
            domain: vec![MathType::named("Entry")],
            range: Box::new(MathType::set_of(MathType::named("Entry"))),
        };
        let renamed = ty.rename("Entry", &MathType::Integer);
        assert_eq!(renamed.to_string(), "(Z) -> Set(Z)");
    }

    #[test]
    fn serde_uses_kind_tag() {
        let json = serde_json::to_string(&MathType::named("Stack")).unwrap();
        assert_eq!(json, r#"{"kind":"named","name":"Stack"}"#);
        let back: MathType = serde_json::from_str(r#"{"kind":"integer"}"#).unwrap();
        assert_eq!(back, MathType::Integer);
    }
}
