//! Program statements and program-level expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

use assertive_term::{Exp, Location, MathType};

/// A call of an operation, either as a statement or inside an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramCall {
    /// Facility or module the operation is looked up through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Vec<ProgramExp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ProgramCall {
    pub fn new(name: impl Into<String>, args: Vec<ProgramExp>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
            args,
            location: None,
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>, args: Vec<ProgramExp>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            ..Self::new(name, args)
        }
    }
}

impl fmt::Display for ProgramCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(q) = &self.qualifier {
            write!(f, "{q}.")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// Expression as it appears in program text: either a side-effect free
/// mathematical expression or a call of a function operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "program", rename_all = "snake_case")]
pub enum ProgramExp {
    Math { exp: Exp },
    Call { call: ProgramCall, ty: MathType },
}

impl ProgramExp {
    pub fn call(call: ProgramCall, ty: MathType) -> Self {
        ProgramExp::Call { call, ty }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            ProgramExp::Math { exp } => exp.location.as_ref(),
            ProgramExp::Call { call, .. } => call.location.as_ref(),
        }
    }
}

impl From<Exp> for ProgramExp {
    fn from(exp: Exp) -> Self {
        ProgramExp::Math { exp }
    }
}

impl fmt::Display for ProgramExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramExp::Math { exp } => write!(f, "{exp}"),
            ProgramExp::Call { call, .. } => write!(f, "{call}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum IterateItem {
    Statement {
        statement: Statement,
    },
    /// `when test do statements exit;`
    Exit {
        test: ProgramExp,
        #[serde(default)]
        statements: Vec<Statement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    Assign {
        target: Exp,
        value: ProgramExp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    Swap {
        left: Exp,
        right: Exp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    Call {
        call: ProgramCall,
    },
    If {
        test: ProgramExp,
        #[serde(default)]
        then_branch: Vec<Statement>,
        #[serde(default)]
        else_branch: Vec<Statement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    While {
        test: ProgramExp,
        /// Variables the loop may modify. Inferred from the body when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        changing: Option<Vec<Exp>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maintaining: Option<Exp>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decreasing: Option<Exp>,
        #[serde(default)]
        body: Vec<Statement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    Iterate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        changing: Option<Vec<Exp>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maintaining: Option<Exp>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decreasing: Option<Exp>,
        #[serde(default)]
        items: Vec<IterateItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    Confirm {
        assertion: Exp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    Assume {
        assertion: Exp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
}

impl Statement {
    pub fn assign(target: Exp, value: impl Into<ProgramExp>) -> Self {
        Statement::Assign {
            target,
            value: value.into(),
            location: None,
        }
    }

    pub fn swap(left: Exp, right: Exp) -> Self {
        Statement::Swap {
            left,
            right,
            location: None,
        }
    }

    pub fn call(call: ProgramCall) -> Self {
        Statement::Call { call }
    }

    pub fn if_then_else(test: impl Into<ProgramExp>, then_branch: Vec<Statement>, else_branch: Vec<Statement>) -> Self {
        Statement::If {
            test: test.into(),
            then_branch,
            else_branch,
            location: None,
        }
    }

    pub fn confirm(assertion: Exp) -> Self {
        Statement::Confirm {
            assertion,
            location: None,
        }
    }

    pub fn assume(assertion: Exp) -> Self {
        Statement::Assume {
            assertion,
            location: None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Statement::Assign { location, .. }
            | Statement::Swap { location, .. }
            | Statement::If { location, .. }
            | Statement::While { location, .. }
            | Statement::Iterate { location, .. }
            | Statement::Confirm { location, .. }
            | Statement::Assume { location, .. } => location.as_ref(),
            Statement::Call { call } => call.location.as_ref(),
        }
    }

    /// Short name of the construct, used in rule traces and VC descriptions.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Assign { .. } => "Assignment",
            Statement::Swap { .. } => "Swap",
            Statement::Call { .. } => "Call",
            Statement::If { .. } => "If",
            Statement::While { .. } => "While",
            Statement::Iterate { .. } => "Iterate",
            Statement::Confirm { .. } => "Confirm",
            Statement::Assume { .. } => "Assume",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assign { target, value, .. } => write!(f, "{target} := {value}"),
            Statement::Swap { left, right, .. } => write!(f, "{left} :=: {right}"),
            Statement::Call { call } => write!(f, "{call}"),
            Statement::If { test, .. } => write!(f, "If {test} then ..."),
            Statement::While {
                test, maintaining, ..
            } => match maintaining {
                Some(inv) => write!(f, "While {test} maintaining {inv} do ..."),
                None => write!(f, "While {test} do ..."),
            },
            Statement::Iterate { maintaining, .. } => match maintaining {
                Some(inv) => write!(f, "Iterate maintaining {inv} ..."),
                None => write!(f, "Iterate ..."),
            },
            Statement::Confirm { assertion, .. } => write!(f, "Confirm {assertion}"),
            Statement::Assume { assertion, .. } => write!(f, "Assume {assertion}"),
        }
    }
}
