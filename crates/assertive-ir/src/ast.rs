//! Resolved declaration tree handed to the verifier core.
//!
//! Parsing and name resolution happen upstream; every expression in this
//! tree is expected to carry its resolved type.

use serde::{Deserialize, Serialize};
use std::fmt;

use assertive_term::{Exp, Location, MathType};

use crate::errors::IrError;
use crate::stmt::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMode {
    Alters,
    Updates,
    Clears,
    Restores,
    Preserves,
    Replaces,
    Evaluates,
}

impl ParameterMode {
    /// The actual argument may leave the call holding a different value.
    pub fn may_change(self) -> bool {
        matches!(
            self,
            ParameterMode::Alters
                | ParameterMode::Updates
                | ParameterMode::Clears
                | ParameterMode::Replaces
        )
    }

    /// The actual argument must be a variable rather than an expression.
    pub fn requires_variable(self) -> bool {
        self != ParameterMode::Evaluates
    }

    /// The procedure must hand the parameter back unchanged.
    pub fn keeps_value(self) -> bool {
        matches!(self, ParameterMode::Restores | ParameterMode::Preserves)
    }
}

impl fmt::Display for ParameterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterMode::Alters => "alters",
            ParameterMode::Updates => "updates",
            ParameterMode::Clears => "clears",
            ParameterMode::Restores => "restores",
            ParameterMode::Preserves => "preserves",
            ParameterMode::Replaces => "replaces",
            ParameterMode::Evaluates => "evaluates",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    pub mode: ParameterMode,
    pub ty: MathType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, mode: ParameterMode, ty: MathType) -> Self {
        Self {
            name: name.into(),
            mode,
            ty,
            location: None,
        }
    }

    pub fn as_exp(&self) -> Exp {
        Exp::var(self.name.clone(), self.ty.clone())
    }
}

/// Specification of an operation: its parameters with modes, and its
/// requires/ensures clauses over those parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParameterDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_ty: Option<MathType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Exp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensures: Option<Exp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl OperationDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_ty: None,
            requires: None,
            ensures: None,
            location: None,
        }
    }

    pub fn with_param(mut self, name: &str, mode: ParameterMode, ty: MathType) -> Self {
        self.params.push(ParameterDecl::new(name, mode, ty));
        self
    }

    pub fn with_requires(mut self, requires: Exp) -> Self {
        self.requires = Some(requires);
        self
    }

    pub fn with_ensures(mut self, ensures: Exp) -> Self {
        self.ensures = Some(ensures);
        self
    }

    pub fn returning(mut self, ty: MathType) -> Self {
        self.return_ty = Some(ty);
        self
    }

    pub fn requires_or_true(&self) -> Exp {
        self.requires.clone().unwrap_or_else(|| Exp::bool(true))
    }

    pub fn ensures_or_true(&self) -> Exp {
        self.ensures.clone().unwrap_or_else(|| Exp::bool(true))
    }

    /// The variable standing for the returned value in the ensures clause.
    pub fn result_exp(&self) -> Option<Exp> {
        self.return_ty
            .as_ref()
            .map(|ty| Exp::var(self.name.clone(), ty.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub ty: MathType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl VariableDecl {
    pub fn new(name: impl Into<String>, ty: MathType) -> Self {
        Self {
            name: name.into(),
            ty,
            location: None,
        }
    }

    pub fn as_exp(&self) -> Exp {
        Exp::var(self.name.clone(), self.ty.clone())
    }
}

/// Body implementing an operation. The specification is looked up by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParameterDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_ty: Option<MathType>,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decreasing: Option<Exp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ProcedureDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_ty: None,
            variables: Vec::new(),
            body: Vec::new(),
            recursive: false,
            decreasing: None,
            location: None,
        }
    }

    pub fn with_param(mut self, name: &str, mode: ParameterMode, ty: MathType) -> Self {
        self.params.push(ParameterDecl::new(name, mode, ty));
        self
    }

    pub fn with_variable(mut self, name: &str, ty: MathType) -> Self {
        self.variables.push(VariableDecl::new(name, ty));
        self
    }

    pub fn with_body(mut self, body: Vec<Statement>) -> Self {
        self.body = body;
        self
    }

    pub fn recursive_with(mut self, decreasing: Exp) -> Self {
        self.recursive = true;
        self.decreasing = Some(decreasing);
        self
    }
}

/// Abstract type exported by a concept: its mathematical model, exemplar
/// name, constraint and initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeFamilyDecl {
    pub name: String,
    pub model: MathType,
    pub exemplar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Exp>,
    /// Initialization ensures clause over the exemplar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialization: Option<Exp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl TypeFamilyDecl {
    pub fn exemplar_exp(&self) -> Exp {
        Exp::var(self.exemplar.clone(), self.model.clone())
    }

    /// The constraint, stated about `target` instead of the exemplar.
    pub fn constraint_for(&self, target: &Exp) -> Option<Exp> {
        self.constraint
            .as_ref()
            .map(|c| c.substitute(&self.exemplar_exp(), target))
    }

    /// The initialization ensures, stated about `target`.
    pub fn initialization_for(&self, target: &Exp) -> Option<Exp> {
        self.initialization
            .as_ref()
            .map(|c| c.substitute(&self.exemplar_exp(), target))
    }
}

/// Concrete representation of a type family inside a realization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationDecl {
    pub type_name: String,
    pub exemplar: String,
    pub representation: MathType,
    #[serde(default)]
    pub fields: Vec<VariableDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convention: Option<Exp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correspondence: Option<Exp>,
    #[serde(default)]
    pub initialization: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl RepresentationDecl {
    pub fn concrete_exemplar(&self) -> Exp {
        Exp::var(self.exemplar.clone(), self.representation.clone())
    }

    /// Name of the abstract value a concrete variable `name` stands for.
    pub fn abstract_name(name: &str) -> String {
        format!("Conc.{name}")
    }

    pub fn convention_or_true(&self) -> Exp {
        self.convention.clone().unwrap_or_else(|| Exp::bool(true))
    }

    pub fn correspondence_or_true(&self) -> Exp {
        self.correspondence.clone().unwrap_or_else(|| Exp::bool(true))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleParameter {
    Constant { name: String, ty: MathType },
    Type { name: String },
    Operation { operation: OperationDecl },
}

impl ModuleParameter {
    pub fn name(&self) -> &str {
        match self {
            ModuleParameter::Constant { name, .. } | ModuleParameter::Type { name } => name,
            ModuleParameter::Operation { operation } => &operation.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleArgument {
    Constant {
        value: Exp,
    },
    Type {
        ty: MathType,
    },
    Operation {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualifier: Option<String>,
    },
}

/// `Facility Stack_Fac is Stack_Template(Integer, 4) realized by Array_Realiz;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityDecl {
    pub name: String,
    pub concept: String,
    #[serde(default)]
    pub concept_args: Vec<ModuleArgument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realization: Option<String>,
    #[serde(default)]
    pub realization_args: Vec<ModuleArgument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptModule {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ModuleParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Exp>,
    /// Module-level constraints over the concept's constants.
    #[serde(default)]
    pub constraints: Vec<Exp>,
    #[serde(default)]
    pub type_families: Vec<TypeFamilyDecl>,
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizationModule {
    pub name: String,
    pub concept: String,
    #[serde(default)]
    pub params: Vec<ModuleParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Exp>,
    #[serde(default)]
    pub representations: Vec<RepresentationDecl>,
    #[serde(default)]
    pub facilities: Vec<FacilityDecl>,
    /// Specifications of private operations implemented locally.
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
    #[serde(default)]
    pub procedures: Vec<ProcedureDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityModule {
    pub name: String,
    #[serde(default)]
    pub facilities: Vec<FacilityDecl>,
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
    #[serde(default)]
    pub procedures: Vec<ProcedureDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoremDecl {
    pub name: String,
    pub assertion: Exp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryModule {
    pub name: String,
    #[serde(default)]
    pub theorems: Vec<TheoremDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ModuleDecl {
    Concept(ConceptModule),
    Realization(RealizationModule),
    Facility(FacilityModule),
    Theory(TheoryModule),
}

impl ModuleDecl {
    pub fn name(&self) -> &str {
        match self {
            ModuleDecl::Concept(m) => &m.name,
            ModuleDecl::Realization(m) => &m.name,
            ModuleDecl::Facility(m) => &m.name,
            ModuleDecl::Theory(m) => &m.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModuleDecl::Concept(_) => "concept",
            ModuleDecl::Realization(_) => "realization",
            ModuleDecl::Facility(_) => "facility",
            ModuleDecl::Theory(_) => "theory",
        }
    }

    pub fn operations(&self) -> &[OperationDecl] {
        match self {
            ModuleDecl::Concept(m) => &m.operations,
            ModuleDecl::Realization(m) => &m.operations,
            ModuleDecl::Facility(m) => &m.operations,
            ModuleDecl::Theory(_) => &[],
        }
    }

    pub fn procedures(&self) -> &[ProcedureDecl] {
        match self {
            ModuleDecl::Realization(m) => &m.procedures,
            ModuleDecl::Facility(m) => &m.procedures,
            ModuleDecl::Concept(_) | ModuleDecl::Theory(_) => &[],
        }
    }

    pub fn facilities(&self) -> &[FacilityDecl] {
        match self {
            ModuleDecl::Realization(m) => &m.facilities,
            ModuleDecl::Facility(m) => &m.facilities,
            ModuleDecl::Concept(_) | ModuleDecl::Theory(_) => &[],
        }
    }

    pub fn params(&self) -> &[ModuleParameter] {
        match self {
            ModuleDecl::Concept(m) => &m.params,
            ModuleDecl::Realization(m) => &m.params,
            ModuleDecl::Facility(_) | ModuleDecl::Theory(_) => &[],
        }
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDecl> {
        self.operations().iter().find(|op| op.name == name)
    }

    pub fn as_concept(&self) -> Option<&ConceptModule> {
        match self {
            ModuleDecl::Concept(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_realization(&self) -> Option<&RealizationModule> {
        match self {
            ModuleDecl::Realization(m) => Some(m),
            _ => None,
        }
    }
}

/// Everything the verifier sees for one run: the module to verify plus
/// every module it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub target: String,
    pub modules: Vec<ModuleDecl>,
}

impl CompilationUnit {
    pub fn new(target: impl Into<String>, modules: Vec<ModuleDecl>) -> Self {
        Self {
            target: target.into(),
            modules,
        }
    }

    pub fn from_json(source: &str) -> Result<Self, IrError> {
        serde_json::from_str(source).map_err(|e| IrError::Json {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        })
    }

    pub fn to_json(&self) -> Result<String, IrError> {
        serde_json::to_string_pretty(self).map_err(|e| IrError::Json {
            message: e.to_string(),
            line: 0,
            column: 0,
        })
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn theorems(&self) -> impl Iterator<Item = &TheoremDecl> {
        self.modules
            .iter()
            .filter_map(|m| match m {
                ModuleDecl::Theory(t) => Some(t),
                _ => None,
            })
            .flat_map(|t| t.theorems.iter())
    }
}
