//! Read-only scope and type lookup over a compilation unit.

use indexmap::IndexMap;
use tracing::{debug, warn};

use assertive_term::{Exp, MathType};

use crate::ast::{
    CompilationUnit, ConceptModule, FacilityDecl, ModuleDecl, ModuleParameter, OperationDecl,
    RepresentationDecl, TypeFamilyDecl,
};
use crate::errors::IrError;
use crate::instantiation::Instantiation;

/// An operation specification together with the renaming that places it in
/// the caller's scope.
#[derive(Debug, Clone)]
pub struct ResolvedOperation<'a> {
    pub decl: &'a OperationDecl,
    pub instantiation: Instantiation,
    /// Facility the operation was reached through, if any.
    pub facility: Option<String>,
    /// Module declaring the specification.
    pub module: String,
}

impl<'a> ResolvedOperation<'a> {
    pub fn local(decl: &'a OperationDecl, module: &str) -> Self {
        Self {
            decl,
            instantiation: Instantiation::identity(),
            facility: None,
            module: module.to_string(),
        }
    }

    pub fn requires(&self) -> Exp {
        self.instantiation.apply(&self.decl.requires_or_true())
    }

    pub fn ensures(&self) -> Exp {
        self.instantiation.apply(&self.decl.ensures_or_true())
    }

    pub fn param_type(&self, index: usize) -> Option<MathType> {
        self.decl
            .params
            .get(index)
            .map(|p| self.instantiation.apply_type(&p.ty))
    }

    pub fn display_name(&self) -> String {
        match &self.facility {
            Some(f) => format!("{f}.{}", self.decl.name),
            None => self.decl.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedTypeFamily<'a> {
    pub decl: &'a TypeFamilyDecl,
    pub concept: String,
    pub instantiation: Instantiation,
}

impl ResolvedTypeFamily<'_> {
    pub fn initialization_for(&self, target: &Exp) -> Option<Exp> {
        self.decl
            .initialization_for(target)
            .map(|e| self.instantiation.apply(&e))
    }

    pub fn constraint_for(&self, target: &Exp) -> Option<Exp> {
        self.decl
            .constraint_for(target)
            .map(|e| self.instantiation.apply(&e))
    }
}

/// Lookup facility the proof rules consult. Implementations must be
/// read-only for the duration of a verification pass.
pub trait ScopeLookup {
    /// Type of a module-level constant, optionally through a facility.
    fn resolve(&self, qualifier: Option<&str>, name: &str) -> Option<MathType>;

    fn lookup_module(&self, id: &str) -> Option<&ModuleDecl>;

    /// The module under verification.
    fn target(&self) -> &ModuleDecl;

    fn find_operation(&self, qualifier: Option<&str>, name: &str) -> Option<ResolvedOperation<'_>>;

    fn find_type_family(&self, ty: &MathType) -> Option<ResolvedTypeFamily<'_>>;

    /// Local representation of `ty` in the target realization.
    fn find_representation(&self, ty: &MathType) -> Option<&RepresentationDecl>;
}

/// [`ScopeLookup`] over an indexed compilation unit.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    modules: IndexMap<String, ModuleDecl>,
    target: String,
    facilities: IndexMap<String, Instantiation>,
}

impl SymbolTable {
    pub fn new(unit: CompilationUnit) -> Result<Self, IrError> {
        let mut modules = IndexMap::new();
        for module in unit.modules {
            let name = module.name().to_string();
            if modules.contains_key(&name) {
                return Err(IrError::DuplicateModule { name });
            }
            modules.insert(name, module);
        }
        let target = modules
            .get(&unit.target)
            .ok_or_else(|| IrError::UnknownTarget {
                name: unit.target.clone(),
            })?;

        // A missing concept surfaces later as a missing specification, a
        // mismatched argument list as a failed facility obligation. Neither
        // facility is indexed.
        let mut facilities = IndexMap::new();
        for facility in target.facilities() {
            let Some(concept) = modules.get(&facility.concept) else {
                continue;
            };
            match Instantiation::between(concept.params(), &facility.concept_args) {
                Ok(instantiation) => {
                    facilities.insert(facility.name.clone(), instantiation);
                }
                Err(message) => warn!(facility = %facility.name, %message, "facility not indexed"),
            }
        }
        debug!(
            modules = modules.len(),
            facilities = facilities.len(),
            "indexed compilation unit"
        );
        Ok(Self {
            modules,
            target: unit.target,
            facilities,
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDecl> {
        self.modules.values()
    }

    pub fn facility(&self, name: &str) -> Option<&FacilityDecl> {
        self.target().facilities().iter().find(|f| f.name == name)
    }

    pub fn facility_instantiation(&self, name: &str) -> Option<&Instantiation> {
        self.facilities.get(name)
    }

    /// The concept the target implements, or the target itself if it is one.
    pub fn home_concept(&self) -> Option<&ConceptModule> {
        match self.target() {
            ModuleDecl::Concept(c) => Some(c),
            ModuleDecl::Realization(r) => self.modules.get(&r.concept)?.as_concept(),
            ModuleDecl::Facility(_) | ModuleDecl::Theory(_) => None,
        }
    }

    fn via_facility(&self, facility: &FacilityDecl) -> Option<(&ConceptModule, Instantiation)> {
        let concept = self.modules.get(&facility.concept)?.as_concept()?;
        let instantiation = self.facilities.get(&facility.name)?.clone();
        Some((concept, instantiation))
    }
}

fn constant_type(params: &[ModuleParameter], name: &str) -> Option<MathType> {
    params.iter().find_map(|p| match p {
        ModuleParameter::Constant { name: n, ty } if n == name => Some(ty.clone()),
        _ => None,
    })
}

impl ScopeLookup for SymbolTable {
    fn resolve(&self, qualifier: Option<&str>, name: &str) -> Option<MathType> {
        match qualifier {
            Some(q) => {
                let (concept, instantiation) = self.via_facility(self.facility(q)?)?;
                let ty = constant_type(&concept.params, name)?;
                Some(instantiation.apply_type(&ty))
            }
            None => constant_type(self.target().params(), name)
                .or_else(|| self.home_concept().and_then(|c| constant_type(&c.params, name))),
        }
    }

    fn lookup_module(&self, id: &str) -> Option<&ModuleDecl> {
        self.modules.get(id)
    }

    fn target(&self) -> &ModuleDecl {
        &self.modules[self.target.as_str()]
    }

    fn find_operation(&self, qualifier: Option<&str>, name: &str) -> Option<ResolvedOperation<'_>> {
        if let Some(q) = qualifier {
            if let Some(facility) = self.facility(q) {
                let (concept, instantiation) = self.via_facility(facility)?;
                let decl = concept.operations.iter().find(|op| op.name == name)?;
                return Some(ResolvedOperation {
                    decl,
                    instantiation,
                    facility: Some(q.to_string()),
                    module: concept.name.clone(),
                });
            }
            let module = self.modules.get(q)?;
            return module
                .operation(name)
                .map(|decl| ResolvedOperation::local(decl, module.name()));
        }

        let target = self.target();
        if let Some(decl) = target.operation(name) {
            return Some(ResolvedOperation::local(decl, target.name()));
        }
        if let Some(concept) = self.home_concept() {
            if let Some(decl) = concept.operations.iter().find(|op| op.name == name) {
                return Some(ResolvedOperation::local(decl, &concept.name));
            }
        }
        target.facilities().iter().find_map(|facility| {
            let (concept, instantiation) = self.via_facility(facility)?;
            let decl = concept.operations.iter().find(|op| op.name == name)?;
            Some(ResolvedOperation {
                decl,
                instantiation,
                facility: Some(facility.name.clone()),
                module: concept.name.clone(),
            })
        })
    }

    fn find_type_family(&self, ty: &MathType) -> Option<ResolvedTypeFamily<'_>> {
        let MathType::Named { name, qualifier } = ty else {
            return None;
        };
        let family_in = |concept: &ConceptModule| {
            concept
                .type_families
                .iter()
                .position(|t| &t.name == name)
        };

        if let Some(facility) = qualifier.as_deref().and_then(|q| self.facility(q)) {
            let (concept, instantiation) = self.via_facility(facility)?;
            let index = family_in(concept)?;
            return Some(ResolvedTypeFamily {
                decl: &concept.type_families[index],
                concept: concept.name.clone(),
                instantiation,
            });
        }
        if let Some(concept) = self.home_concept() {
            if let Some(index) = family_in(concept) {
                return Some(ResolvedTypeFamily {
                    decl: &concept.type_families[index],
                    concept: concept.name.clone(),
                    instantiation: Instantiation::identity(),
                });
            }
        }
        self.target().facilities().iter().find_map(|facility| {
            let (concept, instantiation) = self.via_facility(facility)?;
            let index = family_in(concept)?;
            Some(ResolvedTypeFamily {
                decl: &concept.type_families[index],
                concept: concept.name.clone(),
                instantiation,
            })
        })
    }

    fn find_representation(&self, ty: &MathType) -> Option<&RepresentationDecl> {
        let name = ty.name()?;
        self.target()
            .as_realization()?
            .representations
            .iter()
            .find(|r| r.type_name == name)
    }
}
