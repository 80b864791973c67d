use std::fmt;

use crate::location::Location;
use crate::pexp::PExp;

/// A frozen proof obligation: every antecedent conjunct implies every
/// consequent conjunct.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationCondition {
    name: String,
    description: String,
    location: Option<Location>,
    antecedent: Vec<PExp>,
    consequent: Vec<PExp>,
}

impl VerificationCondition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: Option<Location>,
        antecedent: Vec<PExp>,
        consequent: Vec<PExp>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location,
            antecedent,
            consequent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn antecedent(&self) -> &[PExp] {
        &self.antecedent
    }

    pub fn consequent(&self) -> &[PExp] {
        &self.consequent
    }
}

impl fmt::Display for VerificationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "VC {}", self.name)?;
        writeln!(f)?;
        match &self.location {
            Some(loc) if loc.has_position() => writeln!(f, "{}: {loc}", self.description)?,
            _ => writeln!(f, "{}", self.description)?,
        }
        writeln!(f)?;
        writeln!(f, "Goal(s):")?;
        writeln!(f)?;
        for goal in &self.consequent {
            writeln!(f, "{goal}")?;
        }
        writeln!(f)?;
        writeln!(f, "Given:")?;
        writeln!(f)?;
        for (i, fact) in self.antecedent.iter().enumerate() {
            writeln!(f, "{}: {fact}", i + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MathType;

    #[test]
    fn display_lists_goals_then_numbered_facts() {
        let vc = VerificationCondition::new(
            "1_1",
            "Ensures Clause of Inc",
            Some(Location::new("counter.rb", 4, 9)),
            vec![PExp::symbol("p", MathType::Boolean), PExp::symbol("q", MathType::Boolean)],
            vec![PExp::symbol("g", MathType::Boolean)],
        );
        let text = vc.to_string();
        assert!(text.starts_with("VC 1_1\n\nEnsures Clause of Inc: counter.rb(4:9)\n"));
        assert!(text.contains("Goal(s):\n\ng\n"));
        assert!(text.contains("Given:\n\n1: p\n2: q\n"));
    }
}
