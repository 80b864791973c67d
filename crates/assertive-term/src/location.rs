use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of an expression or statement, used only for diagnostics.
///
/// `detail` names the role a confirmed expression plays ("Ensures Clause of
/// Push", "Base Case of the Invariant of While Statement", ...) and becomes
/// the description of the VC it ends up in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// True when the location carries an actual source position.
    pub fn has_position(&self) -> bool {
        !self.file.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_position() {
            write!(f, "{}({}:{})", self.file, self.line, self.column)
        } else {
            write!(f, "<unknown>")
        }
    }
}
