//! Fresh names for values a statement discards.
//!
//! A variable whose value is replaced by a statement is renamed in the goal
//! to its "next quantified version": the name with a `?` prepended, repeated
//! until it collides with nothing already in scope.

pub const QUANTIFIED_MARKER: char = '?';

pub fn next_quantified_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = format!("{QUANTIFIED_MARKER}{base}");
    while taken(&candidate) {
        candidate.insert(0, QUANTIFIED_MARKER);
    }
    candidate
}

/// Strip every leading marker, recovering the program name.
pub fn base_name(name: &str) -> &str {
    name.trim_start_matches(QUANTIFIED_MARKER)
}
