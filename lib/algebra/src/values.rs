use crate::{PatternViolation, Term, VariableId};

/// A `VALUES` block, either inline in the pattern tree or trailing the
/// whole query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuesBlock {
    pub variables: Vec<VariableId>,
    /// One row per solution; `None` is `UNDEF`.
    pub rows: Vec<Vec<Option<Term>>>,
}

impl ValuesBlock {
    pub fn new(variables: Vec<VariableId>, rows: Vec<Vec<Option<Term>>>) -> Self {
        Self { variables, rows }
    }

    pub fn validate(&self) -> Result<(), PatternViolation> {
        for row in &self.rows {
            if row.len() != self.variables.len() {
                return Err(PatternViolation::RaggedBindings {
                    expected: self.variables.len(),
                    found: row.len(),
                });
            }
        }
        Ok(())
    }
}
