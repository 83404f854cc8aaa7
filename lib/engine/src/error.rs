use rdf_prepare_algebra::{Locator, PatternViolation, QNameError};
use rdf_prepare_model::IriParseError;
use std::fmt;
use thiserror::Error;

/// A fatal preparation failure.
///
/// Warnings never surface here; they accumulate on the query (see
/// [Warning]). When preparation fails, no promise is made about the state of
/// the analysis matrices and the query object should be discarded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryPreparationError {
    /// A structurally malformed graph-pattern node.
    #[error(transparent)]
    Malformed(#[from] PatternViolation),
    /// A qualified name did not resolve to an absolute IRI.
    #[error(transparent)]
    QName(#[from] QNameError),
    /// An invalid IRI outside of qname expansion (e.g. a base IRI).
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
    /// A rewrite tried to join two patterns with different operators. This
    /// indicates a bug in the rewriter, not in the query.
    #[error("cannot merge a {src} pattern into a {dest} pattern")]
    MergeIncompatible {
        dest: &'static str,
        src: &'static str,
    },
    /// A variable that is neither bound nor mentioned anywhere.
    #[error("variable ?{0} does not appear anywhere in the query")]
    DanglingVariable(String),
    /// The rewrite fixpoint bound was exceeded; cannot happen for
    /// well-formed input.
    #[error("graph-pattern rewriting did not converge after {0} passes")]
    RewriteDidNotConverge(usize),
}

/// The kind of a non-fatal preparation diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A projection lists the same variable twice; the duplicate is dropped.
    DuplicateVariable,
    /// A variable is bound somewhere but its value is never used.
    VariableUnusedButBound,
    /// A projected variable is never bound anywhere in the query.
    SelectedNeverBound,
    /// A variable appears in query-level clauses only, never in the pattern
    /// tree.
    UnusedInQuery,
}

impl WarningKind {
    pub fn label(self) -> &'static str {
        match self {
            WarningKind::DuplicateVariable => "duplicate-variable",
            WarningKind::VariableUnusedButBound => "variable-unused-but-bound",
            WarningKind::SelectedNeverBound => "selected-never-bound",
            WarningKind::UnusedInQuery => "unused-in-query",
        }
    }
}

/// A non-fatal preparation diagnostic.
///
/// Warnings are accumulated on the query for programmatic inspection and
/// forwarded to the query's warning callback as they are emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub kind: WarningKind,
    /// The name of the variable the warning is about.
    pub variable: Option<String>,
    /// Where the variable was declared, when the parser recorded it.
    pub locator: Option<Locator>,
    pub message: String,
}

impl Warning {
    pub(crate) fn for_variable(kind: WarningKind, name: &str, locator: Option<Locator>) -> Self {
        let message = match kind {
            WarningKind::DuplicateVariable => {
                format!("variable ?{name} is listed more than once in the projection")
            }
            WarningKind::VariableUnusedButBound => {
                format!("variable ?{name} is bound but never used in the query")
            }
            WarningKind::SelectedNeverBound => {
                format!("variable ?{name} is selected but never bound in the query")
            }
            WarningKind::UnusedInQuery => {
                format!("variable ?{name} is not used in any graph pattern")
            }
        };
        Self {
            kind,
            variable: Some(name.to_owned()),
            locator,
            message,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(locator) = self.locator {
            write!(f, "{}:{}: ", locator.line, locator.column)?;
        }
        write!(f, "{}", self.message)
    }
}
