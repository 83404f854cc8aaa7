use oxiri::IriParseError;
use thiserror::Error;

/// A structurally malformed graph-pattern node.
///
/// These indicate a bug in whatever built the tree (usually the parser) and
/// abort preparation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternViolation {
    #[error("a basic pattern must own a triple slice")]
    BasicWithoutTriples,
    #[error("a basic pattern cannot have child patterns")]
    BasicWithChildren,
    #[error("only basic patterns own triples")]
    TriplesOutsideBasic,
    #[error("a graph pattern requires an origin term")]
    MissingOrigin,
    #[error("a bind pattern requires a bound variable")]
    MissingBoundVariable,
    #[error("a sub-select requires a projection")]
    MissingProjection,
    #[error("a values pattern requires a bindings block")]
    MissingBindings,
    #[error("a values row has {found} cells but {expected} variables are declared")]
    RaggedBindings { expected: usize, found: usize },
    #[error("a union requires at least two branches")]
    DegenerateUnion,
    #[error("a filter pattern carries an expression, not children")]
    FilterWithChildren,
    #[error("a filter pattern requires an expression")]
    FilterWithoutExpression,
}

/// A failure to expand a qualified name into an absolute IRI.
#[derive(Debug, Error)]
pub enum QNameError {
    /// The qualified name has no `prefix:local` shape.
    #[error("'{0}' is not a qualified name")]
    NotAQName(String),
    /// The prefix has not been declared.
    #[error("undeclared namespace prefix '{0}'")]
    UndeclaredPrefix(String),
    /// The expansion did not produce a valid IRI.
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
}
