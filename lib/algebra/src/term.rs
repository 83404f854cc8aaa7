use crate::VariableId;
use rdf_prepare_model::{IriParseError, Literal, NamedNode};

/// A source position, tracked by the parser and carried into diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub line: u32,
    pub column: u32,
}

impl Locator {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A term of a triple pattern or an expression leaf.
///
/// `QName` and `BlankNode` only exist between parsing and rewriting: the
/// first rewrite passes replace them with resolved named nodes and anonymous
/// variables respectively. The one place blank nodes survive preparation is
/// CONSTRUCT templates, where they stand for per-solution fresh nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    NamedNode(NamedNode),
    /// An unresolved `prefix:local` qualified name.
    QName(String),
    /// A blank node label (without the `_:` sigil).
    BlankNode(String),
    Literal(Literal),
    Variable(VariableId),
}

impl Term {
    /// Builds a named-node term from an absolute IRI, validating it.
    pub fn iri(iri: &str) -> Result<Self, IriParseError> {
        Ok(Term::NamedNode(NamedNode::new(iri)?))
    }

    pub fn variable_id(&self) -> Option<VariableId> {
        match self {
            Term::Variable(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Whether the term is a ground RDF term (nothing left to resolve or
    /// bind).
    pub fn is_concrete(&self) -> bool {
        matches!(self, Term::NamedNode(_) | Term::Literal(_))
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<VariableId> for Term {
    fn from(id: VariableId) -> Self {
        Term::Variable(id)
    }
}
