use crate::QNameError;
use oxiri::{Iri, IriParseError};
use rdf_prepare_model::NamedNode;
use rustc_hash::FxHashMap;

/// The namespace prefix table the parser registers declarations into.
///
/// Qualified-name expansion resolves `prefix:local` against this table; the
/// result is validated and, when a base IRI is set, resolved against it, so
/// relative namespace IRIs still expand to absolute ones.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    prefixes: FxHashMap<String, String>,
    base: Option<Iri<String>>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    pub fn set_base(&mut self, base: &str) -> Result<(), IriParseError> {
        self.base = Some(Iri::parse(base.to_owned())?);
        Ok(())
    }

    pub fn base(&self) -> Option<&Iri<String>> {
        self.base.as_ref()
    }

    /// Expands a `prefix:local` qualified name into a named node.
    pub fn expand(&self, qname: &str) -> Result<NamedNode, QNameError> {
        let (prefix, local) = qname
            .split_once(':')
            .ok_or_else(|| QNameError::NotAQName(qname.to_owned()))?;
        let namespace = self
            .prefixes
            .get(prefix)
            .ok_or_else(|| QNameError::UndeclaredPrefix(prefix.to_owned()))?;
        let full = format!("{namespace}{local}");
        match &self.base {
            Some(base) => Ok(NamedNode::new_unchecked(
                base.resolve(&full)?.into_inner(),
            )),
            None => Ok(NamedNode::new(full)?),
        }
    }
}
