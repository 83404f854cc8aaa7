//! Term and value model for the rdf-prepare workspace.
//!
//! This crate contains the RDF term types preparation operates on and the
//! XSD value layer the constant-folding evaluator computes with. The term
//! types are re-exported from [Oxigraph](https://github.com/oxigraph/oxigraph)'s
//! `oxrdf` crate; the value layer is a compact, checked implementation of the
//! XSD numeric and boolean datatypes.

mod error;
mod typed_value;
mod xsd;

pub use error::*;
pub use typed_value::*;
pub use xsd::*;

// Re-export some oxrdf types.
pub use oxiri::{Iri, IriParseError};
pub use oxrdf::{vocab, Literal, NamedNode, NamedNodeRef};
