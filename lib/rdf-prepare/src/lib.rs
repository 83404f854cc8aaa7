//! SPARQL query preparation.
//!
//! This crate bundles the public surface of the rdf-prepare workspace: the
//! algebra types a parser assembles, and the [Query] object whose
//! [prepare](Query::prepare) call performs semantic analysis and algebraic
//! rewriting for a downstream execution engine.
//!
//! ```
//! use rdf_prepare::{GraphPattern, Query, TriplePattern, TripleSlice};
//! use rdf_prepare::model::NamedNode;
//!
//! let mut query = Query::select();
//! let s = query.variables_mut().declare_named("s");
//! let p = NamedNode::new_unchecked("http://example.com/p");
//! let o = query.variables_mut().declare_named("o");
//! query.add_triple(TriplePattern::new(s, p, o));
//! query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
//!     TripleSlice::new(0, 0),
//! )]));
//!
//! query.prepare()?;
//! assert!(query.is_bound_anywhere(s));
//! # Ok::<_, rdf_prepare::QueryPreparationError>(())
//! ```

pub use rdf_prepare_algebra::*;
pub use rdf_prepare_engine::*;

/// The term and value model.
pub mod model {
    pub use rdf_prepare_model::*;
}
