//! The query-preparation engine.
//!
//! [Query] is the object the parser assembles and the execution engine reads.
//! [Query::prepare] turns the freshly parsed tree into its analyzed form:
//! syntactic sugar resolved, the pattern tree rewritten to a fixpoint,
//! constants folded, every pattern indexed, and the variable-use and
//! term-role matrices built for the executor's bind-versus-probe decisions.

mod analysis;
mod error;
mod eval;
mod query;
mod rewriting;
mod scope;

pub use analysis::{
    PatternIndex, ReservedRow, RoleFlags, RowId, TermRoleMap, UseFlags, VariableUseMap,
    RESERVED_ROWS,
};
pub use error::*;
pub use query::*;
