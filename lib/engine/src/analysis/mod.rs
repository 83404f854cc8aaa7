//! The variable-use analysis: pattern indexing, the use-map and term-role
//! matrices, and the mention and binding passes that fill them.

mod binding;
mod indexer;
mod mention;
mod term_roles;
mod use_map;
mod var_set;

pub use indexer::*;
pub use term_roles::*;
pub use use_map::*;

pub(crate) use binding::*;
pub(crate) use mention::*;
pub(crate) use var_set::*;
