//! The algebraic rewrites: qualified-name expansion, blank-node lifting,
//! projection rewrites, structural merging and constant folding.
//!
//! Every pass is a post-order walk reporting whether it changed anything;
//! the driver in the query object reruns the whole suite until a pass makes
//! no change, bounded by twice the initial node count.

pub(crate) mod blank_nodes;
pub(crate) mod fold;
pub(crate) mod merge;
pub(crate) mod projection;
pub(crate) mod qnames;
