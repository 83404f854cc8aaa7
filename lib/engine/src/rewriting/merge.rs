use crate::error::QueryPreparationError;
use rdf_prepare_algebra::{GraphPattern, GraphPatternOp};

/// Joins `src` into `dest`. Both must have the same operator.
///
/// Children are concatenated, the triple span widens to the convex hull of
/// both spans, filters are ANDed, and payloads `dest` lacks are transferred
/// over. An operator mismatch is a rewriter bug, not a query error.
pub(crate) fn join(
    dest: &mut GraphPattern,
    src: GraphPattern,
) -> Result<(), QueryPreparationError> {
    if dest.op != src.op {
        return Err(QueryPreparationError::MergeIncompatible {
            dest: dest.op.label(),
            src: src.op.label(),
        });
    }
    dest.children.extend(src.children);
    match (&mut dest.triples, src.triples) {
        (Some(existing), Some(absorbed)) => existing.widen(absorbed),
        (empty @ None, Some(absorbed)) => *empty = Some(absorbed),
        _ => {}
    }
    if let Some(filter) = src.filter {
        dest.and_filter(filter);
    }
    if dest.origin.is_none() {
        dest.origin = src.origin;
    }
    if dest.bound_variable.is_none() {
        dest.bound_variable = src.bound_variable;
    }
    if dest.projection.is_none() {
        dest.projection = src.projection;
    }
    if dest.modifier.is_none() {
        dest.modifier = src.modifier;
    }
    if dest.bindings.is_none() {
        dest.bindings = src.bindings;
    }
    dest.silent |= src.silent;
    Ok(())
}

/// One structural rewrite pass: empty-group removal, contiguous-basic
/// merging, and trivial-group coalescing, bottom-up.
pub(crate) fn structural_pass(node: &mut GraphPattern) -> Result<bool, QueryPreparationError> {
    let mut changed = false;
    for child in &mut node.children {
        changed |= structural_pass(child)?;
    }
    if node.op == GraphPatternOp::Group {
        changed |= remove_empty_groups(node);
        changed |= merge_basic_runs(node)?;
        changed |= coalesce_single_child(node)?;
    }
    Ok(changed)
}

/// Drops child groups that have no content left, hoisting their filters
/// (ANDed) into this node.
fn remove_empty_groups(node: &mut GraphPattern) -> bool {
    let before = node.children.len();
    let mut hoisted = Vec::new();
    node.children.retain_mut(|child| {
        let empty = child.op == GraphPatternOp::Group
            && child.children.is_empty()
            && child.triples.is_none();
        if empty {
            if let Some(filter) = child.filter.take() {
                hoisted.push(filter);
            }
        }
        !empty
    });
    let changed = node.children.len() != before;
    for filter in hoisted {
        node.and_filter(filter);
    }
    changed
}

/// Joins every maximal run of adjacent basic children into its first
/// member. The flat triple array is never rearranged; only the surviving
/// pattern's span widens.
fn merge_basic_runs(node: &mut GraphPattern) -> Result<bool, QueryPreparationError> {
    let mut changed = false;
    let old = std::mem::take(&mut node.children);
    for child in old {
        match node.children.last_mut() {
            Some(last)
                if last.op == GraphPatternOp::Basic && child.op == GraphPatternOp::Basic =>
            {
                join(last, child)?;
                changed = true;
            }
            _ => node.children.push(child),
        }
    }
    Ok(changed)
}

/// A group around a single child collapses into that child.
///
/// Not for a lone `Filter` (losing the wrapping group would silently change
/// the filter's variable scope) and not for a `Union`.
fn coalesce_single_child(node: &mut GraphPattern) -> Result<bool, QueryPreparationError> {
    if node.children.len() != 1 {
        return Ok(false);
    }
    if matches!(
        node.children[0].op,
        GraphPatternOp::Filter | GraphPatternOp::Union
    ) {
        return Ok(false);
    }
    let Some(child) = node.children.pop() else {
        return Ok(false);
    };
    node.op = child.op;
    node.children = child.children;
    node.triples = child.triples;
    if let Some(filter) = child.filter {
        node.and_filter(filter);
    }
    if node.origin.is_none() {
        node.origin = child.origin;
    }
    if node.bound_variable.is_none() {
        node.bound_variable = child.bound_variable;
    }
    if node.projection.is_none() {
        node.projection = child.projection;
    }
    if node.modifier.is_none() {
        node.modifier = child.modifier;
    }
    if node.bindings.is_none() {
        node.bindings = child.bindings;
    }
    node.silent |= child.silent;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_prepare_algebra::{Expression, TripleSlice};

    #[test]
    fn test_join_rejects_mismatched_operators() {
        let mut dest = GraphPattern::group(Vec::new());
        let src = GraphPattern::basic(TripleSlice::new(0, 0));
        assert!(matches!(
            join(&mut dest, src),
            Err(QueryPreparationError::MergeIncompatible { .. })
        ));
    }

    #[test]
    fn test_join_widens_span_and_ands_filters() {
        let mut dest = GraphPattern::basic(TripleSlice::new(0, 0));
        dest.and_filter(Expression::true_literal());
        let mut src = GraphPattern::basic(TripleSlice::new(2, 3));
        src.and_filter(Expression::false_literal());

        join(&mut dest, src).unwrap();
        assert_eq!(dest.triples, Some(TripleSlice::new(0, 3)));
        assert_eq!(
            dest.filter,
            Some(Expression::true_literal().and_also(Expression::false_literal()))
        );
    }

    #[test]
    fn test_adjacent_basics_merge_and_group_collapses() {
        let mut tree = GraphPattern::group(vec![
            GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(0, 0))]),
            GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(1, 1))]),
        ]);
        assert!(structural_pass(&mut tree).unwrap());
        // The inner trivial groups collapse, the two basics merge, the
        // remaining single child is absorbed.
        assert_eq!(tree.op, GraphPatternOp::Basic);
        assert_eq!(tree.triples, Some(TripleSlice::new(0, 1)));
        assert!(tree.children.is_empty());
        // The result is a fixpoint.
        assert!(!structural_pass(&mut tree).unwrap());
    }

    #[test]
    fn test_empty_group_filter_is_hoisted() {
        let mut empty = GraphPattern::group(Vec::new());
        empty.and_filter(Expression::false_literal());
        let mut tree = GraphPattern::group(vec![
            GraphPattern::basic(TripleSlice::new(0, 0)),
            empty,
            GraphPattern::basic(TripleSlice::new(1, 1)),
        ]);
        assert!(structural_pass(&mut tree).unwrap());
        assert_eq!(tree.op, GraphPatternOp::Basic);
        assert_eq!(tree.triples, Some(TripleSlice::new(0, 1)));
        assert_eq!(tree.filter, Some(Expression::false_literal()));
    }

    #[test]
    fn test_union_is_never_collapsed() {
        let union = GraphPattern::union(vec![
            GraphPattern::basic(TripleSlice::new(0, 0)),
            GraphPattern::basic(TripleSlice::new(1, 1)),
        ]);
        let mut tree = GraphPattern::group(vec![union.clone()]);
        assert!(!structural_pass(&mut tree).unwrap());
        assert_eq!(tree.children, [union]);
    }

    #[test]
    fn test_lone_filter_keeps_its_group() {
        let mut tree =
            GraphPattern::group(vec![GraphPattern::filter_of(Expression::true_literal())]);
        assert!(!structural_pass(&mut tree).unwrap());
        assert_eq!(tree.op, GraphPatternOp::Group);
        assert_eq!(tree.children.len(), 1);
    }
}
