use crate::analysis::{PatternIndex, VariableUseMap};
use crate::error::{QueryPreparationError, Warning, WarningKind};
use itertools::Itertools;
use rdf_prepare_algebra::{
    Expression, GraphPattern, GraphPatternOp, Projection, TriplePattern, VariableId, VariableKind,
    VariablesTable,
};

/// Rewrites provably-false filters and records each filter's scope.
///
/// A filter's natural scope is the enclosing group. If some variable the
/// filter mentions is not bound anywhere under that group (nor by a
/// query-level binding slot), the filter can never hold and its expression
/// is replaced by the boolean literal `false`. The filter node itself is
/// retained; dead-branch elimination is not this layer's business.
///
/// The walk carries the enclosing group down the recursion instead of
/// chasing parent pointers; rerunning it on an already-checked tree changes
/// nothing, because a `false` literal mentions no variables.
pub(crate) fn check_scopes(
    root: Option<&mut GraphPattern>,
    triples: &[TriplePattern],
    use_map: &VariableUseMap,
    index: &PatternIndex,
) -> bool {
    let Some(root) = root else {
        return false;
    };
    let Some(root_index) = root.gp_index else {
        return false;
    };
    let mut changed = false;
    visit(root, root_index, triples, use_map, index, &mut changed);
    changed
}

fn visit(
    node: &mut GraphPattern,
    enclosing_group: usize,
    triples: &[TriplePattern],
    use_map: &VariableUseMap,
    index: &PatternIndex,
    changed: &mut bool,
) {
    // A group is its own filter scope; everything else inherits.
    let scope = match (node.op, node.gp_index) {
        (GraphPatternOp::Group, Some(own)) => own,
        _ => enclosing_group,
    };
    if let Some(filter) = &node.filter {
        let mut mentioned = Vec::new();
        filter.collect_variables(triples, &mut mentioned);
        let out_of_scope = mentioned
            .into_iter()
            .unique()
            .any(|variable| !is_in_scope(variable, scope, use_map, index));
        if out_of_scope {
            node.filter = Some(Expression::false_literal());
            *changed = true;
        }
        node.scope_group = Some(scope);
    }
    for child in &mut node.children {
        visit(child, scope, triples, use_map, index, changed);
    }
}

fn is_in_scope(
    variable: VariableId,
    enclosing_group: usize,
    use_map: &VariableUseMap,
    index: &PatternIndex,
) -> bool {
    if use_map.is_bound_in_reserved_rows(variable) {
        return true;
    }
    index
        .subtree_range(enclosing_group)
        .is_some_and(|(start, end)| use_map.is_bound_in_patterns(start..=end, variable))
}

/// The usage diagnostics emitted after scope checking.
///
/// A variable with no cell in any row did not come from the query text at
/// all; that is a fatal inconsistency. Anonymous variables are exempt from
/// the warnings: they are synthesised, so the user cannot act on them.
pub(crate) fn diagnose(
    variables: &VariablesTable,
    projection: Option<&Projection>,
    use_map: &VariableUseMap,
    warnings: &mut Vec<Warning>,
) -> Result<(), QueryPreparationError> {
    for variable in variables.iter() {
        let id = variable.offset();
        if !use_map.is_used_anywhere(id) {
            return Err(QueryPreparationError::DanglingVariable(
                variable.name().to_owned(),
            ));
        }
        if variable.kind() != VariableKind::Named {
            continue;
        }
        let bound = use_map.is_bound_anywhere(id);
        let mentioned = use_map.is_mentioned_anywhere(id);
        let selected = projection.is_some_and(|projection| projection.contains(id));
        if selected && !bound {
            warnings.push(Warning::for_variable(
                WarningKind::SelectedNeverBound,
                variable.name(),
                variable.locator(),
            ));
        } else if bound && !mentioned {
            warnings.push(Warning::for_variable(
                WarningKind::VariableUnusedButBound,
                variable.name(),
                variable.locator(),
            ));
        } else if !use_map.touches_pattern_rows(id) {
            warnings.push(Warning::for_variable(
                WarningKind::UnusedInQuery,
                variable.name(),
                variable.locator(),
            ));
        }
    }
    Ok(())
}
