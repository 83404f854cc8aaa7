use crate::eval::evaluate_constant;
use rdf_prepare_algebra::{
    Expression, Function, GraphPattern, SolutionModifier, VariableId, VariablesTable,
};
use rdf_prepare_model::TypedValue;

/// Folds constant subexpressions everywhere expressions live: pattern
/// filters, bound-variable expressions, and the solution-modifier sequences
/// of the query and of sub-selects.
pub(crate) fn fold_pass(
    pattern: Option<&mut GraphPattern>,
    variables: &mut VariablesTable,
    modifier: &mut SolutionModifier,
) -> bool {
    let mut changed = false;
    if let Some(pattern) = pattern {
        pattern.walk_mut(&mut |node| {
            if let Some(filter) = &mut node.filter {
                changed |= fold_expression(filter);
            }
            if let Some(modifier) = &mut node.modifier {
                for expression in modifier.expressions_mut() {
                    changed |= fold_expression(expression);
                }
            }
        });
    }
    for offset in 0..variables.len() {
        if let Some(expression) = variables.get_mut(VariableId(offset)).expression_mut() {
            changed |= fold_expression(expression);
        }
    }
    for expression in modifier.expressions_mut() {
        changed |= fold_expression(expression);
    }
    changed
}

/// Folds one expression tree until it stops changing.
///
/// Bottom-up: children first, then the node itself if the whole
/// subexpression is constant. A subexpression whose evaluation fails is
/// left untouched, preserving its runtime error behavior.
pub(crate) fn fold_expression(expression: &mut Expression) -> bool {
    let mut changed = false;
    while fold_step(expression) {
        changed = true;
    }
    changed
}

fn fold_step(expression: &mut Expression) -> bool {
    let mut changed = false;
    for child in expression.children_mut() {
        changed |= fold_step(child);
    }
    if is_value_leaf(expression) || !is_constant(expression) {
        return changed;
    }
    if let Ok(value) = evaluate_constant(expression) {
        if let Some(replacement) = value_to_expression(value) {
            if replacement != *expression {
                *expression = replacement;
                changed = true;
            }
        }
    }
    changed
}

fn is_value_leaf(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::Literal(_) | Expression::NamedNode(_)
    )
}

/// An expression is constant if every leaf is a literal or an IRI and no
/// non-deterministic builtin appears.
fn is_constant(expression: &Expression) -> bool {
    match expression {
        Expression::Literal(_) | Expression::NamedNode(_) => true,
        Expression::QName(_)
        | Expression::Variable(_)
        | Expression::Bound(_)
        | Expression::Exists(_)
        | Expression::Aggregate(_) => false,
        Expression::FunctionCall(function, args) => {
            is_deterministic(function) && args.iter().all(is_constant)
        }
        _ => expression.children().into_iter().all(is_constant),
    }
}

fn is_deterministic(function: &Function) -> bool {
    !matches!(
        function,
        Function::Rand | Function::Now | Function::Uuid | Function::StrUuid | Function::BNode
    )
}

fn value_to_expression(value: TypedValue) -> Option<Expression> {
    match value {
        TypedValue::NamedNode(node) => Some(Expression::NamedNode(node)),
        other => other.to_literal().map(Expression::Literal),
    }
}
