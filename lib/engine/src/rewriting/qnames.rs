use crate::error::QueryPreparationError;
use crate::query::QueryVerb;
use rdf_prepare_algebra::{
    Expression, GraphPattern, Namespaces, SolutionModifier, Term, TermPosition, TriplePattern,
    ValuesBlock, VariableId, VariablesTable,
};

/// Replaces every `prefix:local` term with its resolved absolute IRI, in
/// triples, expressions (including `EXISTS` bodies), GRAPH origins, VALUES
/// cells, CONSTRUCT templates and DESCRIBE terms.
pub(crate) fn expand_qnames(
    namespaces: &Namespaces,
    triples: &mut [TriplePattern],
    pattern: Option<&mut GraphPattern>,
    variables: &mut VariablesTable,
    verb: &mut QueryVerb,
    modifier: &mut SolutionModifier,
    values: Option<&mut ValuesBlock>,
) -> Result<bool, QueryPreparationError> {
    let mut changed = false;
    for triple in triples.iter_mut() {
        changed |= expand_triple(triple, namespaces)?;
    }
    if let Some(pattern) = pattern {
        changed |= expand_pattern(pattern, namespaces)?;
    }
    for offset in 0..variables.len() {
        if let Some(expression) = variables.get_mut(VariableId(offset)).expression_mut() {
            changed |= expand_expression(expression, namespaces)?;
        }
    }
    match verb {
        QueryVerb::Construct(template) => {
            for triple in template {
                changed |= expand_triple(triple, namespaces)?;
            }
        }
        QueryVerb::Describe(terms) => {
            for term in terms {
                changed |= expand_term(term, namespaces)?;
            }
        }
        QueryVerb::Select | QueryVerb::Ask => {}
    }
    for expression in modifier.expressions_mut() {
        changed |= expand_expression(expression, namespaces)?;
    }
    if let Some(values) = values {
        changed |= expand_values(values, namespaces)?;
    }
    Ok(changed)
}

fn expand_term(term: &mut Term, namespaces: &Namespaces) -> Result<bool, QueryPreparationError> {
    if let Term::QName(qname) = term {
        *term = Term::NamedNode(namespaces.expand(qname)?);
        return Ok(true);
    }
    Ok(false)
}

fn expand_triple(
    triple: &mut TriplePattern,
    namespaces: &Namespaces,
) -> Result<bool, QueryPreparationError> {
    let mut changed = false;
    for position in TermPosition::ALL {
        if let Some(term) = triple.term_mut(position) {
            changed |= expand_term(term, namespaces)?;
        }
    }
    Ok(changed)
}

fn expand_values(
    values: &mut ValuesBlock,
    namespaces: &Namespaces,
) -> Result<bool, QueryPreparationError> {
    let mut changed = false;
    for row in &mut values.rows {
        for cell in row.iter_mut().flatten() {
            changed |= expand_term(cell, namespaces)?;
        }
    }
    Ok(changed)
}

fn expand_pattern(
    node: &mut GraphPattern,
    namespaces: &Namespaces,
) -> Result<bool, QueryPreparationError> {
    let mut changed = false;
    for child in &mut node.children {
        changed |= expand_pattern(child, namespaces)?;
    }
    if let Some(origin) = &mut node.origin {
        changed |= expand_term(origin, namespaces)?;
    }
    if let Some(filter) = &mut node.filter {
        changed |= expand_expression(filter, namespaces)?;
    }
    if let Some(bindings) = &mut node.bindings {
        changed |= expand_values(bindings, namespaces)?;
    }
    if let Some(modifier) = &mut node.modifier {
        for expression in modifier.expressions_mut() {
            changed |= expand_expression(expression, namespaces)?;
        }
    }
    Ok(changed)
}

fn expand_expression(
    expression: &mut Expression,
    namespaces: &Namespaces,
) -> Result<bool, QueryPreparationError> {
    match expression {
        Expression::QName(qname) => {
            *expression = Expression::NamedNode(namespaces.expand(qname)?);
            Ok(true)
        }
        // EXISTS bodies are not rewritten structurally, but their terms are
        // still resolved.
        Expression::Exists(pattern) => expand_pattern(pattern, namespaces),
        _ => {
            let mut changed = false;
            for child in expression.children_mut() {
                changed |= expand_expression(child, namespaces)?;
            }
            Ok(changed)
        }
    }
}
