use rdf_prepare_algebra::{Term, TermPosition, TriplePattern, VariablesTable};

/// Promotes every blank node of the flat triple array to an anonymous
/// variable named after its label.
///
/// Declaration deduplicates by name, so two occurrences of `_:b` in the same
/// query resolve to the same variable and keep their join semantics.
/// CONSTRUCT templates are deliberately untouched: a template blank node
/// stands for a fresh node per solution, not for a joinable variable.
pub(crate) fn lift_blank_nodes(
    triples: &mut [TriplePattern],
    variables: &mut VariablesTable,
) -> bool {
    let mut changed = false;
    for triple in triples {
        for position in TermPosition::ALL {
            let Some(term) = triple.term_mut(position) else {
                continue;
            };
            if let Term::BlankNode(label) = term {
                let variable = variables.declare_anonymous(label);
                *term = Term::Variable(variable);
                changed = true;
            }
        }
    }
    changed
}
