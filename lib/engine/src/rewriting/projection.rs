use crate::error::{Warning, WarningKind};
use crate::query::QueryVerb;
use rdf_prepare_algebra::{Projection, Variable, VariablesTable};

/// Expands `SELECT *` into the ordered list of all named variables.
///
/// Deferred while the pattern tree is absent; anonymous variables never
/// appear in a wildcard expansion.
pub(crate) fn expand_wildcard(
    verb: &QueryVerb,
    projection: Option<&mut Projection>,
    pattern_present: bool,
    variables: &VariablesTable,
) -> bool {
    if !matches!(verb, QueryVerb::Select) || !pattern_present {
        return false;
    }
    let Some(projection) = projection else {
        return false;
    };
    if !projection.wildcard {
        return false;
    }
    projection.variables = variables.named().map(Variable::offset).collect();
    projection.wildcard = false;
    true
}

/// Drops second and later occurrences of a variable from the projection,
/// warning once per dropped entry. Order-preserving.
pub(crate) fn prune_duplicates(
    projection: Option<&mut Projection>,
    variables: &VariablesTable,
    warnings: &mut Vec<Warning>,
) -> bool {
    let Some(projection) = projection else {
        return false;
    };
    let mut seen = Vec::with_capacity(projection.variables.len());
    let mut changed = false;
    projection.variables.retain(|&id| {
        if seen.contains(&id) {
            let variable = variables.get(id);
            warnings.push(Warning::for_variable(
                WarningKind::DuplicateVariable,
                variable.name(),
                variable.locator(),
            ));
            changed = true;
            false
        } else {
            seen.push(id);
            true
        }
    });
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_prepare_algebra::VariableId;

    #[test]
    fn test_wildcard_skips_anonymous() {
        let mut variables = VariablesTable::new();
        let s = variables.declare_named("s");
        variables.declare_anonymous("b0");
        let o = variables.declare_named("o");

        let mut projection = Projection::wildcard();
        assert!(expand_wildcard(
            &QueryVerb::Select,
            Some(&mut projection),
            true,
            &variables,
        ));
        assert_eq!(projection.variables, [s, o]);
        assert!(!projection.wildcard);
    }

    #[test]
    fn test_wildcard_defers_without_pattern() {
        let variables = VariablesTable::new();
        let mut projection = Projection::wildcard();
        assert!(!expand_wildcard(
            &QueryVerb::Select,
            Some(&mut projection),
            false,
            &variables,
        ));
        assert!(projection.wildcard);
    }

    #[test]
    fn test_prune_duplicates_is_stable() {
        let mut variables = VariablesTable::new();
        let a = variables.declare_named("a");
        let b = variables.declare_named("b");
        let mut projection = Projection::of(vec![a, b, a, VariableId(0)]);
        let mut warnings = Vec::new();

        assert!(prune_duplicates(
            Some(&mut projection),
            &variables,
            &mut warnings
        ));
        assert_eq!(projection.variables, [a, b]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|w| w.kind == WarningKind::DuplicateVariable));
    }
}
