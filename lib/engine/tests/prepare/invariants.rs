use crate::test_utils::iri;
use rdf_prepare_algebra::{
    GraphPattern, GraphPatternOp, Term, TriplePattern, TripleSlice, VariableId,
};
use rdf_prepare_engine::{Query, RowId};

/// A three-triple chain, each triple in its own wrapped group, so the
/// rewrites have real work to do before the analysis runs.
fn chain_query() -> Query {
    let mut query = Query::select();
    let a = query.variables_mut().declare_named("a");
    let b = query.variables_mut().declare_named("b");
    let c = query.variables_mut().declare_named("c");
    let d = query.variables_mut().declare_named("d");
    query.add_triple(TriplePattern::new(a, iri("p"), b));
    query.add_triple(TriplePattern::new(b, iri("p"), c));
    query.add_triple(TriplePattern::new(c, iri("p"), d));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(0, 0))]),
        GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(1, 1))]),
        GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(2, 2))]),
    ]));
    query
}

#[test]
fn test_variable_offsets_survive_preparation() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, iri("p"), Term::BlankNode("b".to_owned())));
    query.add_triple(TriplePattern::new(Term::BlankNode("b".to_owned()), iri("q"), o));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
        TripleSlice::new(0, 1),
    )]));

    query.prepare().unwrap();

    // Lifting appended an anonymous variable without disturbing earlier
    // offsets.
    assert_eq!(query.variables().len(), 3);
    assert_eq!(query.variables().get(s).offset(), s);
    assert_eq!(query.variables().get(s).name(), "s");
    assert_eq!(query.variables().get(o).offset(), o);
}

#[test]
fn test_gp_index_matches_post_order_position() {
    let mut query = chain_query();
    query.prepare().unwrap();
    for (position, pattern) in query.patterns().iter().enumerate() {
        assert_eq!(pattern.gp_index, Some(position));
    }
    assert_eq!(query.pattern_count(), query.patterns().len());
}

#[test]
fn test_bind_first_wins_within_a_slice() {
    let mut query = chain_query();
    query.prepare().unwrap();

    let root = query.pattern().unwrap();
    assert_eq!(root.op, GraphPatternOp::Basic);
    let slice = root.triples.unwrap();
    assert_eq!(slice, TripleSlice::new(0, 2));

    let roles = query.term_roles().unwrap();
    for offset in 0..query.variables().len() {
        let variable = VariableId(offset);
        let mut bound_seen = false;
        for column in slice.columns() {
            let flags = roles.get(column, variable);
            if bound_seen {
                assert!(!flags.binds_any(), "second binding for column {column}");
            } else {
                assert!(!flags.uses_any(), "use before binding at column {column}");
                bound_seen = flags.binds_any();
            }
        }
        assert!(bound_seen, "variable {offset} never bound");
    }
}

#[test]
fn test_use_map_is_consistent_with_term_roles() {
    let mut query = chain_query();
    query.prepare().unwrap();

    let roles = query.term_roles().unwrap();
    let use_map = query.use_map().unwrap();
    for pattern in query.patterns() {
        if pattern.op != GraphPatternOp::Basic {
            continue;
        }
        let row = RowId::Pattern(pattern.gp_index.unwrap());
        let slice = pattern.triples.unwrap();
        for offset in 0..query.variables().len() {
            let variable = VariableId(offset);
            let used_somewhere = slice
                .columns()
                .any(|column| roles.get(column, variable).uses_any());
            assert_eq!(use_map.get(row, variable).mentioned(), used_somewhere);
        }
    }
}

#[test]
fn test_regrouping_joins_to_the_same_tree() {
    let build = |split: usize| {
        let mut query = Query::select();
        let a = query.variables_mut().declare_named("a");
        let b = query.variables_mut().declare_named("b");
        let c = query.variables_mut().declare_named("c");
        query.add_triple(TriplePattern::new(a, iri("p"), b));
        query.add_triple(TriplePattern::new(b, iri("p"), c));
        query.add_triple(TriplePattern::new(c, iri("p"), a));
        let (left, right): (Vec<_>, Vec<_>) = (0..3_usize)
            .map(|column| GraphPattern::basic(TripleSlice::new(column, column)))
            .enumerate()
            .partition(|(column, _)| *column < split);
        let unwrap = |patterns: Vec<(usize, GraphPattern)>| {
            patterns.into_iter().map(|(_, pattern)| pattern).collect()
        };
        query.set_pattern(GraphPattern::group(vec![
            GraphPattern::group(unwrap(left)),
            GraphPattern::group(unwrap(right)),
        ]));
        query.prepare().unwrap();
        query.pattern_display().unwrap().to_string()
    };

    // {t0 t1} {t2} and {t0} {t1 t2} settle on the same merged pattern.
    assert_eq!(build(1), build(2));
}

#[test]
fn test_deep_nesting_converges() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    let mut pattern = GraphPattern::basic(TripleSlice::new(0, 0));
    for _ in 0..12 {
        pattern = GraphPattern::group(vec![pattern]);
    }
    query.set_pattern(pattern);

    query.prepare().unwrap();
    assert_eq!(query.pattern().unwrap().op, GraphPatternOp::Basic);
    assert_eq!(query.pattern_count(), 1);
}
