use crate::test_utils::iri;
use rdf_prepare_algebra::{
    Expression, GraphPattern, GraphPatternOp, Projection, Term, TermPosition, TriplePattern,
    TripleSlice, ValuesBlock,
};
use rdf_prepare_engine::{Query, ReservedRow, RowId, WarningKind};
use rdf_prepare_model::Literal;

#[test]
fn test_wildcard_select_over_single_triple() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let p = query.variables_mut().declare_named("p");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, p, o));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
        TripleSlice::new(0, 0),
    )]));

    query.prepare().unwrap();

    let projection = query.projection().unwrap();
    assert!(!projection.wildcard);
    assert_eq!(projection.variables, [s, p, o]);

    let rendered = query.pattern_display().unwrap().to_string();
    insta::assert_snapshot!(rendered.trim_end(), @r"
    basic#0 [0..0]
      ?s ?p ?o
    ");

    let roles = query.term_roles().unwrap();
    assert!(roles.get(0, s).bound_at(TermPosition::Subject));
    assert!(roles.get(0, p).bound_at(TermPosition::Predicate));
    assert!(roles.get(0, o).bound_at(TermPosition::Object));
    assert!(query.warnings().is_empty());
}

#[test]
fn test_duplicate_projection_is_pruned_with_warning() {
    let mut query = Query::select();
    let a = query.variables_mut().declare_named("a");
    let b = query.variables_mut().declare_named("b");
    query.add_triple(TriplePattern::new(a, iri("p"), b));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
        TripleSlice::new(0, 0),
    )]));
    query.set_projection(Projection::of(vec![a, a]));

    query.prepare().unwrap();

    assert_eq!(query.projection().unwrap().variables, [a]);
    let kinds: Vec<_> = query
        .warnings()
        .iter()
        .map(|w| (w.kind, w.variable.clone()))
        .collect();
    assert!(kinds.contains(&(WarningKind::DuplicateVariable, Some("a".to_owned()))));
    // ?b is introduced by the triple but its value never constrains
    // anything.
    assert!(kinds.contains(&(WarningKind::VariableUnusedButBound, Some("b".to_owned()))));

    let use_map = query.use_map().unwrap();
    assert!(use_map.get(RowId::Pattern(0), b).bound_here());
}

#[test]
fn test_adjacent_basic_groups_merge_into_one() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    let x = query.variables_mut().declare_named("x");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.add_triple(TriplePattern::new(s, iri("q"), x));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(0, 0))]),
        GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(1, 1))]),
    ]));
    query.set_projection(Projection::of(vec![x]));

    query.prepare().unwrap();

    let root = query.pattern().unwrap();
    assert_eq!(root.op, GraphPatternOp::Basic);
    assert_eq!(root.triples, Some(TripleSlice::new(0, 1)));
    assert_eq!(query.pattern_count(), 1);

    let roles = query.term_roles().unwrap();
    assert!(roles.get(0, s).bound_at(TermPosition::Subject));
    assert!(roles.get(1, s).used_at(TermPosition::Subject));
    assert!(roles.get(0, o).bound_at(TermPosition::Object));
    assert!(roles.get(1, x).bound_at(TermPosition::Object));

    let use_map = query.use_map().unwrap();
    let row = RowId::Pattern(0);
    assert!(use_map.get(row, s).bound_here());
    assert!(use_map.get(row, s).mentioned());
    assert!(use_map.get(row, x).bound_here());
    assert!(!use_map.get(row, x).mentioned());
}

#[test]
fn test_filter_on_never_bound_variable_becomes_false() {
    let mut query = Query::select();
    let a = query.variables_mut().declare_named("a");
    let b = query.variables_mut().declare_named("b");
    let x = query.variables_mut().declare_named("x");
    query.add_triple(TriplePattern::new(a, iri("p"), b));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::basic(TripleSlice::new(0, 0)),
        GraphPattern::filter_of(Expression::Greater(
            Box::new(Expression::Variable(x)),
            Box::new(Expression::Literal(Literal::from(2_i64))),
        )),
    ]));
    query.set_projection(Projection::of(vec![x]));

    query.prepare().unwrap();

    let root = query.pattern().unwrap();
    assert_eq!(root.children[1].filter, Some(Expression::false_literal()));
    assert_eq!(root.children[1].scope_group, root.gp_index);

    let rendered = query.pattern_display().unwrap().to_string();
    insta::assert_snapshot!(rendered.trim_end(), @r#"
    group#2
      basic#0 [0..0]
        ?a <http://example.com/p> ?b
      filter#1 filter="false"^^<http://www.w3.org/2001/XMLSchema#boolean>
    "#);

    let kinds: Vec<_> = query
        .warnings()
        .iter()
        .map(|w| (w.kind, w.variable.clone()))
        .collect();
    assert!(kinds.contains(&(WarningKind::SelectedNeverBound, Some("x".to_owned()))));
}

#[test]
fn test_blank_nodes_lift_to_one_shared_anonymous_variable() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(
        s,
        iri("p"),
        Term::BlankNode("b".to_owned()),
    ));
    query.add_triple(TriplePattern::new(
        Term::BlankNode("b".to_owned()),
        iri("q"),
        o,
    ));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
        TripleSlice::new(0, 1),
    )]));
    query.set_projection(Projection::of(vec![s]));

    query.prepare().unwrap();

    // One anonymous variable, shared by both occurrences of the label.
    assert_eq!(query.variables().len(), 3);
    let Term::Variable(lifted) = &query.triples()[0].object else {
        panic!("blank node was not lifted");
    };
    assert_eq!(query.triples()[1].subject, Term::Variable(*lifted));

    let roles = query.term_roles().unwrap();
    assert!(roles.get(0, *lifted).bound_at(TermPosition::Object));
    assert!(roles.get(1, *lifted).used_at(TermPosition::Subject));
    // No usage warnings for synthesised variables.
    assert!(query
        .warnings()
        .iter()
        .all(|w| w.variable.as_deref() != Some("b")));
}

#[test]
fn test_constant_subexpression_folds() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::basic(TripleSlice::new(0, 0)),
        GraphPattern::filter_of(Expression::Equal(
            Box::new(Expression::Variable(o)),
            Box::new(Expression::Add(
                Box::new(Expression::Literal(Literal::from(1_i64))),
                Box::new(Expression::Literal(Literal::from(2_i64))),
            )),
        )),
    ]));
    query.set_projection(Projection::of(vec![s]));

    query.prepare().unwrap();

    let root = query.pattern().unwrap();
    assert_eq!(
        root.children[1].filter,
        Some(Expression::Equal(
            Box::new(Expression::Variable(o)),
            Box::new(Expression::Literal(Literal::from(3_i64))),
        ))
    );
}

#[test]
fn test_constant_false_filter_is_retained() {
    let mut query = Query::ask();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::basic(TripleSlice::new(0, 0)),
        GraphPattern::filter_of(Expression::Greater(
            Box::new(Expression::Literal(Literal::from(1_i64))),
            Box::new(Expression::Literal(Literal::from(2_i64))),
        )),
    ]));

    query.prepare().unwrap();

    // Folded to the literal, but no dead-branch elimination at this layer.
    let root = query.pattern().unwrap();
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[1].filter, Some(Expression::false_literal()));
}

#[test]
fn test_bind_only_variables_warn_unused() {
    let mut query = Query::ask();
    let v1 = query.variables_mut().declare_named("v1");
    let v2 = query.variables_mut().declare_named("v2");
    query
        .variables_mut()
        .get_mut(v1)
        .set_expression(Expression::Literal(Literal::from(1_i64)));
    query
        .variables_mut()
        .get_mut(v2)
        .set_expression(Expression::Literal(Literal::from(2_i64)));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::bind(v1),
        GraphPattern::bind(v2),
    ]));

    query.prepare().unwrap();

    let unused: Vec<_> = query
        .warnings()
        .iter()
        .filter(|w| w.kind == WarningKind::VariableUnusedButBound)
        .filter_map(|w| w.variable.clone())
        .collect();
    assert_eq!(unused, ["v1", "v2"]);
}

#[test]
fn test_projection_expression_binds_at_verb_slot() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    let x = query.variables_mut().declare_named("x");
    query
        .variables_mut()
        .get_mut(x)
        .set_expression(Expression::Literal(Literal::from(1_i64)));
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
        TripleSlice::new(0, 0),
    )]));
    query.set_projection(Projection::of(vec![x]));

    query.prepare().unwrap();

    let use_map = query.use_map().unwrap();
    assert!(use_map.get(RowId::Reserved(ReservedRow::Verbs), x).bound_here());
    let kinds: Vec<_> = query
        .warnings()
        .iter()
        .map(|w| (w.kind, w.variable.clone()))
        .collect();
    // Bound and selected, but absent from the pattern tree.
    assert!(kinds.contains(&(WarningKind::UnusedInQuery, Some("x".to_owned()))));
    assert!(!kinds
        .iter()
        .any(|(kind, _)| *kind == WarningKind::SelectedNeverBound));
}

#[test]
fn test_graph_pattern_binds_origin_and_marks_graph_uses() {
    let mut query = Query::select();
    let g = query.variables_mut().declare_named("g");
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::graph(
        g,
        vec![GraphPattern::basic(TripleSlice::new(0, 0))],
    )]));

    query.prepare().unwrap();

    // The basic pattern's row is 0, the graph node's row is 1.
    let use_map = query.use_map().unwrap();
    assert!(use_map.get(RowId::Pattern(1), g).bound_here());

    // The stamped origin is a reference to the already-promoted variable.
    let roles = query.term_roles().unwrap();
    assert!(roles.get(0, g).used_at(TermPosition::Graph));
    assert!(!roles.get(0, g).bound_at(TermPosition::Graph));
}

#[test]
fn test_union_branches_are_isolated() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.add_triple(TriplePattern::new(s, iri("q"), o));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::union(vec![
        GraphPattern::basic(TripleSlice::new(0, 0)),
        GraphPattern::basic(TripleSlice::new(1, 1)),
    ])]));

    query.prepare().unwrap();

    // Each branch introduces the variables on its own.
    let roles = query.term_roles().unwrap();
    assert!(roles.get(0, s).bound_at(TermPosition::Subject));
    assert!(roles.get(1, s).bound_at(TermPosition::Subject));
    assert!(!roles.get(1, s).used_at(TermPosition::Subject));
}

#[test]
fn test_sub_select_isolates_scope_and_exports_projection() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    let x = query.variables_mut().declare_named("x");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.add_triple(TriplePattern::new(s, iri("q"), x));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::sub_select(
            Projection::of(vec![s]),
            None,
            vec![GraphPattern::group(vec![GraphPattern::basic(
                TripleSlice::new(0, 0),
            )])],
        ),
        GraphPattern::basic(TripleSlice::new(1, 1)),
    ]));
    query.set_projection(Projection::of(vec![x]));

    query.prepare().unwrap();

    // The outer occurrence of ?s references the sub-select's projection.
    let roles = query.term_roles().unwrap();
    assert!(roles.get(0, s).bound_at(TermPosition::Subject));
    assert!(roles.get(1, s).used_at(TermPosition::Subject));
    assert!(roles.get(1, x).bound_at(TermPosition::Object));
}

#[test]
fn test_values_bind_inline_and_query_level() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    let v = query.variables_mut().declare_named("v");
    let w = query.variables_mut().declare_named("w");
    query.add_triple(TriplePattern::new(s, iri("p"), o));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::basic(TripleSlice::new(0, 0)),
        GraphPattern::values(ValuesBlock::new(
            vec![v],
            vec![vec![Some(Term::from(Literal::from(1_i64)))]],
        )),
    ]));
    query.set_values(ValuesBlock::new(vec![w], vec![vec![None]]));
    query.set_projection(Projection::of(vec![s, v, w]));

    query.prepare().unwrap();

    let use_map = query.use_map().unwrap();
    assert!(use_map.get(RowId::Pattern(1), v).bound_here());
    assert!(use_map
        .get(RowId::Reserved(ReservedRow::Values), w)
        .bound_here());
    assert!(query.is_bound_anywhere(w));
}

#[test]
fn test_qname_expansion_in_triples_and_filters() {
    let mut query = Query::select();
    query
        .namespaces_mut()
        .declare("ex", "http://example.com/ns#");
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, Term::QName("ex:p".to_owned()), o));
    query.set_pattern(GraphPattern::group(vec![
        GraphPattern::basic(TripleSlice::new(0, 0)),
        GraphPattern::filter_of(Expression::Equal(
            Box::new(Expression::Variable(o)),
            Box::new(Expression::QName("ex:thing".to_owned())),
        )),
    ]));

    query.prepare().unwrap();

    assert_eq!(
        query.triples()[0].predicate,
        Term::NamedNode(iri("ns#p"))
    );
    let root = query.pattern().unwrap();
    assert_eq!(
        root.children[1].filter,
        Some(Expression::Equal(
            Box::new(Expression::Variable(o)),
            Box::new(Expression::NamedNode(iri("ns#thing"))),
        ))
    );
}

#[test]
fn test_undeclared_prefix_fails_preparation() {
    let mut query = Query::select();
    let s = query.variables_mut().declare_named("s");
    let o = query.variables_mut().declare_named("o");
    query.add_triple(TriplePattern::new(s, Term::QName("nope:p".to_owned()), o));
    query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
        TripleSlice::new(0, 0),
    )]));

    assert!(query.prepare().is_err());
}
