use crate::analysis::{
    enumerate_graph_patterns, BindingPass, MentionPass, PatternIndex, TermRoleMap, VariableUseMap,
};
use crate::error::{QueryPreparationError, Warning};
use crate::rewriting::{blank_nodes, fold, merge, projection, qnames};
use crate::scope;
use rdf_prepare_algebra::{
    GraphPattern, GraphPatternOp, Namespaces, PatternDisplay, Projection, SolutionModifier, Term,
    TriplePattern, ValuesBlock, VariableId, VariablesTable,
};

/// The query verb and its verb-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryVerb {
    Select,
    /// The CONSTRUCT template. Template triples live outside the flat
    /// triple array and never enter the analysis matrices.
    Construct(Vec<TriplePattern>),
    Describe(Vec<Term>),
    Ask,
}

/// A query under preparation, and afterwards the read surface the execution
/// engine works from.
///
/// The parser assembles the query through the builder surface (variables,
/// triples, the pattern tree, projection and modifiers), then calls
/// [prepare](Query::prepare) exactly once. Everything the object owns lives
/// until the object is dropped; preparation never hands out pieces.
pub struct Query {
    verb: QueryVerb,
    namespaces: Namespaces,
    variables: VariablesTable,
    triples: Vec<TriplePattern>,
    pattern: Option<GraphPattern>,
    projection: Option<Projection>,
    modifier: SolutionModifier,
    values: Option<ValuesBlock>,
    warnings: Vec<Warning>,
    on_warning: Option<Box<dyn FnMut(&Warning)>>,
    index: PatternIndex,
    use_map: Option<VariableUseMap>,
    term_roles: Option<TermRoleMap>,
    prepared: bool,
}

impl Query {
    pub fn new(verb: QueryVerb) -> Self {
        Self {
            verb,
            namespaces: Namespaces::new(),
            variables: VariablesTable::new(),
            triples: Vec::new(),
            pattern: None,
            projection: None,
            modifier: SolutionModifier::default(),
            values: None,
            warnings: Vec::new(),
            on_warning: None,
            index: PatternIndex::default(),
            use_map: None,
            term_roles: None,
            prepared: false,
        }
    }

    /// A SELECT query; starts with a wildcard projection.
    pub fn select() -> Self {
        let mut query = Self::new(QueryVerb::Select);
        query.projection = Some(Projection::wildcard());
        query
    }

    pub fn ask() -> Self {
        Self::new(QueryVerb::Ask)
    }

    pub fn construct(template: Vec<TriplePattern>) -> Self {
        Self::new(QueryVerb::Construct(template))
    }

    pub fn describe(terms: Vec<Term>) -> Self {
        Self::new(QueryVerb::Describe(terms))
    }

    // ---- builder surface (parser-facing) ----

    pub fn namespaces_mut(&mut self) -> &mut Namespaces {
        &mut self.namespaces
    }

    pub fn variables_mut(&mut self) -> &mut VariablesTable {
        &mut self.variables
    }

    /// Appends a triple to the flat triple array, returning its column.
    pub fn add_triple(&mut self, triple: TriplePattern) -> usize {
        self.triples.push(triple);
        self.triples.len() - 1
    }

    pub fn set_pattern(&mut self, pattern: GraphPattern) {
        self.pattern = Some(pattern);
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = Some(projection);
    }

    pub fn modifier_mut(&mut self) -> &mut SolutionModifier {
        &mut self.modifier
    }

    /// Sets the query-level trailing VALUES clause.
    pub fn set_values(&mut self, values: ValuesBlock) {
        self.values = Some(values);
    }

    /// Installs a callback invoked for every warning as it is emitted.
    /// Warnings are accumulated on the query regardless.
    pub fn set_warning_handler(&mut self, handler: impl FnMut(&Warning) + 'static) {
        self.on_warning = Some(Box::new(handler));
    }

    // ---- preparation ----

    /// Runs the whole preparation pipeline: rewrites to a fixpoint, origin
    /// stamping, pattern indexing, the mention and binding passes, scope
    /// checking and usage diagnostics.
    ///
    /// Calling it on an already-prepared query is a no-op. On error the
    /// analysis state is unspecified and the query should be discarded.
    pub fn prepare(&mut self) -> Result<(), QueryPreparationError> {
        if self.prepared {
            return Ok(());
        }
        if let Some(pattern) = &self.pattern {
            pattern.validate_deep()?;
        }

        let passes = self.run_rewrites()?;
        tracing::debug!(passes, "graph-pattern rewriting reached its fixpoint");

        if let Some(pattern) = self.pattern.as_mut() {
            stamp_origins(pattern, &mut self.triples, None);
        }

        self.index = enumerate_graph_patterns(self.pattern.as_mut());
        let mut use_map =
            VariableUseMap::new(self.variables.len(), self.index.pattern_count());
        let mut term_roles = TermRoleMap::new(self.variables.len(), self.triples.len());

        MentionPass {
            triples: &self.triples,
            variables: &self.variables,
            use_map: &mut use_map,
        }
        .run(
            self.pattern.as_ref(),
            &self.verb,
            self.projection.as_ref(),
            &self.modifier,
        );

        BindingPass {
            triples: &self.triples,
            variables: &self.variables,
            use_map: &mut use_map,
            roles: &mut term_roles,
            width: self.variables.len(),
        }
        .run(
            self.pattern.as_ref(),
            self.projection.as_ref(),
            &self.modifier,
            self.values.as_ref(),
        );

        if scope::check_scopes(self.pattern.as_mut(), &self.triples, &use_map, &self.index) {
            tracing::debug!("rewrote out-of-scope filters to false");
        }

        let mut warnings = Vec::new();
        scope::diagnose(
            &self.variables,
            self.projection.as_ref(),
            &use_map,
            &mut warnings,
        )?;
        self.emit_warnings(warnings);

        self.use_map = Some(use_map);
        self.term_roles = Some(term_roles);
        self.prepared = true;
        Ok(())
    }

    /// Reruns the rewrite suite until a full pass changes nothing. The pass
    /// bound cannot be reached by well-formed input; it only guards against
    /// a non-converging rewrite bug.
    fn run_rewrites(&mut self) -> Result<usize, QueryPreparationError> {
        let initial = self.pattern.as_ref().map_or(0, GraphPattern::node_count);
        let max_passes = (2 * initial).max(2);
        let mut warnings = Vec::new();
        let mut passes = 0;
        loop {
            let mut changed = false;
            changed |= qnames::expand_qnames(
                &self.namespaces,
                &mut self.triples,
                self.pattern.as_mut(),
                &mut self.variables,
                &mut self.verb,
                &mut self.modifier,
                self.values.as_mut(),
            )?;
            changed |= blank_nodes::lift_blank_nodes(&mut self.triples, &mut self.variables);
            changed |= projection::expand_wildcard(
                &self.verb,
                self.projection.as_mut(),
                self.pattern.is_some(),
                &self.variables,
            );
            changed |=
                projection::prune_duplicates(self.projection.as_mut(), &self.variables, &mut warnings);
            if let Some(pattern) = self.pattern.as_mut() {
                changed |= merge::structural_pass(pattern)?;
            }
            changed |= fold::fold_pass(self.pattern.as_mut(), &mut self.variables, &mut self.modifier);

            passes += 1;
            if !changed {
                break;
            }
            if passes > max_passes {
                return Err(QueryPreparationError::RewriteDidNotConverge(passes));
            }
        }
        self.emit_warnings(warnings);
        Ok(passes)
    }

    fn emit_warnings(&mut self, warnings: Vec<Warning>) {
        for warning in warnings {
            tracing::warn!(kind = warning.kind.label(), "{warning}");
            if let Some(handler) = &mut self.on_warning {
                handler(&warning);
            }
            self.warnings.push(warning);
        }
    }

    // ---- read surface (executor-facing) ----

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn verb(&self) -> &QueryVerb {
        &self.verb
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn variables(&self) -> &VariablesTable {
        &self.variables
    }

    /// The flat triple array.
    pub fn triples(&self) -> &[TriplePattern] {
        &self.triples
    }

    /// The graph-pattern root, if the query has a WHERE clause.
    pub fn pattern(&self) -> Option<&GraphPattern> {
        self.pattern.as_ref()
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn modifier(&self) -> &SolutionModifier {
        &self.modifier
    }

    pub fn values(&self) -> Option<&ValuesBlock> {
        self.values.as_ref()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn pattern_count(&self) -> usize {
        self.index.pattern_count()
    }

    /// Every pattern of the tree, ordered by `gp_index`. (A post-order walk
    /// yields exactly the index order.)
    pub fn patterns(&self) -> Vec<&GraphPattern> {
        let mut patterns = Vec::with_capacity(self.index.pattern_count());
        if let Some(root) = &self.pattern {
            root.walk(&mut |node| patterns.push(node));
        }
        patterns
    }

    pub fn pattern_by_index(&self, gp_index: usize) -> Option<&GraphPattern> {
        self.patterns().get(gp_index).copied()
    }

    /// The variable-use matrix; present once prepared.
    pub fn use_map(&self) -> Option<&VariableUseMap> {
        self.use_map.as_ref()
    }

    /// The per-triple term-role matrix; present once prepared.
    pub fn term_roles(&self) -> Option<&TermRoleMap> {
        self.term_roles.as_ref()
    }

    /// Whether the variable is bound anywhere in the query.
    pub fn is_bound_anywhere(&self, variable: VariableId) -> bool {
        self.use_map
            .as_ref()
            .is_some_and(|use_map| use_map.is_bound_anywhere(variable))
    }

    /// Whether the variable is bound somewhere under the pattern with the
    /// given index (the pattern itself included).
    pub fn is_bound_under(&self, gp_index: usize, variable: VariableId) -> bool {
        let Some(use_map) = &self.use_map else {
            return false;
        };
        self.index
            .subtree_range(gp_index)
            .is_some_and(|(start, end)| use_map.is_bound_in_patterns(start..=end, variable))
    }

    /// The stable tree rendering used by tests and debugging.
    pub fn pattern_display(&self) -> Option<PatternDisplay<'_>> {
        self.pattern
            .as_ref()
            .map(|root| PatternDisplay::new(root, &self.triples, &self.variables))
    }
}

/// Stamps the innermost enclosing GRAPH origin onto every triple below it,
/// so the executor and the term-role matrix see per-triple graph terms.
/// Origins already present (set through the builder) are kept.
fn stamp_origins(node: &mut GraphPattern, triples: &mut [TriplePattern], current: Option<&Term>) {
    let own = if node.op == GraphPatternOp::Graph {
        node.origin.clone()
    } else {
        None
    };
    let current = own.as_ref().or(current);
    if let Some(slice) = node.triples {
        if let Some(origin) = current {
            for column in slice.columns() {
                if let Some(triple) = triples.get_mut(column) {
                    if triple.origin.is_none() {
                        triple.origin = Some(origin.clone());
                    }
                }
            }
        }
    }
    for child in &mut node.children {
        stamp_origins(child, triples, current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_prepare_algebra::TripleSlice;
    use rdf_prepare_model::NamedNode;

    #[test]
    fn test_empty_where_passes_preparation() {
        let mut query = Query::select();
        query.set_pattern(GraphPattern::group(Vec::new()));
        query.prepare().unwrap();
        assert!(query.is_prepared());
        assert_eq!(query.pattern_count(), 1);
        assert!(query.warnings().is_empty());
    }

    #[test]
    fn test_prepare_twice_is_a_no_op() {
        let mut query = Query::select();
        let s = query.variables_mut().declare_named("s");
        let p = NamedNode::new_unchecked("http://example.com/p");
        let o = query.variables_mut().declare_named("o");
        query.add_triple(TriplePattern::new(s, p, o));
        query.set_pattern(GraphPattern::group(vec![GraphPattern::basic(
            TripleSlice::new(0, 0),
        )]));
        query.prepare().unwrap();
        let rendered = query.pattern_display().map(|d| d.to_string());
        query.prepare().unwrap();
        assert_eq!(query.pattern_display().map(|d| d.to_string()), rendered);
    }

    #[test]
    fn test_origin_stamping() {
        let mut query = Query::select();
        let s = query.variables_mut().declare_named("s");
        let p = NamedNode::new_unchecked("http://example.com/p");
        let o = query.variables_mut().declare_named("o");
        let g = query.variables_mut().declare_named("g");
        query.add_triple(TriplePattern::new(s, p, o));
        query.set_pattern(GraphPattern::group(vec![GraphPattern::graph(
            g,
            vec![GraphPattern::basic(TripleSlice::new(0, 0))],
        )]));
        query.prepare().unwrap();
        assert_eq!(query.triples()[0].origin, Some(Term::Variable(g)));
    }
}
