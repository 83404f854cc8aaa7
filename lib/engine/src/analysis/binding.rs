use crate::analysis::{ReservedRow, RowId, TermRoleMap, VarSet, VariableUseMap};
use rdf_prepare_algebra::{
    GraphPattern, GraphPatternOp, Projection, SolutionModifier, Term, TermPosition, TriplePattern,
    ValuesBlock, VariablesTable,
};

/// The second analysis pass: walks the tree top-down with a scope bitset,
/// decides for every variable occurrence whether it binds or constrains, and
/// fills both the `BoundHere` bits of the use map and the term-role matrix.
///
/// The first textual binding occurrence wins; this is what the executor
/// relies on to decide which triple introduces a variable versus which uses
/// it as a probe.
pub(crate) struct BindingPass<'a> {
    pub triples: &'a [TriplePattern],
    pub variables: &'a VariablesTable,
    pub use_map: &'a mut VariableUseMap,
    pub roles: &'a mut TermRoleMap,
    pub width: usize,
}

impl BindingPass<'_> {
    pub fn run(
        &mut self,
        root: Option<&GraphPattern>,
        projection: Option<&Projection>,
        modifier: &SolutionModifier,
        values: Option<&ValuesBlock>,
    ) {
        let mut scope = VarSet::new(self.width);
        if let Some(root) = root {
            self.visit(root, &mut scope);
        }

        // Query-level binding slots, filled after the pattern walk: a
        // projection `(expr AS ?v)` binds at the verb slot, a GROUP BY alias
        // at its slot, and the trailing VALUES clause binds its variables.
        if let Some(projection) = projection {
            let variables = self.variables;
            for &variable in &projection.variables {
                if variables.get(variable).expression().is_some() {
                    self.use_map
                        .mark_bound(RowId::Reserved(ReservedRow::Verbs), variable);
                }
            }
        }
        for condition in &modifier.group_by {
            if let Some(alias) = condition.alias {
                self.use_map
                    .mark_bound(RowId::Reserved(ReservedRow::GroupBy), alias);
            }
        }
        if let Some(values) = values {
            for &variable in &values.variables {
                self.use_map
                    .mark_bound(RowId::Reserved(ReservedRow::Values), variable);
            }
        }
    }

    fn visit(&mut self, node: &GraphPattern, scope: &mut VarSet) {
        let Some(gp_index) = node.gp_index else {
            return;
        };
        let row = RowId::Pattern(gp_index);
        match node.op {
            GraphPatternOp::Basic => self.visit_basic(node, row, scope),
            GraphPatternOp::Graph => {
                // An unbound origin variable is introduced by the GRAPH
                // pattern itself; a bound one constrains it.
                if let Some(variable) = node.origin.as_ref().and_then(Term::variable_id) {
                    if scope.contains(variable) {
                        self.use_map.mark_mentioned(row, variable);
                    } else {
                        self.use_map.mark_bound(row, variable);
                        scope.insert(variable);
                    }
                }
                self.visit_children_in_order(node, scope);
            }
            GraphPatternOp::Let => {
                if let Some(variable) = node.bound_variable {
                    self.use_map.mark_bound(row, variable);
                    scope.insert(variable);
                }
            }
            GraphPatternOp::Select => {
                // Sub-select variables are isolated; only the projected ones
                // surface, already bound, in the outer scope.
                let mut inner = VarSet::new(self.width);
                self.visit_children_in_order(node, &mut inner);
                // Variables the sub-select computes itself bind at its row.
                if let Some(modifier) = &node.modifier {
                    for condition in &modifier.group_by {
                        if let Some(alias) = condition.alias {
                            self.use_map.mark_bound(row, alias);
                        }
                    }
                }
                if let Some(projection) = &node.projection {
                    let variables = self.variables;
                    for &variable in &projection.variables {
                        if variables.get(variable).expression().is_some() {
                            self.use_map.mark_bound(row, variable);
                        }
                        scope.insert(variable);
                    }
                }
            }
            GraphPatternOp::Union => {
                // Union branches are isolated from their siblings and do not
                // leak bindings upwards.
                for child in &node.children {
                    let mut branch = scope.clone();
                    self.visit(child, &mut branch);
                }
            }
            GraphPatternOp::Group | GraphPatternOp::Optional => {
                self.visit_children_in_order(node, scope);
            }
            GraphPatternOp::Values => {
                if let Some(bindings) = &node.bindings {
                    for &variable in &bindings.variables {
                        self.use_map.mark_bound(row, variable);
                        scope.insert(variable);
                    }
                }
            }
            GraphPatternOp::Filter => {}
            GraphPatternOp::Service | GraphPatternOp::Minus => {
                // Walked for their own rows, but bindings stay inside.
                for child in &node.children {
                    let mut branch = scope.clone();
                    self.visit(child, &mut branch);
                }
            }
        }
    }

    /// Children of a joining pattern are evaluated left to right by a
    /// nested-loop engine, so the scope flows through them in order; the
    /// scope left behind is the union of every child's bindings.
    fn visit_children_in_order(&mut self, node: &GraphPattern, scope: &mut VarSet) {
        for child in &node.children {
            self.visit(child, scope);
        }
    }

    fn visit_basic(&mut self, node: &GraphPattern, row: RowId, scope: &mut VarSet) {
        let Some(slice) = node.triples else {
            return;
        };
        for column in slice.columns() {
            let Some(triple) = self.triples.get(column) else {
                continue;
            };
            for position in TermPosition::ALL {
                let Some(Term::Variable(variable)) = triple.term(position) else {
                    continue;
                };
                if scope.contains(*variable) {
                    self.roles.mark_use(column, *variable, position);
                    // A basic pattern mentions a variable iff some triple of
                    // its slice uses it; a first binding is not a mention.
                    self.use_map.mark_mentioned(row, *variable);
                } else {
                    self.roles.mark_bound(column, *variable, position);
                    self.use_map.mark_bound(row, *variable);
                    scope.insert(*variable);
                }
            }
        }
    }
}
