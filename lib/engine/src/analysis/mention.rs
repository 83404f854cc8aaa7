use crate::analysis::{ReservedRow, RowId, VariableUseMap};
use crate::query::QueryVerb;
use itertools::Itertools;
use rdf_prepare_algebra::{
    Expression, GraphPattern, GraphPatternOp, Projection, SolutionModifier, Term, TriplePattern,
    VariablesTable,
};

/// The first analysis pass: marks every site that textually *mentions* each
/// variable.
///
/// Triples of basic patterns are skipped here; their mention bits are
/// derived from the `Use*` roles during the binding pass, so that a first
/// binding occurrence counts as a bind rather than a mention. Binding sites
/// (`BIND` targets, `VALUES` variables, `GRAPH` origins) are likewise left
/// to the binding pass.
pub(crate) struct MentionPass<'a> {
    pub triples: &'a [TriplePattern],
    pub variables: &'a VariablesTable,
    pub use_map: &'a mut VariableUseMap,
}

impl MentionPass<'_> {
    pub fn run(
        &mut self,
        root: Option<&GraphPattern>,
        verb: &QueryVerb,
        projection: Option<&Projection>,
        modifier: &SolutionModifier,
    ) {
        let verbs = RowId::Reserved(ReservedRow::Verbs);
        match verb {
            QueryVerb::Select => {
                if let Some(projection) = projection {
                    self.mark_projection(verbs, projection);
                }
            }
            QueryVerb::Construct(template) => {
                for triple in template {
                    for variable in triple.variables() {
                        self.use_map.mark_mentioned(verbs, variable);
                    }
                }
            }
            QueryVerb::Describe(terms) => {
                for term in terms {
                    if let Term::Variable(variable) = term {
                        self.use_map.mark_mentioned(verbs, *variable);
                    }
                }
            }
            QueryVerb::Ask => {}
        }

        for condition in &modifier.group_by {
            self.mark_expression(RowId::Reserved(ReservedRow::GroupBy), &condition.expression);
        }
        for expression in &modifier.having {
            self.mark_expression(RowId::Reserved(ReservedRow::Having), expression);
        }
        for condition in &modifier.order_by {
            self.mark_expression(RowId::Reserved(ReservedRow::OrderBy), condition.expression());
        }

        if let Some(root) = root {
            root.walk(&mut |node| self.visit(node));
        }
    }

    fn visit(&mut self, node: &GraphPattern) {
        let Some(gp_index) = node.gp_index else {
            return;
        };
        let row = RowId::Pattern(gp_index);
        if let Some(filter) = &node.filter {
            self.mark_expression(row, filter);
        }
        match node.op {
            GraphPatternOp::Service => {
                if let Some(variable) = node.origin.as_ref().and_then(Term::variable_id) {
                    self.use_map.mark_mentioned(row, variable);
                }
            }
            GraphPatternOp::Let => {
                let variables = self.variables;
                let expression = node
                    .bound_variable
                    .and_then(|variable| variables.get(variable).expression());
                if let Some(expression) = expression {
                    self.mark_expression(row, expression);
                }
            }
            GraphPatternOp::Select => {
                if let Some(projection) = &node.projection {
                    self.mark_projection(row, projection);
                }
                if let Some(modifier) = &node.modifier {
                    for condition in &modifier.group_by {
                        self.mark_expression(row, &condition.expression);
                    }
                    for expression in &modifier.having {
                        self.mark_expression(row, expression);
                    }
                    for condition in &modifier.order_by {
                        self.mark_expression(row, condition.expression());
                    }
                }
            }
            _ => {}
        }
    }

    fn mark_projection(&mut self, row: RowId, projection: &Projection) {
        let variables = self.variables;
        for &variable in &projection.variables {
            self.use_map.mark_mentioned(row, variable);
            if let Some(expression) = variables.get(variable).expression() {
                self.mark_expression(row, expression);
            }
        }
    }

    fn mark_expression(&mut self, row: RowId, expression: &Expression) {
        let mut mentioned = Vec::new();
        expression.collect_variables(self.triples, &mut mentioned);
        for variable in mentioned.into_iter().unique() {
            self.use_map.mark_mentioned(row, variable);
        }
    }
}
