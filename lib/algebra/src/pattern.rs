use crate::{
    Expression, PatternViolation, Projection, SolutionModifier, Term, TriplePattern, TripleSlice,
    ValuesBlock, VariableId,
};

/// The operator of a graph-pattern node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphPatternOp {
    /// A basic graph pattern owning a contiguous slice of the flat triple
    /// array.
    Basic,
    /// A `{ ... }` group joining its children.
    Group,
    /// `OPTIONAL { ... }`.
    Optional,
    /// `{ ... } UNION { ... }`; at least two branches, never merged.
    Union,
    /// `GRAPH <origin> { ... }`.
    Graph,
    /// A `FILTER(expr)` sibling; carries only an expression.
    Filter,
    /// `BIND(expr AS ?v)`; the expression lives on the bound variable.
    Let,
    /// A nested `SELECT`.
    Select,
    /// `SERVICE [SILENT] <endpoint> { ... }`; represented and analyzed but
    /// never rewritten or executed here.
    Service,
    /// `MINUS { ... }`.
    Minus,
    /// An inline `VALUES` block.
    Values,
}

impl GraphPatternOp {
    pub fn label(self) -> &'static str {
        match self {
            GraphPatternOp::Basic => "basic",
            GraphPatternOp::Group => "group",
            GraphPatternOp::Optional => "optional",
            GraphPatternOp::Union => "union",
            GraphPatternOp::Graph => "graph",
            GraphPatternOp::Filter => "filter",
            GraphPatternOp::Let => "bind",
            GraphPatternOp::Select => "select",
            GraphPatternOp::Service => "service",
            GraphPatternOp::Minus => "minus",
            GraphPatternOp::Values => "values",
        }
    }
}

/// A node of the algebraic graph-pattern tree.
///
/// Every node carries the same field set; which payloads must be present is
/// determined by `op` and checked by [validate](GraphPattern::validate).
/// `gp_index` and `scope_group` start out unset and are filled in by the
/// preparation passes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPattern {
    pub op: GraphPatternOp,
    pub children: Vec<GraphPattern>,
    pub triples: Option<TripleSlice>,
    pub filter: Option<Expression>,
    /// The GRAPH origin or SERVICE endpoint.
    pub origin: Option<Term>,
    pub bound_variable: Option<VariableId>,
    pub projection: Option<Projection>,
    pub modifier: Option<SolutionModifier>,
    pub bindings: Option<ValuesBlock>,
    pub silent: bool,
    /// Post-order position, assigned by the indexer.
    pub gp_index: Option<usize>,
    /// For filters: the index of the enclosing group, recorded by the scope
    /// checker.
    pub scope_group: Option<usize>,
}

impl GraphPattern {
    fn empty(op: GraphPatternOp) -> Self {
        Self {
            op,
            children: Vec::new(),
            triples: None,
            filter: None,
            origin: None,
            bound_variable: None,
            projection: None,
            modifier: None,
            bindings: None,
            silent: false,
            gp_index: None,
            scope_group: None,
        }
    }

    pub fn basic(triples: TripleSlice) -> Self {
        Self {
            triples: Some(triples),
            ..Self::empty(GraphPatternOp::Basic)
        }
    }

    pub fn group(children: Vec<GraphPattern>) -> Self {
        Self {
            children,
            ..Self::empty(GraphPatternOp::Group)
        }
    }

    pub fn optional(children: Vec<GraphPattern>) -> Self {
        Self {
            children,
            ..Self::empty(GraphPatternOp::Optional)
        }
    }

    pub fn union(branches: Vec<GraphPattern>) -> Self {
        Self {
            children: branches,
            ..Self::empty(GraphPatternOp::Union)
        }
    }

    pub fn graph(origin: impl Into<Term>, children: Vec<GraphPattern>) -> Self {
        Self {
            origin: Some(origin.into()),
            children,
            ..Self::empty(GraphPatternOp::Graph)
        }
    }

    pub fn filter_of(expression: Expression) -> Self {
        Self {
            filter: Some(expression),
            ..Self::empty(GraphPatternOp::Filter)
        }
    }

    /// A `BIND` node; the bound expression is stored on the variable itself.
    pub fn bind(variable: VariableId) -> Self {
        Self {
            bound_variable: Some(variable),
            ..Self::empty(GraphPatternOp::Let)
        }
    }

    pub fn sub_select(
        projection: Projection,
        modifier: Option<SolutionModifier>,
        children: Vec<GraphPattern>,
    ) -> Self {
        Self {
            projection: Some(projection),
            modifier,
            children,
            ..Self::empty(GraphPatternOp::Select)
        }
    }

    pub fn service(endpoint: impl Into<Term>, silent: bool, children: Vec<GraphPattern>) -> Self {
        Self {
            origin: Some(endpoint.into()),
            silent,
            children,
            ..Self::empty(GraphPatternOp::Service)
        }
    }

    pub fn minus(children: Vec<GraphPattern>) -> Self {
        Self {
            children,
            ..Self::empty(GraphPatternOp::Minus)
        }
    }

    pub fn values(bindings: ValuesBlock) -> Self {
        Self {
            bindings: Some(bindings),
            ..Self::empty(GraphPatternOp::Values)
        }
    }

    /// Checks the per-operator payload invariants for this node alone.
    pub fn validate(&self) -> Result<(), PatternViolation> {
        match self.op {
            GraphPatternOp::Basic => {
                if self.triples.is_none() {
                    return Err(PatternViolation::BasicWithoutTriples);
                }
                if !self.children.is_empty() {
                    return Err(PatternViolation::BasicWithChildren);
                }
            }
            GraphPatternOp::Filter => {
                if self.filter.is_none() {
                    return Err(PatternViolation::FilterWithoutExpression);
                }
                if !self.children.is_empty() {
                    return Err(PatternViolation::FilterWithChildren);
                }
            }
            GraphPatternOp::Union => {
                if self.children.len() < 2 {
                    return Err(PatternViolation::DegenerateUnion);
                }
            }
            GraphPatternOp::Graph | GraphPatternOp::Service => {
                if self.origin.is_none() {
                    return Err(PatternViolation::MissingOrigin);
                }
            }
            GraphPatternOp::Let => {
                if self.bound_variable.is_none() {
                    return Err(PatternViolation::MissingBoundVariable);
                }
            }
            GraphPatternOp::Select => {
                if self.projection.is_none() {
                    return Err(PatternViolation::MissingProjection);
                }
            }
            GraphPatternOp::Values => match &self.bindings {
                None => return Err(PatternViolation::MissingBindings),
                Some(bindings) => bindings.validate()?,
            },
            GraphPatternOp::Group | GraphPatternOp::Optional | GraphPatternOp::Minus => {}
        }
        if self.op != GraphPatternOp::Basic && self.triples.is_some() {
            return Err(PatternViolation::TriplesOutsideBasic);
        }
        Ok(())
    }

    /// Validates this node and every descendant.
    pub fn validate_deep(&self) -> Result<(), PatternViolation> {
        self.validate()?;
        for child in &self.children {
            child.validate_deep()?;
        }
        Ok(())
    }

    /// ANDs an expression onto the node's filter.
    pub fn and_filter(&mut self, expression: Expression) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_also(expression),
            None => expression,
        });
    }

    /// Post-order walk.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a GraphPattern)) {
        for child in &self.children {
            child.walk(f);
        }
        f(self);
    }

    /// Post-order walk with mutation. `f` sees each node after its children.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut GraphPattern)) {
        for child in &mut self.children {
            child.walk_mut(f);
        }
        f(self);
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Collects every variable the subtree textually mentions: triple terms,
    /// origins, filter expressions, bound variables, projections, VALUES
    /// variables and modifier expressions. This is the mention-only view
    /// used for `EXISTS` bodies.
    pub fn collect_mentions(&self, triples: &[TriplePattern], out: &mut Vec<VariableId>) {
        self.walk(&mut |node| {
            if let Some(slice) = node.triples {
                for column in slice.columns() {
                    if let Some(triple) = triples.get(column) {
                        out.extend(triple.variables());
                    }
                }
            }
            if let Some(id) = node.origin.as_ref().and_then(Term::variable_id) {
                out.push(id);
            }
            if let Some(filter) = &node.filter {
                filter.collect_variables(triples, out);
            }
            if let Some(id) = node.bound_variable {
                out.push(id);
            }
            if let Some(projection) = &node.projection {
                out.extend(projection.variables.iter().copied());
            }
            if let Some(bindings) = &node.bindings {
                out.extend(bindings.variables.iter().copied());
            }
            if let Some(modifier) = &node.modifier {
                for condition in &modifier.group_by {
                    condition.expression.collect_variables(triples, out);
                    out.extend(condition.alias);
                }
                for expression in &modifier.having {
                    expression.collect_variables(triples, out);
                }
                for condition in &modifier.order_by {
                    condition.expression().collect_variables(triples, out);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_catches_missing_payloads() {
        let mut basic = GraphPattern::basic(TripleSlice::new(0, 0));
        assert_eq!(basic.validate(), Ok(()));
        basic.children.push(GraphPattern::group(Vec::new()));
        assert_eq!(basic.validate(), Err(PatternViolation::BasicWithChildren));

        let union = GraphPattern::union(vec![GraphPattern::group(Vec::new())]);
        assert_eq!(union.validate(), Err(PatternViolation::DegenerateUnion));
    }

    #[test]
    fn test_and_filter_stacks() {
        let mut group = GraphPattern::group(Vec::new());
        group.and_filter(Expression::true_literal());
        group.and_filter(Expression::false_literal());
        assert_eq!(
            group.filter,
            Some(Expression::true_literal().and_also(Expression::false_literal()))
        );
    }

    #[test]
    fn test_walk_is_post_order() {
        let tree = GraphPattern::group(vec![
            GraphPattern::basic(TripleSlice::new(0, 0)),
            GraphPattern::group(vec![GraphPattern::basic(TripleSlice::new(1, 1))]),
        ]);
        let mut ops = Vec::new();
        tree.walk(&mut |node| ops.push(node.op));
        assert_eq!(
            ops,
            [
                GraphPatternOp::Basic,
                GraphPatternOp::Basic,
                GraphPatternOp::Group,
                GraphPatternOp::Group,
            ]
        );
    }
}
