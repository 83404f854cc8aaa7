use crate::{
    Expression, GraphPattern, GraphPatternOp, OrderCondition, Term, TriplePattern, VariableId,
    VariablesTable,
};
use itertools::Itertools;
use std::fmt;

/// A stable, indented rendering of a graph-pattern tree.
///
/// One line per node (`op`, post-order index when assigned, payload
/// summary), children indented below, the triples of a basic pattern listed
/// under it. The format is what the snapshot tests assert against, so keep
/// changes deliberate.
pub struct PatternDisplay<'a> {
    pattern: &'a GraphPattern,
    triples: &'a [TriplePattern],
    variables: &'a VariablesTable,
}

impl<'a> PatternDisplay<'a> {
    pub fn new(
        pattern: &'a GraphPattern,
        triples: &'a [TriplePattern],
        variables: &'a VariablesTable,
    ) -> Self {
        Self {
            pattern,
            triples,
            variables,
        }
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &GraphPattern,
        indent: usize,
    ) -> fmt::Result {
        write!(f, "{:indent$}{}", "", node.op.label(), indent = indent)?;
        if let Some(index) = node.gp_index {
            write!(f, "#{index}")?;
        }
        match node.op {
            GraphPatternOp::Basic => {
                if let Some(slice) = node.triples {
                    write!(f, " [{}..{}]", slice.start, slice.end)?;
                }
            }
            GraphPatternOp::Graph | GraphPatternOp::Service => {
                if let Some(origin) = &node.origin {
                    write!(f, " {}", TermDisplay::new(origin, self.variables))?;
                }
                if node.silent {
                    write!(f, " silent")?;
                }
            }
            GraphPatternOp::Let => {
                if let Some(id) = node.bound_variable {
                    write!(f, " ({} := ", VarDisplay::new(id, self.variables))?;
                    match self
                        .variables
                        .try_get(id)
                        .and_then(|variable| variable.expression())
                    {
                        Some(expression) => {
                            write!(f, "{})", ExpressionDisplay::new(expression, self.variables))?;
                        }
                        None => write!(f, "?)")?,
                    }
                }
            }
            GraphPatternOp::Select => {
                if let Some(projection) = &node.projection {
                    if projection.wildcard {
                        write!(f, " *")?;
                    } else {
                        write!(
                            f,
                            " ({})",
                            projection
                                .variables
                                .iter()
                                .map(|id| VarDisplay::new(*id, self.variables))
                                .format(" ")
                        )?;
                    }
                }
            }
            GraphPatternOp::Values => {
                if let Some(bindings) = &node.bindings {
                    write!(
                        f,
                        " ({}) rows={}",
                        bindings
                            .variables
                            .iter()
                            .map(|id| VarDisplay::new(*id, self.variables))
                            .format(" "),
                        bindings.rows.len()
                    )?;
                }
            }
            _ => {}
        }
        if let Some(filter) = &node.filter {
            write!(f, " filter={}", ExpressionDisplay::new(filter, self.variables))?;
        }
        writeln!(f)?;
        if let Some(slice) = node.triples {
            for column in slice.columns() {
                if let Some(triple) = self.triples.get(column) {
                    writeln!(
                        f,
                        "{:indent$}{}",
                        "",
                        TripleDisplay::new(triple, self.variables),
                        indent = indent + 2
                    )?;
                }
            }
        }
        for child in &node.children {
            self.fmt_node(f, child, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for PatternDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.pattern, 0)
    }
}

/// Renders a variable as `?name`.
pub struct VarDisplay<'a> {
    id: VariableId,
    variables: &'a VariablesTable,
}

impl<'a> VarDisplay<'a> {
    pub fn new(id: VariableId, variables: &'a VariablesTable) -> Self {
        Self { id, variables }
    }
}

impl fmt::Display for VarDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variables.try_get(self.id) {
            Some(variable) => write!(f, "?{}", variable.name()),
            None => write!(f, "?{}", self.id),
        }
    }
}

/// Renders a pattern term.
pub struct TermDisplay<'a> {
    term: &'a Term,
    variables: &'a VariablesTable,
}

impl<'a> TermDisplay<'a> {
    pub fn new(term: &'a Term, variables: &'a VariablesTable) -> Self {
        Self { term, variables }
    }
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::NamedNode(node) => write!(f, "{node}"),
            Term::QName(qname) => write!(f, "{qname}"),
            Term::BlankNode(label) => write!(f, "_:{label}"),
            Term::Literal(literal) => write!(f, "{literal}"),
            Term::Variable(id) => write!(f, "{}", VarDisplay::new(*id, self.variables)),
        }
    }
}

/// Renders one triple pattern.
pub struct TripleDisplay<'a> {
    triple: &'a TriplePattern,
    variables: &'a VariablesTable,
}

impl<'a> TripleDisplay<'a> {
    pub fn new(triple: &'a TriplePattern, variables: &'a VariablesTable) -> Self {
        Self { triple, variables }
    }
}

impl fmt::Display for TripleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            TermDisplay::new(&self.triple.subject, self.variables),
            TermDisplay::new(&self.triple.predicate, self.variables),
            TermDisplay::new(&self.triple.object, self.variables),
        )?;
        if let Some(origin) = &self.triple.origin {
            write!(f, " origin={}", TermDisplay::new(origin, self.variables))?;
        }
        Ok(())
    }
}

/// Renders an expression in a compact infix form.
pub struct ExpressionDisplay<'a> {
    expression: &'a Expression,
    variables: &'a VariablesTable,
}

impl<'a> ExpressionDisplay<'a> {
    pub fn new(expression: &'a Expression, variables: &'a VariablesTable) -> Self {
        Self {
            expression,
            variables,
        }
    }

    fn nested(&self, expression: &'a Expression) -> ExpressionDisplay<'a> {
        ExpressionDisplay {
            expression,
            variables: self.variables,
        }
    }

    fn fmt_binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        op: &str,
        lhs: &'a Expression,
        rhs: &'a Expression,
    ) -> fmt::Result {
        write!(f, "({} {op} {})", self.nested(lhs), self.nested(rhs))
    }

    fn fmt_call(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        args: impl Iterator<Item = &'a Expression>,
    ) -> fmt::Result {
        write!(
            f,
            "{name}({})",
            args.map(|arg| self.nested(arg)).format(", ")
        )
    }
}

impl fmt::Display for ExpressionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expression {
            Expression::NamedNode(node) => write!(f, "{node}"),
            Expression::QName(qname) => write!(f, "{qname}"),
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Variable(id) => write!(f, "{}", VarDisplay::new(*id, self.variables)),
            Expression::Or(lhs, rhs) => self.fmt_binary(f, "||", lhs, rhs),
            Expression::And(lhs, rhs) => self.fmt_binary(f, "&&", lhs, rhs),
            Expression::Equal(lhs, rhs) => self.fmt_binary(f, "=", lhs, rhs),
            Expression::SameTerm(lhs, rhs) => {
                self.fmt_call(f, "SAMETERM", [lhs.as_ref(), rhs.as_ref()].into_iter())
            }
            Expression::Greater(lhs, rhs) => self.fmt_binary(f, ">", lhs, rhs),
            Expression::GreaterOrEqual(lhs, rhs) => self.fmt_binary(f, ">=", lhs, rhs),
            Expression::Less(lhs, rhs) => self.fmt_binary(f, "<", lhs, rhs),
            Expression::LessOrEqual(lhs, rhs) => self.fmt_binary(f, "<=", lhs, rhs),
            Expression::In(lhs, rhs) => {
                write!(
                    f,
                    "({} IN ({}))",
                    self.nested(lhs),
                    rhs.iter().map(|arg| self.nested(arg)).format(", ")
                )
            }
            Expression::Add(lhs, rhs) => self.fmt_binary(f, "+", lhs, rhs),
            Expression::Subtract(lhs, rhs) => self.fmt_binary(f, "-", lhs, rhs),
            Expression::Multiply(lhs, rhs) => self.fmt_binary(f, "*", lhs, rhs),
            Expression::Divide(lhs, rhs) => self.fmt_binary(f, "/", lhs, rhs),
            Expression::UnaryPlus(inner) => write!(f, "+({})", self.nested(inner)),
            Expression::UnaryMinus(inner) => write!(f, "-({})", self.nested(inner)),
            Expression::Not(inner) => write!(f, "!({})", self.nested(inner)),
            Expression::Exists(_) => write!(f, "EXISTS {{...}}"),
            Expression::Bound(id) => {
                write!(f, "BOUND({})", VarDisplay::new(*id, self.variables))
            }
            Expression::If(test, if_true, if_false) => self.fmt_call(
                f,
                "IF",
                [test.as_ref(), if_true.as_ref(), if_false.as_ref()].into_iter(),
            ),
            Expression::Coalesce(args) => self.fmt_call(f, "COALESCE", args.iter()),
            Expression::FunctionCall(function, args) => {
                self.fmt_call(f, function.name(), args.iter())
            }
            Expression::Aggregate(aggregate) => {
                write!(f, "{}(", aggregate.function.name())?;
                if aggregate.distinct {
                    write!(f, "DISTINCT ")?;
                }
                match &aggregate.expression {
                    Some(expression) => write!(f, "{}", self.nested(expression))?,
                    None => write!(f, "*")?,
                }
                write!(f, ")")
            }
        }
    }
}

/// Renders an `ORDER BY` condition.
pub struct OrderDisplay<'a> {
    condition: &'a OrderCondition,
    variables: &'a VariablesTable,
}

impl<'a> OrderDisplay<'a> {
    pub fn new(condition: &'a OrderCondition, variables: &'a VariablesTable) -> Self {
        Self {
            condition,
            variables,
        }
    }
}

impl fmt::Display for OrderDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.condition {
            OrderCondition::Asc(inner) => {
                write!(f, "ASC({})", ExpressionDisplay::new(inner, self.variables))
            }
            OrderCondition::Desc(inner) => {
                write!(f, "DESC({})", ExpressionDisplay::new(inner, self.variables))
            }
        }
    }
}
