use crate::{GraphPattern, TriplePattern, VariableId};
use rdf_prepare_model::{Literal, NamedNode};

/// A SPARQL expression.
///
/// A closed sum over the SPARQL 1.1 expression grammar. Traversal is by the
/// [children](Expression::children) accessors plus a handful of named walks;
/// the constant folder and the qname expander live in the engine crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    NamedNode(NamedNode),
    /// An unresolved `prefix:local` qualified name; removed by rewriting.
    QName(String),
    Literal(Literal),
    Variable(VariableId),
    Or(Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    SameTerm(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    GreaterOrEqual(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    LessOrEqual(Box<Expression>, Box<Expression>),
    In(Box<Expression>, Vec<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    UnaryPlus(Box<Expression>),
    UnaryMinus(Box<Expression>),
    Not(Box<Expression>),
    /// `EXISTS`/`NOT EXISTS` (the latter as `Not(Exists(..))`). The inner
    /// pattern only *mentions* its variables; it is never indexed, bound or
    /// structurally rewritten.
    Exists(Box<GraphPattern>),
    Bound(VariableId),
    If(Box<Expression>, Box<Expression>, Box<Expression>),
    Coalesce(Vec<Expression>),
    FunctionCall(Function, Vec<Expression>),
    Aggregate(Box<AggregateExpression>),
}

impl Expression {
    pub fn and_also(self, other: Expression) -> Expression {
        Expression::And(Box::new(self), Box::new(other))
    }

    pub fn true_literal() -> Expression {
        Expression::Literal(Literal::from(true))
    }

    pub fn false_literal() -> Expression {
        Expression::Literal(Literal::from(false))
    }

    /// The direct subexpressions, in evaluation order. `Exists` has none:
    /// its payload is a graph pattern, not an expression.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::NamedNode(_)
            | Expression::QName(_)
            | Expression::Literal(_)
            | Expression::Variable(_)
            | Expression::Bound(_)
            | Expression::Exists(_) => Vec::new(),
            Expression::Or(lhs, rhs)
            | Expression::And(lhs, rhs)
            | Expression::Equal(lhs, rhs)
            | Expression::SameTerm(lhs, rhs)
            | Expression::Greater(lhs, rhs)
            | Expression::GreaterOrEqual(lhs, rhs)
            | Expression::Less(lhs, rhs)
            | Expression::LessOrEqual(lhs, rhs)
            | Expression::Add(lhs, rhs)
            | Expression::Subtract(lhs, rhs)
            | Expression::Multiply(lhs, rhs)
            | Expression::Divide(lhs, rhs) => vec![lhs, rhs],
            Expression::UnaryPlus(inner)
            | Expression::UnaryMinus(inner)
            | Expression::Not(inner) => vec![inner],
            Expression::In(lhs, rhs) => {
                let mut children = vec![lhs.as_ref()];
                children.extend(rhs.iter());
                children
            }
            Expression::If(test, if_true, if_false) => vec![test, if_true, if_false],
            Expression::Coalesce(args) => args.iter().collect(),
            Expression::FunctionCall(_, args) => args.iter().collect(),
            Expression::Aggregate(aggregate) => {
                aggregate.expression.iter().collect()
            }
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Expression::NamedNode(_)
            | Expression::QName(_)
            | Expression::Literal(_)
            | Expression::Variable(_)
            | Expression::Bound(_)
            | Expression::Exists(_) => Vec::new(),
            Expression::Or(lhs, rhs)
            | Expression::And(lhs, rhs)
            | Expression::Equal(lhs, rhs)
            | Expression::SameTerm(lhs, rhs)
            | Expression::Greater(lhs, rhs)
            | Expression::GreaterOrEqual(lhs, rhs)
            | Expression::Less(lhs, rhs)
            | Expression::LessOrEqual(lhs, rhs)
            | Expression::Add(lhs, rhs)
            | Expression::Subtract(lhs, rhs)
            | Expression::Multiply(lhs, rhs)
            | Expression::Divide(lhs, rhs) => vec![lhs, rhs],
            Expression::UnaryPlus(inner)
            | Expression::UnaryMinus(inner)
            | Expression::Not(inner) => vec![inner],
            Expression::In(lhs, rhs) => {
                let mut children = vec![lhs.as_mut()];
                children.extend(rhs.iter_mut());
                children
            }
            Expression::If(test, if_true, if_false) => vec![test, if_true, if_false],
            Expression::Coalesce(args) => args.iter_mut().collect(),
            Expression::FunctionCall(_, args) => args.iter_mut().collect(),
            Expression::Aggregate(aggregate) => {
                aggregate.expression.iter_mut().collect()
            }
        }
    }

    /// Pre-order walk over the expression tree. Does not descend into
    /// `Exists` patterns.
    pub fn walk(&self, f: &mut impl FnMut(&Expression)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Collects every variable this expression mentions, in textual order
    /// and with duplicates. `Exists` patterns contribute the variables
    /// mentioned anywhere in their body; `triples` is the query's flat
    /// triple array the body's slices point into.
    pub fn collect_variables(&self, triples: &[TriplePattern], out: &mut Vec<VariableId>) {
        match self {
            Expression::Variable(id) | Expression::Bound(id) => out.push(*id),
            Expression::Exists(pattern) => pattern.collect_mentions(triples, out),
            _ => {
                for child in self.children() {
                    child.collect_variables(triples, out);
                }
            }
        }
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl From<NamedNode> for Expression {
    fn from(node: NamedNode) -> Self {
        Expression::NamedNode(node)
    }
}

impl From<VariableId> for Expression {
    fn from(id: VariableId) -> Self {
        Expression::Variable(id)
    }
}

/// The SPARQL 1.1 builtin function set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Str,
    Lang,
    LangMatches,
    Datatype,
    Iri,
    BNode,
    Rand,
    Abs,
    Ceil,
    Floor,
    Round,
    Concat,
    SubStr,
    StrLen,
    Replace,
    UCase,
    LCase,
    EncodeForUri,
    Contains,
    StrStarts,
    StrEnds,
    StrBefore,
    StrAfter,
    Year,
    Month,
    Day,
    Hours,
    Minutes,
    Seconds,
    Timezone,
    Tz,
    Now,
    Uuid,
    StrUuid,
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    StrLang,
    StrDt,
    SameTerm,
    IsIri,
    IsBlank,
    IsLiteral,
    IsNumeric,
    Regex,
    Custom(NamedNode),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Str => "STR",
            Function::Lang => "LANG",
            Function::LangMatches => "LANGMATCHES",
            Function::Datatype => "DATATYPE",
            Function::Iri => "IRI",
            Function::BNode => "BNODE",
            Function::Rand => "RAND",
            Function::Abs => "ABS",
            Function::Ceil => "CEIL",
            Function::Floor => "FLOOR",
            Function::Round => "ROUND",
            Function::Concat => "CONCAT",
            Function::SubStr => "SUBSTR",
            Function::StrLen => "STRLEN",
            Function::Replace => "REPLACE",
            Function::UCase => "UCASE",
            Function::LCase => "LCASE",
            Function::EncodeForUri => "ENCODE_FOR_URI",
            Function::Contains => "CONTAINS",
            Function::StrStarts => "STRSTARTS",
            Function::StrEnds => "STRENDS",
            Function::StrBefore => "STRBEFORE",
            Function::StrAfter => "STRAFTER",
            Function::Year => "YEAR",
            Function::Month => "MONTH",
            Function::Day => "DAY",
            Function::Hours => "HOURS",
            Function::Minutes => "MINUTES",
            Function::Seconds => "SECONDS",
            Function::Timezone => "TIMEZONE",
            Function::Tz => "TZ",
            Function::Now => "NOW",
            Function::Uuid => "UUID",
            Function::StrUuid => "STRUUID",
            Function::Md5 => "MD5",
            Function::Sha1 => "SHA1",
            Function::Sha256 => "SHA256",
            Function::Sha384 => "SHA384",
            Function::Sha512 => "SHA512",
            Function::StrLang => "STRLANG",
            Function::StrDt => "STRDT",
            Function::SameTerm => "SAMETERM",
            Function::IsIri => "ISIRI",
            Function::IsBlank => "ISBLANK",
            Function::IsLiteral => "ISLITERAL",
            Function::IsNumeric => "ISNUMERIC",
            Function::Regex => "REGEX",
            Function::Custom(node) => node.as_str(),
        }
    }
}

/// An aggregate term (`COUNT`, `SUM`, ... within SELECT/HAVING/ORDER BY).
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpression {
    pub function: AggregateFunction,
    /// `None` for `COUNT(*)`.
    pub expression: Option<Expression>,
    pub distinct: bool,
    /// `GROUP_CONCAT` separator.
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Sample,
    GroupConcat,
}

impl AggregateFunction {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Sample => "SAMPLE",
            AggregateFunction::GroupConcat => "GROUP_CONCAT",
        }
    }
}
