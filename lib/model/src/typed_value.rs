use crate::{
    is_integer_datatype, Boolean, Decimal, Double, Float, Integer, Numeric, ThinError, ThinResult,
};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode};
use std::cmp::Ordering;
use std::str::FromStr;

/// The evaluated form of a constant term.
///
/// Literals whose datatype the evaluator understands are decoded into native
/// values; everything else is kept as an opaque [Literal] that only supports
/// term equality. There is deliberately no variant for blank nodes: by the
/// time expressions are evaluated, blank nodes have been lifted to variables
/// and variables are never constant.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    NamedNode(NamedNode),
    Boolean(Boolean),
    Numeric(Numeric),
    /// A simple literal or a literal of type `xsd:string`.
    SimpleLiteral(String),
    LanguageString {
        value: String,
        language: String,
    },
    OtherLiteral(Literal),
}

impl TypedValue {
    /// Decodes a literal into its typed value.
    pub fn from_literal(literal: &Literal) -> Self {
        if literal.language().is_some() {
            return TypedValue::LanguageString {
                value: literal.value().to_owned(),
                language: literal.language().unwrap_or_default().to_owned(),
            };
        }
        let datatype = literal.datatype();
        let decoded = if datatype == xsd::STRING {
            Some(TypedValue::SimpleLiteral(literal.value().to_owned()))
        } else if datatype == xsd::BOOLEAN {
            Boolean::from_str(literal.value())
                .ok()
                .map(TypedValue::Boolean)
        } else if is_integer_datatype(datatype) {
            Integer::from_str(literal.value())
                .ok()
                .map(|value| TypedValue::Numeric(value.into()))
        } else if datatype == xsd::DECIMAL {
            Decimal::from_str(literal.value())
                .ok()
                .map(|value| TypedValue::Numeric(value.into()))
        } else if datatype == xsd::FLOAT {
            Float::from_str(literal.value())
                .ok()
                .map(|value| TypedValue::Numeric(value.into()))
        } else if datatype == xsd::DOUBLE {
            Double::from_str(literal.value())
                .ok()
                .map(|value| TypedValue::Numeric(value.into()))
        } else {
            None
        };
        decoded.unwrap_or_else(|| TypedValue::OtherLiteral(literal.clone()))
    }

    /// Re-encodes the value as a literal; `None` for named nodes.
    pub fn to_literal(&self) -> Option<Literal> {
        match self {
            TypedValue::NamedNode(_) => None,
            TypedValue::Boolean(value) => Some(Literal::from(value.as_bool())),
            TypedValue::Numeric(Numeric::Integer(value)) => Some(Literal::from(value.as_i64())),
            TypedValue::Numeric(Numeric::Decimal(value)) => Some(Literal::new_typed_literal(
                value.to_string(),
                xsd::DECIMAL,
            )),
            TypedValue::Numeric(Numeric::Float(value)) => Some(Literal::from(value.to_f32())),
            TypedValue::Numeric(Numeric::Double(value)) => Some(Literal::from(value.to_f64())),
            TypedValue::SimpleLiteral(value) => Some(Literal::new_simple_literal(value.clone())),
            TypedValue::LanguageString { value, language } => Some(
                Literal::new_language_tagged_literal_unchecked(value.clone(), language.clone()),
            ),
            TypedValue::OtherLiteral(literal) => Some(literal.clone()),
        }
    }

    /// [Effective boolean value](https://www.w3.org/TR/sparql11-query/#ebv).
    pub fn effective_boolean_value(&self) -> ThinResult<bool> {
        match self {
            TypedValue::Boolean(value) => Ok(value.as_bool()),
            TypedValue::Numeric(value) => Ok(!value.is_zero_or_nan()),
            TypedValue::SimpleLiteral(value) | TypedValue::LanguageString { value, .. } => {
                Ok(!value.is_empty())
            }
            TypedValue::NamedNode(_) | TypedValue::OtherLiteral(_) => ThinError::expected(),
        }
    }

    /// SPARQL `=` on two constant values.
    ///
    /// Falls back to term equality for named nodes, uses value equality for
    /// decoded literals, and reports an expected error for pairs the
    /// evaluator cannot decide (which leaves the expression unfolded).
    pub fn checked_eq(&self, other: &Self) -> ThinResult<bool> {
        use TypedValue::*;
        match (self, other) {
            (NamedNode(lhs), NamedNode(rhs)) => Ok(lhs == rhs),
            (NamedNode(_), _) | (_, NamedNode(_)) => Ok(false),
            (Boolean(lhs), Boolean(rhs)) => Ok(lhs == rhs),
            (Numeric(lhs), Numeric(rhs)) => Ok(lhs.eq_value(*rhs)),
            (SimpleLiteral(lhs), SimpleLiteral(rhs)) => Ok(lhs == rhs),
            (
                LanguageString {
                    value: lv,
                    language: ll,
                },
                LanguageString {
                    value: rv,
                    language: rl,
                },
            ) => Ok(lv == rv && ll == rl),
            (OtherLiteral(lhs), OtherLiteral(rhs)) if lhs == rhs => Ok(true),
            _ => ThinError::expected(),
        }
    }

    /// SPARQL `<`/`<=`/`>`/`>=` on two constant values.
    pub fn checked_cmp(&self, other: &Self) -> ThinResult<Ordering> {
        use TypedValue::*;
        match (self, other) {
            (Boolean(lhs), Boolean(rhs)) => Ok(lhs.cmp(rhs)),
            (Numeric(lhs), Numeric(rhs)) => {
                lhs.partial_cmp_value(*rhs).ok_or(ThinError::default())
            }
            (SimpleLiteral(lhs), SimpleLiteral(rhs)) => Ok(lhs.cmp(rhs)),
            _ => ThinError::expected(),
        }
    }

    /// The string form used by `STR()` and the string builtins.
    pub fn string_value(&self) -> ThinResult<String> {
        match self {
            TypedValue::NamedNode(node) => Ok(node.as_str().to_owned()),
            TypedValue::Boolean(value) => Ok(value.to_string()),
            TypedValue::Numeric(value) => Ok(value.to_string()),
            TypedValue::SimpleLiteral(value) | TypedValue::LanguageString { value, .. } => {
                Ok(value.clone())
            }
            TypedValue::OtherLiteral(literal) => Ok(literal.value().to_owned()),
        }
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Boolean(value.into())
    }
}

impl From<Numeric> for TypedValue {
    fn from(value: Numeric) -> Self {
        TypedValue::Numeric(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_plain_literals() {
        let value = TypedValue::from_literal(&Literal::from(42_i64));
        assert_eq!(value, TypedValue::Numeric(Integer::from(42).into()));

        let value = TypedValue::from_literal(&Literal::new_simple_literal("hi"));
        assert_eq!(value, TypedValue::SimpleLiteral("hi".to_owned()));
    }

    #[test]
    fn test_unknown_datatype_is_opaque() {
        let literal =
            Literal::new_typed_literal("P1Y", NamedNode::new_unchecked("http://example.com/dt"));
        let value = TypedValue::from_literal(&literal);
        assert_eq!(value, TypedValue::OtherLiteral(literal.clone()));
        assert!(value.effective_boolean_value().is_err());
        assert_eq!(value.checked_eq(&TypedValue::OtherLiteral(literal)), Ok(true));
    }

    #[test]
    fn test_ebv() {
        assert_eq!(TypedValue::from(true).effective_boolean_value(), Ok(true));
        assert_eq!(
            TypedValue::SimpleLiteral(String::new()).effective_boolean_value(),
            Ok(false)
        );
        assert_eq!(
            TypedValue::Numeric(Integer::from(0).into()).effective_boolean_value(),
            Ok(false)
        );
    }

    #[test]
    fn test_numeric_eq_across_types() {
        let lhs = TypedValue::from_literal(&Literal::from(2_i64));
        let rhs = TypedValue::from_literal(&Literal::from(2.0_f64));
        assert_eq!(lhs.checked_eq(&rhs), Ok(true));
    }

    #[test]
    fn test_round_trip_decimal() {
        let literal = Literal::new_typed_literal("1.50", xsd::DECIMAL);
        let value = TypedValue::from_literal(&literal);
        assert_eq!(
            value.to_literal(),
            Some(Literal::new_typed_literal("1.5", xsd::DECIMAL))
        );
    }
}
