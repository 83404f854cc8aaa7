use rdf_prepare_algebra::{Expression, Function};
use rdf_prepare_model::{Integer, Numeric, ThinError, ThinResult, TypedValue};
use std::cmp::Ordering;

/// Evaluates a constant expression to a value.
///
/// Any failure here is *expected*: it only means the subexpression cannot be
/// folded and stays in the tree verbatim, so error behavior at runtime is
/// preserved. Variables, `BOUND`, `EXISTS`, aggregates and the
/// non-deterministic builtins are never evaluable.
pub(crate) fn evaluate_constant(expression: &Expression) -> ThinResult<TypedValue> {
    match expression {
        Expression::Literal(literal) => Ok(TypedValue::from_literal(literal)),
        Expression::NamedNode(node) => Ok(TypedValue::NamedNode(node.clone())),
        // SPARQL's three-valued logic: one decided operand can absorb an
        // error on the other side.
        Expression::Or(lhs, rhs) => match (boolean(lhs), boolean(rhs)) {
            (Ok(true), _) | (_, Ok(true)) => Ok(TypedValue::from(true)),
            (Ok(false), Ok(false)) => Ok(TypedValue::from(false)),
            _ => ThinError::expected(),
        },
        Expression::And(lhs, rhs) => match (boolean(lhs), boolean(rhs)) {
            (Ok(false), _) | (_, Ok(false)) => Ok(TypedValue::from(false)),
            (Ok(true), Ok(true)) => Ok(TypedValue::from(true)),
            _ => ThinError::expected(),
        },
        Expression::Not(inner) => Ok(TypedValue::from(!boolean(inner)?)),
        Expression::Equal(lhs, rhs) => {
            let equal = evaluate_constant(lhs)?.checked_eq(&evaluate_constant(rhs)?)?;
            Ok(TypedValue::from(equal))
        }
        Expression::SameTerm(lhs, rhs) => same_term(lhs, rhs),
        Expression::Greater(lhs, rhs) => compare(lhs, rhs, Ordering::is_gt),
        Expression::GreaterOrEqual(lhs, rhs) => compare(lhs, rhs, Ordering::is_ge),
        Expression::Less(lhs, rhs) => compare(lhs, rhs, Ordering::is_lt),
        Expression::LessOrEqual(lhs, rhs) => compare(lhs, rhs, Ordering::is_le),
        Expression::In(lhs, rhs) => {
            let needle = evaluate_constant(lhs)?;
            let mut saw_error = false;
            for candidate in rhs {
                match evaluate_constant(candidate)
                    .and_then(|value| needle.checked_eq(&value))
                {
                    Ok(true) => return Ok(TypedValue::from(true)),
                    Ok(false) => {}
                    Err(_) => saw_error = true,
                }
            }
            if saw_error {
                ThinError::expected()
            } else {
                Ok(TypedValue::from(false))
            }
        }
        Expression::Add(lhs, rhs) => {
            Ok(numeric(lhs)?.checked_add(numeric(rhs)?)?.into())
        }
        Expression::Subtract(lhs, rhs) => {
            Ok(numeric(lhs)?.checked_sub(numeric(rhs)?)?.into())
        }
        Expression::Multiply(lhs, rhs) => {
            Ok(numeric(lhs)?.checked_mul(numeric(rhs)?)?.into())
        }
        Expression::Divide(lhs, rhs) => {
            Ok(numeric(lhs)?.checked_div(numeric(rhs)?)?.into())
        }
        Expression::UnaryPlus(inner) => Ok(numeric(inner)?.into()),
        Expression::UnaryMinus(inner) => Ok(numeric(inner)?.checked_neg()?.into()),
        Expression::If(test, if_true, if_false) => {
            if boolean(test)? {
                evaluate_constant(if_true)
            } else {
                evaluate_constant(if_false)
            }
        }
        Expression::Coalesce(args) => args
            .iter()
            .find_map(|arg| evaluate_constant(arg).ok())
            .ok_or(ThinError::default()),
        Expression::FunctionCall(function, args) => evaluate_function(function, args),
        Expression::QName(_)
        | Expression::Variable(_)
        | Expression::Bound(_)
        | Expression::Exists(_)
        | Expression::Aggregate(_) => ThinError::expected(),
    }
}

fn boolean(expression: &Expression) -> ThinResult<bool> {
    evaluate_constant(expression)?.effective_boolean_value()
}

fn numeric(expression: &Expression) -> ThinResult<Numeric> {
    match evaluate_constant(expression)? {
        TypedValue::Numeric(value) => Ok(value),
        _ => ThinError::expected(),
    }
}

fn compare(
    lhs: &Expression,
    rhs: &Expression,
    accept: impl Fn(Ordering) -> bool,
) -> ThinResult<TypedValue> {
    let ordering = evaluate_constant(lhs)?.checked_cmp(&evaluate_constant(rhs)?)?;
    Ok(TypedValue::from(accept(ordering)))
}

/// `SAMETERM` needs the lexical form, which decoding loses, so it is only
/// decided on syntactic term leaves.
fn same_term(lhs: &Expression, rhs: &Expression) -> ThinResult<TypedValue> {
    match (lhs, rhs) {
        (Expression::Literal(lhs), Expression::Literal(rhs)) => Ok(TypedValue::from(lhs == rhs)),
        (Expression::NamedNode(lhs), Expression::NamedNode(rhs)) => {
            Ok(TypedValue::from(lhs == rhs))
        }
        (Expression::Literal(_), Expression::NamedNode(_))
        | (Expression::NamedNode(_), Expression::Literal(_)) => Ok(TypedValue::from(false)),
        _ => ThinError::expected(),
    }
}

fn evaluate_function(function: &Function, args: &[Expression]) -> ThinResult<TypedValue> {
    match (function, args) {
        (Function::Str, [arg]) => {
            let value = evaluate_constant(arg)?.string_value()?;
            Ok(TypedValue::SimpleLiteral(value))
        }
        (Function::StrLen, [arg]) => {
            let evaluated = evaluate_constant(arg)?;
            let (value, _) = string_parts(&evaluated)?;
            let length = i64::try_from(value.chars().count())?;
            Ok(TypedValue::Numeric(Integer::from(length).into()))
        }
        (Function::UCase, [arg]) => map_string(arg, str::to_uppercase),
        (Function::LCase, [arg]) => map_string(arg, str::to_lowercase),
        (Function::Concat, args) if !args.is_empty() => {
            let mut result = String::new();
            let mut shared_language: Option<Option<String>> = None;
            for arg in args {
                let value = evaluate_constant(arg)?;
                let (part, language) = string_parts(&value)?;
                result.push_str(part);
                let language = language.map(str::to_owned);
                match &shared_language {
                    None => shared_language = Some(language),
                    Some(shared) if *shared == language => {}
                    Some(_) => shared_language = Some(None),
                }
            }
            Ok(match shared_language.flatten() {
                Some(language) => TypedValue::LanguageString {
                    value: result,
                    language,
                },
                None => TypedValue::SimpleLiteral(result),
            })
        }
        (Function::Contains, [lhs, rhs]) => {
            string_predicate(lhs, rhs, |haystack, needle| haystack.contains(needle))
        }
        (Function::StrStarts, [lhs, rhs]) => {
            string_predicate(lhs, rhs, |haystack, needle| haystack.starts_with(needle))
        }
        (Function::StrEnds, [lhs, rhs]) => {
            string_predicate(lhs, rhs, |haystack, needle| haystack.ends_with(needle))
        }
        _ => ThinError::expected(),
    }
}

/// The string value and optional language tag of a string-ish value.
fn string_parts(value: &TypedValue) -> ThinResult<(&str, Option<&str>)> {
    match value {
        TypedValue::SimpleLiteral(value) => Ok((value, None)),
        TypedValue::LanguageString { value, language } => Ok((value, Some(language))),
        _ => ThinError::expected(),
    }
}

fn map_string(arg: &Expression, f: impl Fn(&str) -> String) -> ThinResult<TypedValue> {
    let value = evaluate_constant(arg)?;
    let (part, language) = string_parts(&value)?;
    let mapped = f(part);
    Ok(match language {
        Some(language) => TypedValue::LanguageString {
            value: mapped,
            language: language.to_owned(),
        },
        None => TypedValue::SimpleLiteral(mapped),
    })
}

/// [Argument compatibility](https://www.w3.org/TR/sparql11-query/#func-arg-compatibility)
/// for the two-argument string builtins.
fn string_predicate(
    lhs: &Expression,
    rhs: &Expression,
    f: impl Fn(&str, &str) -> bool,
) -> ThinResult<TypedValue> {
    let lhs = evaluate_constant(lhs)?;
    let rhs = evaluate_constant(rhs)?;
    let (haystack, haystack_language) = string_parts(&lhs)?;
    let (needle, needle_language) = string_parts(&rhs)?;
    let compatible = match (haystack_language, needle_language) {
        (_, None) => true,
        (Some(lhs_language), Some(rhs_language)) => lhs_language == rhs_language,
        (None, Some(_)) => false,
    };
    if !compatible {
        return ThinError::expected();
    }
    Ok(TypedValue::from(f(haystack, needle)))
}
