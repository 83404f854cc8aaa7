use crate::{Decimal, Double, Float, Integer, ThinResult};
use std::cmp::Ordering;
use std::fmt;

/// A numeric value of one of the four SPARQL operator-mapping datatypes.
///
/// Binary operations promote both operands to the wider type following the
/// XPath operator mapping: `Integer → Decimal → Float → Double`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Float(Float),
    Double(Double),
}

/// The result of promoting two [Numeric] operands to a common datatype.
enum NumericPair {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Float(Float, Float),
    Double(Double, Double),
}

impl NumericPair {
    fn promote(lhs: Numeric, rhs: Numeric) -> Self {
        match (lhs, rhs) {
            (Numeric::Integer(l), Numeric::Integer(r)) => NumericPair::Integer(l, r),
            (Numeric::Integer(l), Numeric::Decimal(r)) => NumericPair::Decimal(l.into(), r),
            (Numeric::Decimal(l), Numeric::Integer(r)) => NumericPair::Decimal(l, r.into()),
            (Numeric::Decimal(l), Numeric::Decimal(r)) => NumericPair::Decimal(l, r),
            (Numeric::Integer(l), Numeric::Float(r)) => NumericPair::Float(l.into(), r),
            (Numeric::Decimal(l), Numeric::Float(r)) => NumericPair::Float(l.into(), r),
            (Numeric::Float(l), Numeric::Integer(r)) => NumericPair::Float(l, r.into()),
            (Numeric::Float(l), Numeric::Decimal(r)) => NumericPair::Float(l, r.into()),
            (Numeric::Float(l), Numeric::Float(r)) => NumericPair::Float(l, r),
            (Numeric::Double(l), r) => NumericPair::Double(l, r.to_double()),
            (l, Numeric::Double(r)) => NumericPair::Double(l.to_double(), r),
        }
    }
}

impl Numeric {
    pub fn checked_add(self, rhs: Self) -> ThinResult<Self> {
        Ok(match NumericPair::promote(self, rhs) {
            NumericPair::Integer(l, r) => l.checked_add(r)?.into(),
            NumericPair::Decimal(l, r) => l.checked_add(r)?.into(),
            NumericPair::Float(l, r) => l.add(r).into(),
            NumericPair::Double(l, r) => l.add(r).into(),
        })
    }

    pub fn checked_sub(self, rhs: Self) -> ThinResult<Self> {
        Ok(match NumericPair::promote(self, rhs) {
            NumericPair::Integer(l, r) => l.checked_sub(r)?.into(),
            NumericPair::Decimal(l, r) => l.checked_sub(r)?.into(),
            NumericPair::Float(l, r) => l.sub(r).into(),
            NumericPair::Double(l, r) => l.sub(r).into(),
        })
    }

    pub fn checked_mul(self, rhs: Self) -> ThinResult<Self> {
        Ok(match NumericPair::promote(self, rhs) {
            NumericPair::Integer(l, r) => l.checked_mul(r)?.into(),
            NumericPair::Decimal(l, r) => l.checked_mul(r)?.into(),
            NumericPair::Float(l, r) => l.mul(r).into(),
            NumericPair::Double(l, r) => l.mul(r).into(),
        })
    }

    /// Division of two integers produces a decimal per the SPARQL operator
    /// mapping (`op:numeric-divide`).
    pub fn checked_div(self, rhs: Self) -> ThinResult<Self> {
        Ok(match NumericPair::promote(self, rhs) {
            NumericPair::Integer(l, r) => Decimal::from(l).checked_div(Decimal::from(r))?.into(),
            NumericPair::Decimal(l, r) => l.checked_div(r)?.into(),
            NumericPair::Float(l, r) => l.div(r).into(),
            NumericPair::Double(l, r) => l.div(r).into(),
        })
    }

    pub fn checked_neg(self) -> ThinResult<Self> {
        Ok(match self {
            Numeric::Integer(value) => value.checked_neg()?.into(),
            Numeric::Decimal(value) => value.checked_neg()?.into(),
            Numeric::Float(value) => value.neg().into(),
            Numeric::Double(value) => value.neg().into(),
        })
    }

    /// Value comparison after promotion. `None` if either side is NaN.
    pub fn partial_cmp_value(self, rhs: Self) -> Option<Ordering> {
        match NumericPair::promote(self, rhs) {
            NumericPair::Integer(l, r) => Some(l.cmp(&r)),
            NumericPair::Decimal(l, r) => Some(l.cmp(&r)),
            NumericPair::Float(l, r) => l.partial_cmp(&r),
            NumericPair::Double(l, r) => l.partial_cmp(&r),
        }
    }

    /// Value equality after promotion. NaN is not equal to anything.
    pub fn eq_value(self, rhs: Self) -> bool {
        self.partial_cmp_value(rhs) == Some(Ordering::Equal)
    }

    pub fn is_zero_or_nan(self) -> bool {
        match self {
            Numeric::Integer(value) => value == Integer::from(0),
            Numeric::Decimal(value) => value == Decimal::from(0),
            Numeric::Float(value) => value.is_nan() || value == Float::from(0.),
            Numeric::Double(value) => value.is_nan() || value == Double::from(0.),
        }
    }

    fn to_double(self) -> Double {
        match self {
            Numeric::Integer(value) => value.into(),
            Numeric::Decimal(value) => value.into(),
            Numeric::Float(value) => value.into(),
            Numeric::Double(value) => value,
        }
    }
}

impl From<Integer> for Numeric {
    #[inline]
    fn from(value: Integer) -> Self {
        Numeric::Integer(value)
    }
}

impl From<Decimal> for Numeric {
    #[inline]
    fn from(value: Decimal) -> Self {
        Numeric::Decimal(value)
    }
}

impl From<Float> for Numeric {
    #[inline]
    fn from(value: Float) -> Self {
        Numeric::Float(value)
    }
}

impl From<Double> for Numeric {
    #[inline]
    fn from(value: Double) -> Self {
        Numeric::Double(value)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Integer(value) => value.fmt(f),
            Numeric::Decimal(value) => value.fmt(f),
            Numeric::Float(value) => value.fmt(f),
            Numeric::Double(value) => value.fmt(f),
        }
    }
}
