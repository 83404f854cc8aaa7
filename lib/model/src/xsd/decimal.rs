use crate::{Integer, ThinError, ThinResult};
use std::fmt;
use std::str::FromStr;

const FRACTION_DIGITS: u32 = 6;
const SCALE: i128 = 10_i128.pow(FRACTION_DIGITS);

/// [XML Schema `decimal` datatype](https://www.w3.org/TR/xmlschema11-2/#decimal)
///
/// A fixed-point value with [FRACTION_DIGITS] fractional digits stored in an
/// [`i128`]. Constants in query text comfortably fit; anything that does not
/// (too many fractional digits, out-of-range magnitudes) is reported as a
/// [ThinError] and stays unevaluated.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Decimal {
    value: i128, // value * 10^FRACTION_DIGITS
}

impl Decimal {
    /// [op:numeric-add](https://www.w3.org/TR/xpath-functions-31/#func-numeric-add)
    #[inline]
    pub fn checked_add(self, rhs: impl Into<Self>) -> ThinResult<Self> {
        Ok(Self {
            value: self
                .value
                .checked_add(rhs.into().value)
                .ok_or(ThinError::default())?,
        })
    }

    /// [op:numeric-subtract](https://www.w3.org/TR/xpath-functions-31/#func-numeric-subtract)
    #[inline]
    pub fn checked_sub(self, rhs: impl Into<Self>) -> ThinResult<Self> {
        Ok(Self {
            value: self
                .value
                .checked_sub(rhs.into().value)
                .ok_or(ThinError::default())?,
        })
    }

    /// [op:numeric-multiply](https://www.w3.org/TR/xpath-functions-31/#func-numeric-multiply)
    #[inline]
    pub fn checked_mul(self, rhs: impl Into<Self>) -> ThinResult<Self> {
        let value = self
            .value
            .checked_mul(rhs.into().value)
            .ok_or(ThinError::default())?
            / SCALE;
        Ok(Self { value })
    }

    /// [op:numeric-divide](https://www.w3.org/TR/xpath-functions-31/#func-numeric-divide)
    ///
    /// Returns `Err` in case of division by 0 or overflow.
    #[inline]
    pub fn checked_div(self, rhs: impl Into<Self>) -> ThinResult<Self> {
        let value = self
            .value
            .checked_mul(SCALE)
            .ok_or(ThinError::default())?
            .checked_div(rhs.into().value)
            .ok_or(ThinError::default())?;
        Ok(Self { value })
    }

    /// [op:numeric-unary-minus](https://www.w3.org/TR/xpath-functions-31/#func-numeric-unary-minus)
    #[inline]
    pub fn checked_neg(self) -> ThinResult<Self> {
        self.value
            .checked_neg()
            .map(|value| Self { value })
            .ok_or(ThinError::default())
    }

    #[allow(clippy::cast_precision_loss, reason = "best-effort promotion")]
    pub fn to_f64(self) -> f64 {
        self.value as f64 / SCALE as f64
    }
}

impl From<i32> for Decimal {
    #[inline]
    fn from(value: i32) -> Self {
        Self {
            value: i128::from(value) * SCALE,
        }
    }
}

impl From<i64> for Decimal {
    #[inline]
    fn from(value: i64) -> Self {
        Self {
            value: i128::from(value) * SCALE,
        }
    }
}

impl From<Integer> for Decimal {
    #[inline]
    fn from(value: Integer) -> Self {
        value.as_i64().into()
    }
}

impl FromStr for Decimal {
    type Err = ThinError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (sign, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, input.strip_prefix('+').unwrap_or(input)),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return ThinError::expected();
        }
        if frac_part.len() > FRACTION_DIGITS as usize {
            return ThinError::expected();
        }
        let mut value: i128 = if int_part.is_empty() {
            0
        } else {
            i128::from_str(int_part).map_err(|_| ThinError::default())?
        };
        value = value.checked_mul(SCALE).ok_or(ThinError::default())?;
        if !frac_part.is_empty() {
            let mut frac = i128::from_str(frac_part).map_err(|_| ThinError::default())?;
            frac *= 10_i128.pow(FRACTION_DIGITS - u32::try_from(frac_part.len())?);
            value = value.checked_add(frac).ok_or(ThinError::default())?;
        }
        Ok(Self {
            value: value * sign,
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int_part = self.value / SCALE;
        let frac_part = (self.value % SCALE).unsigned_abs();
        if self.value < 0 && int_part == 0 {
            write!(f, "-0")?;
        } else {
            write!(f, "{int_part}")?;
        }
        if frac_part == 0 {
            return Ok(());
        }
        let digits = format!("{frac_part:0width$}", width = FRACTION_DIGITS as usize);
        write!(f, ".{}", digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Decimal::from_str("1.5"), Ok(Decimal::from_str("1.50").unwrap()));
        assert_eq!(Decimal::from_str("-2"), Ok(Decimal::from(-2)));
        assert_eq!(Decimal::from_str(".5"), Ok(Decimal::from_str("0.5").unwrap()));
        assert!(Decimal::from_str("1.1234567").is_err());
        assert!(Decimal::from_str("a").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Decimal::from_str("1.50").unwrap().to_string(), "1.5");
        assert_eq!(Decimal::from(-2).to_string(), "-2");
        assert_eq!(Decimal::from_str("-0.25").unwrap().to_string(), "-0.25");
    }

    #[test]
    fn test_arithmetic() {
        let a = Decimal::from_str("1.5").unwrap();
        let b = Decimal::from_str("2.5").unwrap();
        assert_eq!(a.checked_add(b), Ok(Decimal::from(4)));
        assert_eq!(a.checked_mul(Decimal::from(2)), Ok(Decimal::from(3)));
        assert_eq!(
            Decimal::from(1).checked_div(Decimal::from(4)),
            Ok(Decimal::from_str("0.25").unwrap())
        );
        assert!(Decimal::from(1).checked_div(Decimal::from(0)).is_err());
    }
}
