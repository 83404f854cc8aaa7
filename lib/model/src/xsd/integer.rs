use crate::{Boolean, ThinError, ThinResult};
use std::fmt;
use std::str::FromStr;

/// [XML Schema `integer` datatype](https://www.w3.org/TR/xmlschema11-2/#integer)
///
/// Uses internally an [`i64`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Integer {
    value: i64,
}

impl Integer {
    pub const MAX: Self = Self { value: i64::MAX };
    pub const MIN: Self = Self { value: i64::MIN };

    /// [op:numeric-add](https://www.w3.org/TR/xpath-functions-31/#func-numeric-add)
    ///
    /// Returns `Err` in case of overflow.
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
    ///
    /// Returns `Err` in case of overflow.
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
    ///
    /// Returns `Err` in case of overflow.
    #[inline]
    pub fn checked_mul(self, rhs: impl Into<Self>) -> ThinResult<Self> {
        Ok(Self {
            value: self
                .value
                .checked_mul(rhs.into().value)
                .ok_or(ThinError::default())?,
        })
    }

    /// [op:numeric-integer-divide](https://www.w3.org/TR/xpath-functions-31/#func-numeric-integer-divide)
    ///
    /// Returns `Err` in case of division by 0 or overflow.
    #[inline]
    pub fn checked_div(self, rhs: impl Into<Self>) -> ThinResult<Self> {
        Ok(Self {
            value: self
                .value
                .checked_div(rhs.into().value)
                .ok_or(ThinError::default())?,
        })
    }

    /// [op:numeric-unary-minus](https://www.w3.org/TR/xpath-functions-31/#func-numeric-unary-minus)
    ///
    /// Returns `Err` in case of overflow.
    #[inline]
    pub fn checked_neg(self) -> ThinResult<Self> {
        self.value
            .checked_neg()
            .map(|value| Self { value })
            .ok_or(ThinError::default())
    }

    pub fn as_i64(self) -> i64 {
        self.value
    }
}

impl From<i8> for Integer {
    #[inline]
    fn from(value: i8) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl From<i16> for Integer {
    #[inline]
    fn from(value: i16) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl From<i32> for Integer {
    #[inline]
    fn from(value: i32) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl From<i64> for Integer {
    #[inline]
    fn from(value: i64) -> Self {
        Self { value }
    }
}

impl From<Boolean> for Integer {
    #[inline]
    fn from(value: Boolean) -> Self {
        Self {
            value: i64::from(value.as_bool()),
        }
    }
}

impl FromStr for Integer {
    type Err = ThinError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            value: i64::from_str(input)?,
        })
    }
}

impl fmt::Display for Integer {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
