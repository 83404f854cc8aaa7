use crate::{Decimal, Integer, ThinError};
use std::fmt;
use std::str::FromStr;

/// [XML Schema `float` datatype](https://www.w3.org/TR/xmlschema11-2/#float)
///
/// Uses internally an [`f32`].
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Float {
    value: f32,
}

impl Float {
    pub fn is_nan(self) -> bool {
        self.value.is_nan()
    }

    pub fn add(self, rhs: impl Into<Self>) -> Self {
        (self.value + rhs.into().value).into()
    }

    pub fn sub(self, rhs: impl Into<Self>) -> Self {
        (self.value - rhs.into().value).into()
    }

    pub fn mul(self, rhs: impl Into<Self>) -> Self {
        (self.value * rhs.into().value).into()
    }

    pub fn div(self, rhs: impl Into<Self>) -> Self {
        (self.value / rhs.into().value).into()
    }

    pub fn neg(self) -> Self {
        (-self.value).into()
    }

    pub fn to_f32(self) -> f32 {
        self.value
    }
}

impl From<f32> for Float {
    #[inline]
    fn from(value: f32) -> Self {
        Self { value }
    }
}

impl From<Integer> for Float {
    #[inline]
    #[allow(clippy::cast_precision_loss, reason = "best-effort promotion")]
    fn from(value: Integer) -> Self {
        Self {
            value: value.as_i64() as f32,
        }
    }
}

impl From<Decimal> for Float {
    #[inline]
    #[allow(clippy::cast_possible_truncation, reason = "best-effort promotion")]
    fn from(value: Decimal) -> Self {
        Self {
            value: value.to_f64() as f32,
        }
    }
}

impl FromStr for Float {
    type Err = ThinError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input {
            "INF" => f32::INFINITY.into(),
            "-INF" => f32::NEG_INFINITY.into(),
            "NaN" => f32::NAN.into(),
            _ => f32::from_str(input)?.into(),
        })
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_infinite() {
            if self.value > 0. {
                write!(f, "INF")
            } else {
                write!(f, "-INF")
            }
        } else {
            self.value.fmt(f)
        }
    }
}
