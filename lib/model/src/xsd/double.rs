use crate::{Decimal, Float, Integer, ThinError};
use std::fmt;
use std::str::FromStr;

/// [XML Schema `double` datatype](https://www.w3.org/TR/xmlschema11-2/#double)
///
/// Uses internally an [`f64`]. Arithmetic follows IEEE 754 and never fails;
/// comparisons with NaN are undefined and surface as [ThinError] at the
/// call sites that need a total answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Double {
    value: f64,
}

impl Double {
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

    pub fn to_f64(self) -> f64 {
        self.value
    }
}

impl From<f64> for Double {
    #[inline]
    fn from(value: f64) -> Self {
        Self { value }
    }
}

impl From<Integer> for Double {
    #[inline]
    #[allow(clippy::cast_precision_loss, reason = "best-effort promotion")]
    fn from(value: Integer) -> Self {
        Self {
            value: value.as_i64() as f64,
        }
    }
}

impl From<Decimal> for Double {
    #[inline]
    fn from(value: Decimal) -> Self {
        Self {
            value: value.to_f64(),
        }
    }
}

impl From<Float> for Double {
    #[inline]
    fn from(value: Float) -> Self {
        Self {
            value: value.to_f32().into(),
        }
    }
}

impl FromStr for Double {
    type Err = ThinError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input {
            "INF" => f64::INFINITY.into(),
            "-INF" => f64::NEG_INFINITY.into(),
            "NaN" => f64::NAN.into(),
            _ => f64::from_str(input)?.into(),
        })
    }
}

impl fmt::Display for Double {
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
