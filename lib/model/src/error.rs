use std::num::{ParseFloatError, ParseIntError, TryFromIntError};
use std::str::ParseBoolError;
use thiserror::Error;

/// A light-weight result, mainly used for SPARQL value operations.
pub type ThinResult<T> = Result<T, ThinError>;

/// A thin error type that indicates an *expected* failure without any reason.
///
/// Many SPARQL value operations can fail, for example because an operand had
/// an unsuitable datatype or an arithmetic operation overflowed. During
/// preparation these failures are not errors: a subexpression that does not
/// evaluate simply stays unfolded. As all of these expected failures are
/// treated equally, no reason is stored.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
pub enum ThinError {
    #[default]
    #[error("An expected error occurred.")]
    ExpectedError,
}

impl ThinError {
    /// Creates a result with a [ThinError].
    pub fn expected<T>() -> ThinResult<T> {
        Err(ThinError::ExpectedError)
    }
}

macro_rules! implement_from {
    ($t:ty) => {
        impl From<$t> for ThinError {
            fn from(_: $t) -> Self {
                ThinError::ExpectedError
            }
        }
    };
}

implement_from!(ParseBoolError);
implement_from!(ParseIntError);
implement_from!(ParseFloatError);
implement_from!(TryFromIntError);
implement_from!(oxiri::IriParseError);
