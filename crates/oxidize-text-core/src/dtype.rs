use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Scalar;

/// Trait bound for element types usable in dense arrays.
/// Supports `i64` and `f64`.
pub trait Element:
    Copy
    + Clone
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Serialize
    + for<'de> Deserialize<'de>
    + 'static
{
    const ZERO: Self;

    /// Convert a leaf scalar, or `None` when the scalar cannot be represented.
    fn from_scalar(s: &Scalar) -> Option<Self>;

    fn to_f64(self) -> f64;
}

impl Element for i64 {
    const ZERO: Self = 0;

    fn from_scalar(s: &Scalar) -> Option<Self> {
        s.as_i64()
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f64 {
    const ZERO: Self = 0.0;

    fn from_scalar(s: &Scalar) -> Option<Self> {
        s.as_f64()
    }

    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_rejects_float_and_str() {
        assert_eq!(i64::from_scalar(&Scalar::Int(3)), Some(3));
        assert_eq!(i64::from_scalar(&Scalar::Float(3.0)), None);
        assert_eq!(i64::from_scalar(&Scalar::Str("3".into())), None);
    }

    #[test]
    fn test_float_promotes_int() {
        assert_eq!(f64::from_scalar(&Scalar::Int(2)), Some(2.0));
        assert_eq!(f64::from_scalar(&Scalar::Float(0.5)), Some(0.5));
        assert_eq!(f64::from_scalar(&Scalar::Str("x".into())), None);
    }
}
