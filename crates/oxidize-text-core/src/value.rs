use serde::{Deserialize, Serialize};
use std::fmt;

/// A single leaf value of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn is_str(&self) -> bool {
        matches!(self, Scalar::Str(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the scalar; strings have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Str(_) => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Int(0)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Value of one field in a sample: a scalar or an arbitrarily nested sequence of scalars.
///
/// Strings are always scalars, never sequences of characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    Seq(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_seq(&self) -> bool {
        matches!(self, FieldValue::Seq(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::Seq(_) => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Seq(items) => Some(items),
            FieldValue::Scalar(_) => None,
        }
    }

    /// Visit every leaf scalar in depth-first order.
    pub fn for_each_leaf<F: FnMut(&Scalar)>(&self, f: &mut F) {
        match self {
            FieldValue::Scalar(s) => f(s),
            FieldValue::Seq(items) => {
                for item in items {
                    item.for_each_leaf(f);
                }
            }
        }
    }

    /// Rebuild the value with every leaf replaced by `f(leaf)`, keeping the nesting.
    pub fn try_map_leaves<E, F>(&self, f: &mut F) -> Result<FieldValue, E>
    where
        F: FnMut(&Scalar) -> Result<Scalar, E>,
    {
        match self {
            FieldValue::Scalar(s) => Ok(FieldValue::Scalar(f(s)?)),
            FieldValue::Seq(items) => items
                .iter()
                .map(|item| item.try_map_leaves(f))
                .collect::<Result<Vec<_>, E>>()
                .map(FieldValue::Seq),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(s) => write!(f, "{}", s),
            FieldValue::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

// ─── Conversions ────────────────────────────────────────────────────────────

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::Int(v as i64)
                }
            }

            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v as f64)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Scalar(Scalar::Float(v))
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Scalar(Scalar::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Scalar(Scalar::from(v))
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Scalar(Scalar::Str(v))
    }
}

impl From<Scalar> for FieldValue {
    fn from(v: Scalar) -> Self {
        FieldValue::Scalar(v)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Seq(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_nested_vec() {
        let v = FieldValue::from(vec![vec![1, 2], vec![3]]);
        let expected = FieldValue::Seq(vec![
            FieldValue::Seq(vec![1.into(), 2.into()]),
            FieldValue::Seq(vec![3.into()]),
        ]);
        assert_eq!(v, expected);
        assert!(v.is_seq());
    }

    #[test]
    fn test_strings_are_scalars() {
        let v = FieldValue::from("abc");
        assert!(!v.is_seq());
        assert_eq!(v.as_scalar().and_then(Scalar::as_str), Some("abc"));
    }

    #[test]
    fn test_for_each_leaf_is_depth_first() {
        let v = FieldValue::from(vec![vec!["a", "b"], vec!["c"]]);
        let mut seen = Vec::new();
        v.for_each_leaf(&mut |s| seen.push(s.to_string()));
        assert_eq!(seen, vec!["\"a\"", "\"b\"", "\"c\""]);
    }

    #[test]
    fn test_try_map_leaves_keeps_nesting() {
        let v = FieldValue::from(vec![vec![1, 2], vec![]]);
        let doubled: Result<FieldValue, ()> = v.try_map_leaves(&mut |s| match s {
            Scalar::Int(i) => Ok(Scalar::Int(i * 2)),
            other => Ok(other.clone()),
        });
        assert_eq!(
            doubled.unwrap(),
            FieldValue::from(vec![vec![2, 4], Vec::<i64>::new()])
        );
    }

    #[test]
    fn test_deserialize_untagged() {
        let v: FieldValue = serde_json::from_str(r#"[[1, 2.5], ["a"]]"#).unwrap();
        assert_eq!(
            v,
            FieldValue::Seq(vec![
                FieldValue::Seq(vec![Scalar::Int(1).into(), Scalar::Float(2.5).into()]),
                FieldValue::Seq(vec!["a".into()]),
            ])
        );
    }

    #[test]
    fn test_display() {
        let v = FieldValue::from(vec![vec![1, 2], vec![3]]);
        assert_eq!(v.to_string(), "[[1, 2], [3]]");
    }
}
