//! Padding of nested sequences up to a max-length profile.

use oxidize_text_core::{FieldValue, Scalar};

/// The element appended at every depth of `profile` to fill missing positions.
///
/// The deepest entry is `fill` itself; every shallower entry is a sequence of the next
/// deeper entry repeated `profile[depth + 1]` times, so padding at any depth is already
/// rectangular.
pub fn padding_profile(profile: &[usize], fill: &Scalar) -> Vec<FieldValue> {
    let mut current = FieldValue::Scalar(fill.clone());
    let mut paddings = vec![current.clone()];
    for &maxlen in profile.iter().skip(1).rev() {
        current = FieldValue::Seq(vec![current; maxlen]);
        paddings.push(current.clone());
    }
    paddings.reverse();
    paddings
}

fn pad_level<'v, I>(
    items: I,
    profile: &[usize],
    paddings: &[FieldValue],
    depth: usize,
) -> Vec<FieldValue>
where
    I: Iterator<Item = &'v FieldValue>,
{
    let mut out: Vec<FieldValue> = items
        .map(|item| match item {
            FieldValue::Seq(children) if depth + 1 < profile.len() => {
                FieldValue::Seq(pad_level(children.iter(), profile, paddings, depth + 1))
            }
            other => other.clone(),
        })
        .collect();
    if out.len() < profile[depth] {
        out.resize(profile[depth], paddings[depth].clone());
    }
    out
}

/// Pad every nested sequence of `values` up to the lengths in `profile`.
///
/// `profile` must come from [`crate::max_length_profile`] over the same values; the
/// result then has exactly that shape, one row per value.
///
/// ```
/// use oxidize_text_core::{FieldValue, Scalar};
/// use oxidize_text_data::{max_length_profile, pad};
///
/// let a = FieldValue::from(vec![1]);
/// let b = FieldValue::from(vec![1, 2]);
/// let profile = max_length_profile("is", &[&a, &b]).unwrap();
/// let rows = pad(&[&a, &b], &profile, &Scalar::Int(9));
/// assert_eq!(rows, vec![FieldValue::from(vec![1, 9]), FieldValue::from(vec![1, 2])]);
/// ```
pub fn pad(values: &[&FieldValue], profile: &[usize], fill: &Scalar) -> Vec<FieldValue> {
    if profile.is_empty() {
        return values.iter().map(|&v| v.clone()).collect();
    }
    let paddings = padding_profile(profile, fill);
    pad_level(values.iter().copied(), profile, &paddings, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::max_length_profile;

    fn pad_all(values: &[FieldValue], fill: Scalar) -> Vec<FieldValue> {
        let refs: Vec<&FieldValue> = values.iter().collect();
        let profile = max_length_profile("f", &refs).unwrap();
        pad(&refs, &profile, &fill)
    }

    #[test]
    fn test_padding_profile() {
        let p = padding_profile(&[5, 2, 3], &Scalar::Int(0));
        assert_eq!(
            p,
            vec![
                FieldValue::from(vec![vec![0, 0, 0], vec![0, 0, 0]]),
                FieldValue::from(vec![0, 0, 0]),
                FieldValue::from(0),
            ]
        );
    }

    #[test]
    fn test_pad_seq() {
        let values: Vec<FieldValue> = vec![
            vec![1, 2].into(),
            vec![1].into(),
            vec![1, 2, 3].into(),
            vec![1, 2].into(),
        ];
        let rows = pad_all(&values, Scalar::Int(0));
        assert_eq!(
            rows,
            vec![
                FieldValue::from(vec![1, 2, 0]),
                FieldValue::from(vec![1, 0, 0]),
                FieldValue::from(vec![1, 2, 3]),
                FieldValue::from(vec![1, 2, 0]),
            ]
        );
    }

    #[test]
    fn test_pad_seq_of_seq_with_custom_fill() {
        let values: Vec<FieldValue> = vec![
            vec![vec![1, 2], vec![1]].into(),
            vec![vec![1]].into(),
        ];
        let rows = pad_all(&values, Scalar::Int(9));
        assert_eq!(
            rows,
            vec![
                FieldValue::from(vec![vec![1, 2], vec![1, 9]]),
                FieldValue::from(vec![vec![1, 9], vec![9, 9]]),
            ]
        );
    }

    #[test]
    fn test_pad_empty_leaf_sequence() {
        let values: Vec<FieldValue> = vec![Vec::<i64>::new().into(), vec![4, 5].into()];
        let rows = pad_all(&values, Scalar::Int(0));
        assert_eq!(
            rows,
            vec![FieldValue::from(vec![0, 0]), FieldValue::from(vec![4, 5])]
        );
    }

    #[test]
    fn test_pad_empty_inner_sequence() {
        let empty: Vec<Vec<i64>> = Vec::new();
        let values: Vec<FieldValue> = vec![empty.into(), vec![vec![7, 8]].into()];
        let rows = pad_all(&values, Scalar::Int(0));
        assert_eq!(
            rows,
            vec![
                FieldValue::from(vec![vec![0, 0]]),
                FieldValue::from(vec![vec![7, 8]]),
            ]
        );
    }

    #[test]
    fn test_scalars_unchanged() {
        let values: Vec<FieldValue> = vec![1.into(), 2.into()];
        let rows = pad_all(&values, Scalar::Int(0));
        assert_eq!(rows, values);
    }
}
