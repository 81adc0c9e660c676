//! Max-length profiles: the longest length seen at every nesting depth of a field.

use oxidize_text_core::{DataError, DataResult, FieldValue};

/// Lengths per depth of one level of nesting.
///
/// A profile is `open` when its deepest recorded level holds only empty sequences, so
/// the true depth below it is unknown and a deeper sibling decides it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Profile {
    lens: Vec<usize>,
    open: bool,
}

impl Profile {
    fn merge(self, other: Profile, field: &str) -> DataResult<Profile> {
        let (mut deep, shallow) = if self.lens.len() >= other.lens.len() {
            (self, other)
        } else {
            (other, self)
        };
        let same_depth = deep.lens.len() == shallow.lens.len();
        if !same_depth && !shallow.open {
            return Err(DataError::inconsistent_depth(field));
        }
        deep.open = if same_depth {
            deep.open && shallow.open
        } else {
            deep.open
        };
        for (l, s) in deep.lens.iter_mut().zip(shallow.lens) {
            *l = (*l).max(s);
        }
        Ok(deep)
    }
}

fn level_profile<'v, I>(field: &str, items: I) -> DataResult<Profile>
where
    I: ExactSizeIterator<Item = &'v FieldValue>,
{
    let len = items.len();
    if len == 0 {
        return Ok(Profile {
            lens: vec![0],
            open: true,
        });
    }

    let mut scalars = 0usize;
    let mut below: Option<Profile> = None;
    for item in items {
        match item {
            FieldValue::Scalar(_) => scalars += 1,
            FieldValue::Seq(children) => {
                let p = level_profile(field, children.iter())?;
                below = Some(match below {
                    Some(acc) => acc.merge(p, field)?,
                    None => p,
                });
            }
        }
    }

    match below {
        None => Ok(Profile {
            lens: vec![len],
            open: false,
        }),
        Some(p) if scalars == 0 => {
            let mut lens = Vec::with_capacity(p.lens.len() + 1);
            lens.push(len);
            lens.extend(p.lens);
            Ok(Profile { lens, open: p.open })
        }
        // scalars and sequences side by side
        Some(_) => Err(DataError::inconsistent_depth(field)),
    }
}

/// Maximum length at every depth of `values`, the per-sample values of field `field`.
///
/// The first entry is `values.len()` (the batch size). Strings are scalars.
///
/// ```
/// use oxidize_text_core::FieldValue;
/// use oxidize_text_data::max_length_profile;
///
/// let a = FieldValue::from(vec![vec![1], vec![1, 2]]);
/// let b = FieldValue::from(vec![vec![1, 2, 3]]);
/// assert_eq!(max_length_profile("iss", &[&a, &b]).unwrap(), vec![2, 2, 3]);
/// ```
pub fn max_length_profile(field: &str, values: &[&FieldValue]) -> DataResult<Vec<usize>> {
    level_profile(field, values.iter().copied()).map(|p| p.lens)
}
