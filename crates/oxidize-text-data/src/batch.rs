use crate::pad::pad;
use crate::profile::max_length_profile;

use oxidize_text_core::{
    BatchArray, DataError, DataResult, Element, FieldArray, FieldValue, NdArray, Sample, Scalar,
};
use oxidize_text_vocab::Vocabulary;
use tracing::{debug, trace};

/// Options for [`Batch::to_array_with`].
///
/// When `vocab` is set, every field it has an entry for is mapped to token indices and
/// padded with that field's padding index; `pad_with` then only applies to the other
/// fields (and to vocabulary fields without a padding token).
#[derive(Debug, Clone, Default)]
pub struct ArrayOptions<'v> {
    pub pad_with: Scalar,
    pub vocab: Option<&'v Vocabulary>,
}

impl<'v> ArrayOptions<'v> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pad_with(mut self, value: impl Into<Scalar>) -> Self {
        self.pad_with = value.into();
        self
    }

    pub fn vocab(mut self, vocab: &'v Vocabulary) -> Self {
        self.vocab = Some(vocab);
        self
    }
}

/// A group of samples materialized together.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<S> {
    samples: Vec<S>,
}

impl<S> Batch<S> {
    pub fn new(samples: Vec<S>) -> Self {
        Batch { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.samples.iter()
    }

    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    pub fn into_inner(self) -> Vec<S> {
        self.samples
    }
}

impl<S: Sample> Batch<S> {
    /// Values of field `name`, one per sample.
    ///
    /// Fails if any sample lacks the field.
    pub fn values(&self, name: &str) -> DataResult<Vec<&FieldValue>> {
        self.samples
            .iter()
            .map(|s| s.field(name).ok_or_else(|| DataError::missing_field(name)))
            .collect()
    }

    /// Field names present in every sample, in the order of the first sample.
    pub fn common_field_names(&self) -> Vec<&str> {
        let Some((first, rest)) = self.samples.split_first() else {
            return Vec::new();
        };
        first
            .field_names()
            .into_iter()
            .filter(|name| rest.iter().all(|s| s.has_field(name)))
            .collect()
    }

    /// Convert the batch into one dense array per common field, padding with 0.
    pub fn to_array(&self) -> DataResult<BatchArray> {
        self.to_array_with(&ArrayOptions::default())
    }

    /// Convert the batch into one dense array per common field.
    ///
    /// Each array's first dimension is the batch size; the rest are the maximum
    /// lengths at every nesting depth of that field. An empty batch gives an empty map.
    pub fn to_array_with(&self, options: &ArrayOptions<'_>) -> DataResult<BatchArray> {
        let mut arr = BatchArray::new();
        if self.samples.is_empty() {
            return Ok(arr);
        }

        let names = self.common_field_names();
        if names.is_empty() {
            return Err(DataError::NoCommonFields);
        }
        debug!(
            batch_size = self.samples.len(),
            fields = names.len(),
            "materializing batch"
        );

        for name in names {
            let field = self.field_array(name, options)?;
            trace!(field = name, shape = %field.shape(), "field materialized");
            arr.insert(name.to_string(), field);
        }
        Ok(arr)
    }

    fn field_array(&self, name: &str, options: &ArrayOptions<'_>) -> DataResult<FieldArray> {
        let raw = self.values(name)?;

        let store = match options.vocab {
            Some(vocab) if vocab.contains_field(name) => Some((vocab, vocab.get(name)?)),
            _ => None,
        };

        let encoded: Vec<FieldValue>;
        let (values, fill) = match store {
            Some((vocab, store)) => {
                encoded = raw
                    .iter()
                    .map(|v| vocab.apply_to_value(name, v))
                    .collect::<DataResult<_>>()?;
                let fill = store
                    .pad_index()
                    .map(|i| Scalar::Int(i as i64))
                    .unwrap_or_else(|| options.pad_with.clone());
                (encoded.iter().collect::<Vec<_>>(), fill)
            }
            None => {
                check_numeric(name, &raw)?;
                (raw, options.pad_with.clone())
            }
        };

        let profile = max_length_profile(name, &values)?;
        let float = has_float_leaf(&values);
        if profile.len() > 1 {
            if !float && matches!(fill, Scalar::Float(_)) {
                return Err(DataError::InvalidArgument(format!(
                    "pad value {} is not an integer but field '{}' holds integers",
                    fill, name
                )));
            }
            let rows = pad(&values, &profile, &fill);
            let rows: Vec<&FieldValue> = rows.iter().collect();
            build_field_array(name, &rows, profile, float)
        } else {
            build_field_array(name, &values, profile, float)
        }
    }
}

impl<S> FromIterator<S> for Batch<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Batch::new(iter.into_iter().collect())
    }
}

impl<'a, S> IntoIterator for &'a Batch<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// String leaves need a vocabulary before they can become numbers.
fn check_numeric(name: &str, values: &[&FieldValue]) -> DataResult<()> {
    let (mut strings, mut numbers) = (false, false);
    for v in values {
        v.for_each_leaf(&mut |s| {
            if s.is_str() {
                strings = true;
            } else {
                numbers = true;
            }
        });
    }
    match (strings, numbers) {
        (true, true) => Err(DataError::mixed_scalar_types(name)),
        (true, false) => Err(DataError::NonNumericField {
            field: name.to_string(),
        }),
        _ => Ok(()),
    }
}

fn collect_leaves<'v>(value: &'v FieldValue, out: &mut Vec<&'v Scalar>) {
    match value {
        FieldValue::Scalar(s) => out.push(s),
        FieldValue::Seq(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
    }
}

fn has_float_leaf(values: &[&FieldValue]) -> bool {
    let mut float = false;
    for v in values {
        v.for_each_leaf(&mut |s| float |= matches!(s, Scalar::Float(_)));
    }
    float
}

/// The element type comes from the field's own leaves, never from the fill.
fn build_field_array(
    name: &str,
    rows: &[&FieldValue],
    dims: Vec<usize>,
    float: bool,
) -> DataResult<FieldArray> {
    let mut leaves = Vec::new();
    for row in rows {
        collect_leaves(row, &mut leaves);
    }
    if float {
        Ok(FieldArray::Float(to_ndarray(name, &leaves, dims)?))
    } else {
        Ok(FieldArray::Int(to_ndarray(name, &leaves, dims)?))
    }
}

fn to_ndarray<T: Element>(
    name: &str,
    leaves: &[&Scalar],
    dims: Vec<usize>,
) -> DataResult<NdArray<T>> {
    let data = leaves
        .iter()
        .map(|s| {
            T::from_scalar(s).ok_or_else(|| DataError::NonNumericField {
                field: name.to_string(),
            })
        })
        .collect::<DataResult<Vec<T>>>()?;
    NdArray::new(data, dims)
}
