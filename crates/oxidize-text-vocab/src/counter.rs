use oxidize_text_core::{DataError, DataResult, FieldValue, Sample, Scalar};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Occurrence counts of the tokens of one field, remembering first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounts {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl TokenCounts {
    pub fn new() -> Self {
        TokenCounts::default()
    }

    pub fn add(&mut self, token: &str) {
        match self.counts.get_mut(token) {
            Some(c) => *c += 1,
            None => {
                self.counts.insert(token.to_string(), 1);
                self.order.push(token.to_string());
            }
        }
    }

    pub fn get(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of occurrences.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Tokens by descending count; equal counts keep first-seen order.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> =
            self.order.iter().map(|t| (t.as_str(), self.get(t))).collect();
        // stable: ties stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Result of one counting pass over a sample stream.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    fields: HashMap<String, TokenCounts>,
    sequence_fields: HashSet<String>,
    samples: usize,
}

impl FrequencyTable {
    /// Counts for a string-valued field.
    pub fn field(&self, name: &str) -> Option<&TokenCounts> {
        self.fields.get(name)
    }

    /// Names of string-valued fields, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TokenCounts)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the field held a sequence (as opposed to a plain scalar) in some sample.
    pub fn is_sequence_field(&self, name: &str) -> bool {
        self.sequence_fields.contains(name)
    }

    pub fn num_samples(&self) -> usize {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Streaming token counter. Consumes each sample once and keeps only counts.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    table: FrequencyTable,
    // fields seen so far only as sequences without any leaf
    leafless: HashSet<String>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        FrequencyCounter::default()
    }

    /// Count the string tokens of every field of `sample`.
    pub fn update<S: Sample + ?Sized>(&mut self, sample: &S) -> DataResult<()> {
        for name in sample.field_names() {
            let Some(value) = sample.field(name) else {
                continue;
            };
            match leaf_kind(value) {
                LeafKind::Str => {
                    if has_empty_seq(value) || self.leafless.contains(name) {
                        return Err(DataError::empty_sequence(name));
                    }
                    let counts = self.table.fields.entry(name.to_string()).or_default();
                    flatten_into(name, value, counts)?;
                }
                LeafKind::Numeric => {}
                LeafKind::Empty => {
                    if self.table.fields.contains_key(name) {
                        return Err(DataError::empty_sequence(name));
                    }
                    self.leafless.insert(name.to_string());
                }
            }
            if value.is_seq() && !self.table.sequence_fields.contains(name) {
                self.table.sequence_fields.insert(name.to_string());
            }
        }
        self.table.samples += 1;
        Ok(())
    }

    pub fn finish(self) -> FrequencyTable {
        debug!(
            samples = self.table.samples,
            string_fields = self.table.fields.len(),
            sequence_fields = self.table.sequence_fields.len(),
            "counting pass finished"
        );
        self.table
    }
}

/// Count token frequencies over `samples` in a single pass.
pub fn count<I>(samples: I) -> DataResult<FrequencyTable>
where
    I: IntoIterator,
    I::Item: Sample,
{
    let mut counter = FrequencyCounter::new();
    for sample in samples {
        counter.update(&sample)?;
    }
    Ok(counter.finish())
}

enum LeafKind {
    Str,
    Numeric,
    Empty,
}

/// Kind of the first leaf in depth-first order. A value needs a vocabulary when it is `Str`.
fn leaf_kind(value: &FieldValue) -> LeafKind {
    match value {
        FieldValue::Scalar(s) if s.is_str() => LeafKind::Str,
        FieldValue::Scalar(_) => LeafKind::Numeric,
        FieldValue::Seq(items) => items
            .iter()
            .map(leaf_kind)
            .find(|k| !matches!(k, LeafKind::Empty))
            .unwrap_or(LeafKind::Empty),
    }
}

fn has_empty_seq(value: &FieldValue) -> bool {
    match value {
        FieldValue::Scalar(_) => false,
        FieldValue::Seq(items) => items.is_empty() || items.iter().any(has_empty_seq),
    }
}

fn flatten_into(name: &str, value: &FieldValue, counts: &mut TokenCounts) -> DataResult<()> {
    match value {
        FieldValue::Scalar(Scalar::Str(tok)) => {
            counts.add(tok);
            Ok(())
        }
        FieldValue::Scalar(_) => Err(DataError::mixed_scalar_types(name)),
        FieldValue::Seq(items) => items
            .iter()
            .try_for_each(|item| flatten_into(name, item, counts)),
    }
}
