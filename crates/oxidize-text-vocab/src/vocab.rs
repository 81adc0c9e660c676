use crate::counter::{count, FrequencyTable};
use crate::options::VocabOptions;
use crate::store::StringStore;

use oxidize_text_core::{DataError, DataResult, FieldValue, Record, Sample, Scalar};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Per-field vocabularies: field name to its string store.
///
/// Only fields whose values are strings (or nested sequences of strings) have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    stores: BTreeMap<String, StringStore>,
}

impl Vocabulary {
    pub fn new(stores: BTreeMap<String, StringStore>) -> Self {
        Vocabulary { stores }
    }

    /// Build a vocabulary from samples with default options for every field.
    pub fn from_samples<I>(samples: I) -> DataResult<Self>
    where
        I: IntoIterator,
        I::Item: Sample,
    {
        VocabularyBuilder::new().from_samples(samples)
    }

    /// The store of a field.
    pub fn get(&self, field: &str) -> DataResult<&StringStore> {
        self.stores
            .get(field)
            .ok_or_else(|| DataError::no_vocabulary(field))
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.stores.contains_key(field)
    }

    /// Number of fields with a vocabulary.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StringStore)> {
        self.stores.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Index of `token` in the vocabulary of `field`.
    pub fn encode(&self, field: &str, token: &str) -> DataResult<usize> {
        self.get(field)?.forward(token)
    }

    /// Map every string leaf of `value` to its index in the vocabulary of `field`.
    pub fn apply_to_value(&self, field: &str, value: &FieldValue) -> DataResult<FieldValue> {
        let store = self.get(field)?;
        value.try_map_leaves(&mut |leaf| match leaf {
            Scalar::Str(tok) => Ok(Scalar::Int(store.forward(tok)? as i64)),
            _ => Err(DataError::mixed_scalar_types(field)),
        })
    }

    /// Map every integer leaf of `value` back to its token in the vocabulary of `field`.
    pub fn decode(&self, field: &str, value: &FieldValue) -> DataResult<FieldValue> {
        let store = self.get(field)?;
        value.try_map_leaves(&mut |leaf| match leaf {
            Scalar::Int(i) => {
                let index =
                    usize::try_from(*i).map_err(|_| DataError::NegativeIndex { index: *i })?;
                Ok(Scalar::Str(store.backward(index)?.to_string()))
            }
            _ => Err(DataError::mixed_scalar_types(field)),
        })
    }

    /// Apply this vocabulary to one sample. Fields without a vocabulary are copied as is.
    pub fn apply_to_sample<S: Sample + ?Sized>(&self, sample: &S) -> DataResult<Record> {
        let mut out = Record::new();
        for name in sample.field_names() {
            let Some(value) = sample.field(name) else {
                continue;
            };
            let mapped = if self.contains_field(name) {
                self.apply_to_value(name, value)?
            } else {
                value.clone()
            };
            out.insert(name.to_string(), mapped);
        }
        Ok(out)
    }

    /// Lazily apply this vocabulary to every sample of `samples`.
    pub fn apply_to<'a, I>(&'a self, samples: I) -> impl Iterator<Item = DataResult<Record>> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: Sample,
    {
        samples
            .into_iter()
            .map(move |s| self.apply_to_sample(&s))
    }
}

/// Builds a [`Vocabulary`] from token frequencies.
///
/// Every field uses the default options unless overridden with [`VocabularyBuilder::option`].
#[derive(Debug, Clone, Default)]
pub struct VocabularyBuilder {
    defaults: VocabOptions,
    options: HashMap<String, VocabOptions>,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        VocabularyBuilder::default()
    }

    /// Options used by fields without an override.
    pub fn defaults(mut self, options: VocabOptions) -> Self {
        self.defaults = options;
        self
    }

    /// Override the options of one field.
    pub fn option(mut self, field: impl Into<String>, options: VocabOptions) -> Self {
        self.options.insert(field.into(), options);
        self
    }

    /// Override the options of several fields, e.g. from a deserialized config map.
    pub fn options(mut self, options: HashMap<String, VocabOptions>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn options_for(&self, field: &str) -> &VocabOptions {
        self.options.get(field).unwrap_or(&self.defaults)
    }

    /// Count `samples` in one pass, then build.
    pub fn from_samples<I>(&self, samples: I) -> DataResult<Vocabulary>
    where
        I: IntoIterator,
        I::Item: Sample,
    {
        let table = count(samples)?;
        Ok(self.build(&table))
    }

    pub fn build(&self, table: &FrequencyTable) -> Vocabulary {
        let mut stores = BTreeMap::new();
        for (name, counts) in table.fields() {
            let opts = self.options_for(name);
            let pad = if table.is_sequence_field(name) {
                opts.pad.as_deref()
            } else {
                None
            };
            let mut store = StringStore::with_reserved(pad, opts.unk.as_deref());
            let reserved = store.len();

            for (tok, freq) in counts.most_common() {
                let full = opts
                    .max_size
                    .is_some_and(|max| store.len() - reserved >= max);
                if freq < opts.min_count || full {
                    break;
                }
                store.add(tok);
            }

            debug!(
                field = name,
                size = store.len(),
                pad = store.pad_index().is_some(),
                unk = store.unk_index().is_some(),
                pruned = counts.len().saturating_sub(store.len() - reserved),
                "vocabulary built"
            );
            stores.insert(name.to_string(), store);
        }
        Vocabulary::new(stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxidize_text_core::record;

    fn wt_samples() -> Vec<Record> {
        ["c", "b", "a", "b", "c", "c"]
            .iter()
            .map(|&w| record! { "w" => w, "t" => w })
            .collect()
    }

    fn tokens(vocab: &Vocabulary, field: &str) -> Vec<String> {
        vocab.get(field).unwrap().iter().map(String::from).collect()
    }

    #[test]
    fn test_ok() {
        let ss: Vec<Record> = ["c", "b", "a", "b", "c", "c"]
            .iter()
            .map(|&w| record! { "w" => w })
            .collect();
        let vocab = Vocabulary::from_samples(&ss).unwrap();

        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.fields().collect::<Vec<_>>(), vec!["w"]);
        // plain string field: no padding token; "a" is seen once
        assert_eq!(tokens(&vocab, "w"), vec!["<unk>", "c", "b"]);

        let w = vocab.get("w").unwrap();
        for (i, tok) in ["<unk>", "c", "b"].iter().enumerate() {
            assert_eq!(w.forward(tok).unwrap(), i);
        }
        assert!(!w.contains("foo"));
        assert_eq!(w.forward("foo").unwrap(), w.forward("<unk>").unwrap());
    }

    #[test]
    fn test_no_vocab_for_non_str() {
        let vocab = Vocabulary::from_samples(vec![record! { "i" => 10 }, record! { "i" => 20 }])
            .unwrap();
        assert!(!vocab.contains_field("i"));
        let err = vocab.get("i").unwrap_err();
        assert_eq!(err.to_string(), "no vocabulary found for field name 'i'");
    }

    #[test]
    fn test_empty_numeric_sequence_does_not_block_strings() {
        let ss = vec![
            record! { "ws" => vec!["a", "b"], "is" => vec![1, 2] },
            record! { "ws" => vec!["a"], "is" => Vec::<i64>::new() },
        ];
        let vocab = VocabularyBuilder::new()
            .defaults(VocabOptions::new().min_count(1))
            .from_samples(&ss)
            .unwrap();
        assert_eq!(tokens(&vocab, "ws"), vec!["<pad>", "<unk>", "a", "b"]);
        assert!(!vocab.contains_field("is"));
    }

    #[test]
    fn test_seq() {
        let ss = vec![
            record! { "ws" => vec!["a", "c", "c"] },
            record! { "ws" => vec!["b", "c"] },
            record! { "ws" => vec!["b"] },
        ];
        let vocab = Vocabulary::from_samples(&ss).unwrap();
        assert_eq!(tokens(&vocab, "ws"), vec!["<pad>", "<unk>", "c", "b"]);
    }

    #[test]
    fn test_seq_of_seq() {
        let ss = vec![
            record! { "cs" => vec![vec!["c", "d"], vec!["a", "d"]] },
            record! { "cs" => vec![vec!["c"], vec!["b"], vec!["b", "d"]] },
            record! { "cs" => vec![vec!["d", "c"]] },
        ];
        let vocab = Vocabulary::from_samples(&ss).unwrap();
        assert_eq!(
            tokens(&vocab, "cs"),
            vec!["<pad>", "<unk>", "d", "c", "b"]
        );
    }

    #[test]
    fn test_empty_samples() {
        let vocab = Vocabulary::from_samples(Vec::<Record>::new()).unwrap();
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_min_count() {
        let vocab = VocabularyBuilder::new()
            .option("w", VocabOptions::new().min_count(3))
            .from_samples(wt_samples())
            .unwrap();
        assert_eq!(tokens(&vocab, "w"), vec!["<unk>", "c"]);
        assert_eq!(tokens(&vocab, "t"), vec!["<unk>", "c", "b"]);
    }

    #[test]
    fn test_no_unk() {
        let vocab = VocabularyBuilder::new()
            .option("w", VocabOptions::new().no_unk())
            .from_samples(wt_samples())
            .unwrap();
        assert_eq!(tokens(&vocab, "w"), vec!["c", "b"]);
        assert_eq!(tokens(&vocab, "t"), vec!["<unk>", "c", "b"]);
        let err = vocab.encode("w", "foo").unwrap_err();
        assert_eq!(err.to_string(), "'foo' not found in vocabulary");
    }

    #[test]
    fn test_max_size() {
        let vocab = VocabularyBuilder::new()
            .option("w", VocabOptions::new().max_size(1))
            .from_samples(wt_samples())
            .unwrap();
        assert_eq!(tokens(&vocab, "w"), vec!["<unk>", "c"]);
        assert_eq!(tokens(&vocab, "t"), vec!["<unk>", "c", "b"]);
    }

    #[test]
    fn test_reserved_placement() {
        let ss = vec![record! { "ws" => vec!["x", "y"] }];
        let vocab = Vocabulary::from_samples(&ss).unwrap();
        let ws = vocab.get("ws").unwrap();
        assert_eq!(ws.forward("<pad>").unwrap(), 0);
        assert_eq!(ws.forward("<unk>").unwrap(), 1);

        let vocab = VocabularyBuilder::new()
            .defaults(VocabOptions::new().no_pad())
            .from_samples(&ss)
            .unwrap();
        assert_eq!(vocab.get("ws").unwrap().forward("<unk>").unwrap(), 0);
    }

    #[test]
    fn test_deterministic() {
        let a = Vocabulary::from_samples(wt_samples()).unwrap();
        let b = Vocabulary::from_samples(wt_samples()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_options_from_json() {
        let options: HashMap<String, VocabOptions> =
            serde_json::from_str(r#"{"w": {"min_count": 2, "unk": null}}"#).unwrap();
        let vocab = VocabularyBuilder::new()
            .options(options)
            .from_samples(wt_samples())
            .unwrap();
        assert_eq!(tokens(&vocab, "w"), vec!["c", "b"]);
    }

    #[test]
    fn test_iterator_is_passed() {
        let ss = vec![record! { "ws" => vec!["a", "a"] }, record! { "ws" => vec!["b", "b"] }];
        let vocab = Vocabulary::from_samples(ss.into_iter()).unwrap();
        assert!(vocab.get("ws").unwrap().contains("a"));
    }

    #[test]
    fn test_apply_to() {
        let ss = vec![
            record! { "ws" => vec!["a", "b"], "i" => 5 },
            record! { "ws" => vec!["zzz"], "i" => 6 },
        ];
        let vocab = VocabularyBuilder::new()
            .defaults(VocabOptions::new().min_count(1))
            .from_samples(&ss)
            .unwrap();
        let applied: Vec<Record> = vocab
            .apply_to(&ss)
            .collect::<DataResult<_>>()
            .unwrap();

        assert_eq!(applied[0]["ws"], FieldValue::from(vec![2, 3]));
        assert_eq!(applied[0]["i"], FieldValue::from(5));
        // "zzz" was counted, so it has its own index
        assert_eq!(applied[1]["ws"], FieldValue::from(vec![4]));
    }

    #[test]
    fn test_decode() {
        let ss = vec![record! { "ws" => vec!["a", "b", "b"] }];
        let vocab = VocabularyBuilder::new()
            .defaults(VocabOptions::new().min_count(1))
            .from_samples(&ss)
            .unwrap();
        let encoded = vocab.apply_to_value("ws", &ss[0]["ws"]).unwrap();
        assert_eq!(encoded, FieldValue::from(vec![3, 2, 2]));
        assert_eq!(vocab.decode("ws", &encoded).unwrap(), ss[0]["ws"]);
        assert!(matches!(
            vocab.decode("ws", &FieldValue::from(vec![9])),
            Err(DataError::IndexOutOfRange { index: 9, .. })
        ));
        assert_eq!(
            vocab.decode("ws", &FieldValue::from(vec![2, -1])).unwrap_err(),
            DataError::NegativeIndex { index: -1 }
        );
    }
}
