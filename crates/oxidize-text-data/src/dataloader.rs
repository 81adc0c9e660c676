use crate::batch::Batch;
use crate::dataset::{check_batch_size, make_rng, Batches, Dataset};

use oxidize_text_core::{DataError, DataResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Batches of a dataset in order.
#[derive(Debug, Clone)]
pub struct BatchIterator<'a, S> {
    dataset: &'a Dataset<S>,
    batch_size: usize,
}

impl<'a, S> BatchIterator<'a, S> {
    pub fn new(dataset: &'a Dataset<S>, batch_size: usize) -> DataResult<Self> {
        check_batch_size(batch_size)?;
        Ok(BatchIterator {
            dataset,
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches, counting a shorter last one.
    pub fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn iter(&self) -> Batches<'a, S> {
        Batches::from_parts(self.dataset.samples(), self.batch_size, false)
    }
}

impl<'a, S> IntoIterator for &BatchIterator<'a, S> {
    type Item = Batch<&'a S>;
    type IntoIter = Batches<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

type KeyFn<'a, S> = Box<dyn Fn(&S) -> f64 + 'a>;

/// Yields samples in a fresh random order on every pass.
///
/// With a key, samples are sorted by `key(s) + noise` where the noise is drawn uniformly
/// from `[-z, z]` and `z = scale * stdev(keys)`. Small scales keep samples of similar key
/// close together; a scale of 0 is a plain stable sort by key. When `z` or the noise range
/// is not finite (keys near `f64::MAX`, infinite keys) no noise is added either.
pub struct ShuffleIterator<'a, S> {
    samples: &'a [S],
    key: Option<KeyFn<'a, S>>,
    scale: f64,
    rng: StdRng,
}

impl<'a, S> ShuffleIterator<'a, S> {
    /// Uniform shuffle.
    pub fn new(samples: &'a [S]) -> Self {
        ShuffleIterator {
            samples,
            key: None,
            scale: 1.0,
            rng: make_rng(None),
        }
    }

    /// Noisy sort by `key`. Fails when `scale` is negative.
    pub fn by_key<F>(samples: &'a [S], key: F, scale: f64) -> DataResult<Self>
    where
        F: Fn(&S) -> f64 + 'a,
    {
        if scale < 0.0 {
            return Err(DataError::InvalidArgument(
                "scale cannot be less than 0".to_string(),
            ));
        }
        Ok(ShuffleIterator {
            samples,
            key: Some(Box::new(key)),
            scale,
            rng: make_rng(None),
        })
    }

    /// Make the shuffles reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = make_rng(Some(seed));
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One pass over the samples in a new order.
    pub fn shuffled(&mut self) -> Vec<&'a S> {
        let samples = self.samples;
        let mut out: Vec<&'a S> = samples.iter().collect();
        match &self.key {
            None => out.shuffle(&mut self.rng),
            Some(key) => {
                let keys: Vec<f64> = samples.iter().map(|s| key(s)).collect();
                let z = self.scale * sample_stdev(&keys);
                // the uniform sampler needs finite bounds and a finite width
                let noise = z > 0.0 && (2.0 * z).is_finite();
                if z > 0.0 && !noise {
                    debug!(z, "noise range not finite, sorting by key only");
                }
                let noisy: Vec<f64> = keys
                    .iter()
                    .map(|k| {
                        if noise {
                            k + self.rng.gen_range(-z..=z)
                        } else {
                            *k
                        }
                    })
                    .collect();
                let mut order: Vec<usize> = (0..samples.len()).collect();
                order.sort_by(|&a, &b| noisy[a].total_cmp(&noisy[b]));
                out = order.into_iter().map(|i| &samples[i]).collect();
            }
        }
        debug!(samples = out.len(), scale = self.scale, keyed = self.key.is_some(), "shuffled");
        out
    }

    pub fn iter(&mut self) -> std::vec::IntoIter<&'a S> {
        self.shuffled().into_iter()
    }
}

/// Sample standard deviation; 0 for fewer than two values.
///
/// Values are scaled by their largest magnitude first so that keys near `f64::MAX` do not
/// overflow the squared deviations. Non-finite input gives a non-finite result.
fn sample_stdev(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let m = xs.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    if m == 0.0 || !m.is_finite() {
        return if m == 0.0 { 0.0 } else { f64::NAN };
    }
    let mean = xs.iter().map(|x| x / m).sum::<f64>() / n as f64;
    let var = xs.iter().map(|x| (x / m - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt() * m
}

/// Groups samples by a bucket key and batches within each bucket.
///
/// Every batch holds samples of a single bucket, so e.g. bucketing by length keeps the
/// padding of each batch small.
pub struct BucketIterator<'a, S> {
    buckets: Vec<Vec<&'a S>>,
    batch_size: usize,
    rng: Option<StdRng>,
}

impl<'a, S> BucketIterator<'a, S> {
    pub fn new<K, F>(samples: &'a [S], key: F, batch_size: usize) -> DataResult<Self>
    where
        K: Ord,
        F: Fn(&S) -> K,
    {
        check_batch_size(batch_size)?;
        let mut by_key: BTreeMap<K, Vec<&'a S>> = BTreeMap::new();
        for s in samples {
            by_key.entry(key(s)).or_default().push(s);
        }
        debug!(
            samples = samples.len(),
            buckets = by_key.len(),
            batch_size,
            "samples bucketed"
        );
        Ok(BucketIterator {
            buckets: by_key.into_values().collect(),
            batch_size,
            rng: None,
        })
    }

    /// Shuffle the batch order on every pass.
    pub fn shuffle(mut self, seed: Option<u64>) -> Self {
        self.rng = Some(make_rng(seed));
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Number of batches over all buckets.
    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.len().div_ceil(self.batch_size))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// One pass of batches: bucket by bucket, or shuffled when enabled.
    pub fn batches(&mut self) -> Vec<Batch<&'a S>> {
        let mut out: Vec<Batch<&'a S>> = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.chunks(self.batch_size))
            .map(|chunk| Batch::new(chunk.to_vec()))
            .collect();
        if let Some(rng) = self.rng.as_mut() {
            out.shuffle(rng);
        }
        out
    }

    pub fn iter(&mut self) -> std::vec::IntoIter<Batch<&'a S>> {
        self.batches().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use oxidize_text_core::{record, FieldValue, Record, Sample, Scalar};

    fn dataset(n: i64) -> Dataset<Record> {
        (0..n).map(|i| record! { "i" => i }).collect()
    }

    fn int_of(s: &Record) -> i64 {
        match s.field("i") {
            Some(FieldValue::Scalar(Scalar::Int(i))) => *i,
            _ => panic!("no int field"),
        }
    }

    #[test]
    fn test_batch_iterator() {
        let ds = dataset(5);
        let it = BatchIterator::new(&ds, 1).unwrap();
        assert_eq!(it.len(), 5);
        assert!(it.iter().all(|b| b.len() == 1));
        for (b, s) in it.iter().zip(ds.iter()) {
            assert_eq!(*b.get(0).unwrap(), s);
        }
    }

    #[test]
    fn test_batch_iterator_kwargs() {
        let ds = dataset(5);
        let it = BatchIterator::new(&ds, 2).unwrap();
        assert_eq!(it.batch_size(), 2);
        assert_eq!(it.len(), 3);

        let bs: Vec<_> = (&it).into_iter().collect();
        assert_eq!(bs[0].iter().map(|s| int_of(s)).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(bs[1].iter().map(|s| int_of(s)).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(bs[2].iter().map(|s| int_of(s)).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_batch_iterator_zero() {
        let ds = dataset(5);
        assert!(BatchIterator::new(&ds, 0).is_err());
    }

    #[test]
    fn test_shuffle_iterator() {
        let ds = dataset(50);
        let mut it = ShuffleIterator::new(ds.samples()).seed(3);
        assert_eq!(it.len(), 50);

        let out: Vec<i64> = it.iter().map(int_of).collect();
        assert_ne!(out, (0..50).collect::<Vec<_>>());
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_iterator_seeded_is_reproducible() {
        let ds = dataset(20);
        let mut a = ShuffleIterator::new(ds.samples()).seed(11);
        let mut b = ShuffleIterator::new(ds.samples()).seed(11);
        assert_eq!(a.shuffled(), b.shuffled());
    }

    #[test]
    fn test_shuffle_by_key() {
        let ss = vec![
            record! { "i" => 3 },
            record! { "i" => 1 },
            record! { "i" => 2 },
            record! { "i" => 5 },
            record! { "i" => 4 },
        ];
        let mut it = ShuffleIterator::by_key(&ss, |s| int_of(s) as f64, 2.0)
            .unwrap()
            .seed(0);
        let mut out: Vec<i64> = it.iter().map(int_of).collect();
        out.sort();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_shuffle_zero_scale_sorts() {
        let ss = vec![
            record! { "i" => 3 },
            record! { "i" => 1 },
            record! { "i" => 2 },
            record! { "i" => 5 },
            record! { "i" => 4 },
        ];
        let mut it = ShuffleIterator::by_key(&ss, |s| int_of(s) as f64, 0.0).unwrap();
        let out: Vec<i64> = it.iter().map(int_of).collect();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_shuffle_negative_scale() {
        let ds = dataset(3);
        let err = ShuffleIterator::by_key(ds.samples(), |s| int_of(s) as f64, -1.0)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "scale cannot be less than 0");
    }

    #[test]
    fn test_sample_stdev() {
        assert_relative_eq!(sample_stdev(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5f64.sqrt());
        assert_eq!(sample_stdev(&[4.0]), 0.0);
        assert_eq!(sample_stdev(&[]), 0.0);
        assert_eq!(sample_stdev(&[0.0, 0.0]), 0.0);
        assert_relative_eq!(sample_stdev(&[0.0, 1e200, -1e200]), 1e200, max_relative = 1e-12);
        assert!(sample_stdev(&[1.0, f64::INFINITY]).is_nan());
    }

    #[test]
    fn test_shuffle_extreme_keys() {
        let keys = [0.0, 1e200, -1e200];
        let mut it = ShuffleIterator::by_key(&keys, |x| *x, 1.0).unwrap().seed(1);
        let mut out: Vec<f64> = it.shuffled().into_iter().copied().collect();
        out.sort_by(f64::total_cmp);
        assert_eq!(out, vec![-1e200, 0.0, 1e200]);

        // noise width overflows: falls back to sorting by key
        let keys = [f64::MAX, -f64::MAX, 0.0];
        let mut it = ShuffleIterator::by_key(&keys, |x| *x, 1.0).unwrap().seed(1);
        let out: Vec<f64> = it.shuffled().into_iter().copied().collect();
        assert_eq!(out, vec![-f64::MAX, 0.0, f64::MAX]);

        let keys = [2.0, f64::INFINITY, 1.0];
        let mut it = ShuffleIterator::by_key(&keys, |x| *x, 1.0).unwrap().seed(1);
        let out: Vec<f64> = it.shuffled().into_iter().copied().collect();
        assert_eq!(out, vec![1.0, 2.0, f64::INFINITY]);
    }

    fn ns_samples() -> Vec<Record> {
        (0..100)
            .map(|n: i64| record! { "ns" => (0..=n).collect::<Vec<_>>() })
            .collect()
    }

    fn ns_len(s: &Record) -> usize {
        s.field("ns")
            .and_then(|v| v.as_seq())
            .map(|xs| xs.len())
            .unwrap_or(0)
    }

    #[test]
    fn test_bucket_iterator() {
        let ss = ns_samples();
        let key = |s: &Record| (ns_len(s) - 1) / 10;
        let mut it = BucketIterator::new(&ss, key, 3).unwrap();

        assert_eq!(it.len(), 40);
        assert_eq!(it.num_buckets(), 10);
        let bs = it.batches();
        assert_eq!(bs.len(), 40);
        assert!(bs.iter().all(|b| b.len() <= 3));
        for b in &bs {
            let k = key(*b.get(0).unwrap());
            assert!(b.iter().all(|s| key(*s) == k));
        }
    }

    #[test]
    fn test_bucket_iterator_shuffled() {
        let ss = ns_samples();
        let key = |s: &Record| (ns_len(s) - 1) / 10;
        let mut it = BucketIterator::new(&ss, key, 3).unwrap().shuffle(Some(5));
        let bs = it.batches();
        assert_eq!(bs.len(), 40);
        assert_eq!(bs.iter().map(|b| b.len()).sum::<usize>(), 100);
        for b in &bs {
            let k = key(*b.get(0).unwrap());
            assert!(b.iter().all(|s| key(*s) == k));
        }
    }

    #[test]
    fn test_bucketed_batches_pad_little() {
        let ss = ns_samples();
        let mut it = BucketIterator::new(&ss, |s: &Record| (ns_len(s) - 1) / 10, 10).unwrap();
        for b in it.iter() {
            let arr = b.to_array().unwrap();
            let width = arr["ns"].shape_vec()[1];
            assert!(b.iter().all(|s| width - ns_len(s) < 10));
        }
    }
}
