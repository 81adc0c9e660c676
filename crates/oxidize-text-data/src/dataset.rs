use crate::batch::Batch;

use oxidize_text_core::{DataError, DataResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::ops::Index;
use tracing::debug;

/// A seeded generator when `seed` is given, an entropy-seeded one otherwise.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn check_batch_size(batch_size: usize) -> DataResult<()> {
    if batch_size == 0 {
        return Err(DataError::InvalidArgument(
            "batch size must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Anything that can be grouped into batches.
pub trait Batchable {
    type Batches: Iterator;

    /// Batches of at most `batch_size` samples; the last one may be shorter.
    fn batch(self, batch_size: usize) -> DataResult<Self::Batches>;

    /// Batches of exactly `batch_size` samples; a shorter trailing batch is dropped.
    fn batch_exactly(self, batch_size: usize) -> DataResult<Self::Batches>;
}

/// A dataset that fits in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<S> {
    samples: Vec<S>,
}

impl<S> Dataset<S> {
    pub fn new(samples: Vec<S>) -> Self {
        Dataset { samples }
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

    /// Shuffle the samples in place. Returns `self` for chaining.
    pub fn shuffle(&mut self, seed: Option<u64>) -> &mut Self {
        let mut rng = make_rng(seed);
        self.samples.shuffle(&mut rng);
        debug!(samples = self.samples.len(), seeded = seed.is_some(), "dataset shuffled");
        self
    }

    /// Group the samples into batches of at most `batch_size`.
    pub fn batch(&self, batch_size: usize) -> DataResult<Batches<'_, S>> {
        Batches::new(&self.samples, batch_size, false)
    }

    /// Group the samples into batches of exactly `batch_size`, dropping the remainder.
    pub fn batch_exactly(&self, batch_size: usize) -> DataResult<Batches<'_, S>> {
        Batches::new(&self.samples, batch_size, true)
    }
}

impl<S> FromIterator<S> for Dataset<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Dataset::new(iter.into_iter().collect())
    }
}

impl<S> From<Vec<S>> for Dataset<S> {
    fn from(samples: Vec<S>) -> Self {
        Dataset::new(samples)
    }
}

impl<S> Index<usize> for Dataset<S> {
    type Output = S;

    fn index(&self, index: usize) -> &S {
        &self.samples[index]
    }
}

impl<'a, S> IntoIterator for &'a Dataset<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<'a, S> Batchable for &'a Dataset<S> {
    type Batches = Batches<'a, S>;

    fn batch(self, batch_size: usize) -> DataResult<Self::Batches> {
        Dataset::batch(self, batch_size)
    }

    fn batch_exactly(self, batch_size: usize) -> DataResult<Self::Batches> {
        Dataset::batch_exactly(self, batch_size)
    }
}

/// Batches over an in-memory dataset. Sized and indexable; batches borrow the samples.
#[derive(Debug, Clone)]
pub struct Batches<'a, S> {
    samples: &'a [S],
    batch_size: usize,
    drop_last: bool,
    current: usize,
}

impl<'a, S> Batches<'a, S> {
    pub(crate) fn new(samples: &'a [S], batch_size: usize, drop_last: bool) -> DataResult<Self> {
        check_batch_size(batch_size)?;
        Ok(Batches::from_parts(samples, batch_size, drop_last))
    }

    /// `batch_size` must be non-zero.
    pub(crate) fn from_parts(samples: &'a [S], batch_size: usize, drop_last: bool) -> Self {
        Batches {
            samples,
            batch_size,
            drop_last,
            current: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn drop_last(&self) -> bool {
        self.drop_last
    }

    /// Total number of batches, regardless of how many were already yielded.
    pub fn num_batches(&self) -> usize {
        let (n, b) = (self.samples.len(), self.batch_size);
        if self.drop_last {
            n / b
        } else {
            n.div_ceil(b)
        }
    }

    /// The `index`-th batch, if there is one.
    pub fn get(&self, index: usize) -> Option<Batch<&'a S>> {
        if index >= self.num_batches() {
            return None;
        }
        let samples = self.samples;
        let start = index * self.batch_size;
        let end = (start + self.batch_size).min(samples.len());
        Some(samples[start..end].iter().collect())
    }
}

impl<'a, S> Iterator for Batches<'a, S> {
    type Item = Batch<&'a S>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.get(self.current)?;
        self.current += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.num_batches().saturating_sub(self.current);
        (rest, Some(rest))
    }
}

impl<S> ExactSizeIterator for Batches<'_, S> {}

/// A dataset that streams its samples from a restartable source.
///
/// Every call to [`StreamDataset::iter`] or [`StreamDataset::batch`] starts again from a
/// fresh clone of the source, so a `Vec`, a range or an iterator adapter over one all work.
#[derive(Debug, Clone)]
pub struct StreamDataset<I> {
    stream: I,
}

impl<I> StreamDataset<I>
where
    I: IntoIterator + Clone,
{
    pub fn new(stream: I) -> Self {
        StreamDataset { stream }
    }

    pub fn iter(&self) -> I::IntoIter {
        self.stream.clone().into_iter()
    }

    /// Lazily group the stream into batches of at most `batch_size`.
    pub fn batch(&self, batch_size: usize) -> DataResult<StreamBatches<I::IntoIter>> {
        StreamBatches::new(self.iter(), batch_size, false)
    }

    /// Lazily group the stream into batches of exactly `batch_size`, dropping the remainder.
    pub fn batch_exactly(&self, batch_size: usize) -> DataResult<StreamBatches<I::IntoIter>> {
        StreamBatches::new(self.iter(), batch_size, true)
    }
}

impl<'a, I> Batchable for &'a StreamDataset<I>
where
    I: IntoIterator + Clone,
{
    type Batches = StreamBatches<I::IntoIter>;

    fn batch(self, batch_size: usize) -> DataResult<Self::Batches> {
        StreamDataset::batch(self, batch_size)
    }

    fn batch_exactly(self, batch_size: usize) -> DataResult<Self::Batches> {
        StreamDataset::batch_exactly(self, batch_size)
    }
}

/// Batches pulled from a stream. Holds at most one batch at a time.
#[derive(Debug, Clone)]
pub struct StreamBatches<It> {
    iter: It,
    batch_size: usize,
    drop_last: bool,
    done: bool,
}

impl<It: Iterator> StreamBatches<It> {
    fn new(iter: It, batch_size: usize, drop_last: bool) -> DataResult<Self> {
        check_batch_size(batch_size)?;
        Ok(StreamBatches {
            iter,
            batch_size,
            drop_last,
            done: false,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn drop_last(&self) -> bool {
        self.drop_last
    }
}

impl<It: Iterator> Iterator for StreamBatches<It> {
    type Item = Batch<It::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let samples: Vec<It::Item> = self.iter.by_ref().take(self.batch_size).collect();
        if samples.len() < self.batch_size {
            self.done = true;
            if samples.is_empty() || self.drop_last {
                return None;
            }
        }
        Some(Batch::new(samples))
    }
}
