pub mod batch;
pub mod dataloader;
pub mod dataset;
pub mod pad;
pub mod profile;

pub use batch::{ArrayOptions, Batch};
pub use dataloader::{BatchIterator, BucketIterator, ShuffleIterator};
pub use dataset::{Batchable, Batches, Dataset, StreamBatches, StreamDataset};
pub use pad::{pad, padding_profile};
pub use profile::max_length_profile;
