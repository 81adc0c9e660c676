//! # oxidize-text
//!
//! Batching, vocabularies and padded array materialization for structured text samples.
//!
//! ## Modules
//!
//! - **core**: Sample model (`FieldValue`, `Record`, `Sample`), dense `NdArray`, errors
//! - **vocab**: Frequency counting, `VocabularyBuilder`, `StringStore`, `Vocabulary`
//! - **data**: `Batch::to_array`, max-length profiles, padding, datasets and iterators
//! - **io**: JSON-lines and CSV sample readers
//!
//! ## Example
//!
//! ```
//! use oxidize_text::core::record;
//! use oxidize_text::data::{ArrayOptions, Dataset};
//! use oxidize_text::vocab::Vocabulary;
//!
//! let ds = Dataset::new(vec![
//!     record! { "ws" => vec!["a", "b"] },
//!     record! { "ws" => vec!["a"] },
//!     record! { "ws" => vec!["b", "a", "c"] },
//! ]);
//! let vocab = Vocabulary::from_samples(ds.iter()).unwrap();
//! let opts = ArrayOptions::new().vocab(&vocab);
//! for batch in ds.batch(2).unwrap() {
//!     let arr = batch.to_array_with(&opts).unwrap();
//!     assert_eq!(arr["ws"].shape_vec()[0], batch.len());
//! }
//! ```

/// Sample model, dense arrays and errors.
pub use oxidize_text_core as core;

/// Vocabulary construction and lookup.
pub use oxidize_text_vocab as vocab;

/// Batching, padding and array materialization.
pub use oxidize_text_data as data;

/// Sample readers.
pub use oxidize_text_io as io;
