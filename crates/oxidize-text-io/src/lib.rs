//! Readers turning JSON-lines and CSV input into [`Record`](oxidize_text_core::Record)s.

pub mod csv_io;
pub mod error;
pub mod jsonl;

pub use csv_io::read_csv;
pub use error::{ReadError, ReadResult};
pub use jsonl::read_jsonl;
