use crate::error::{ReadError, ReadResult};

use oxidize_text_core::Record;
use std::io::BufRead;
use tracing::trace;

/// Stream one [`Record`] per non-blank line of JSON-lines input.
///
/// Every line must hold a JSON object whose values are numbers, strings or (nested)
/// arrays of those. Line numbers in errors start at 1.
pub fn read_jsonl<R: BufRead>(reader: R) -> impl Iterator<Item = ReadResult<Record>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(parse_line(i + 1, &line)),
            Err(e) => Some(Err(e.into())),
        })
}

fn parse_line(line: usize, text: &str) -> ReadResult<Record> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ReadError::InvalidRecord {
            line,
            message: "expected a JSON object".to_string(),
        });
    }
    let record: Record = serde_json::from_value(value).map_err(|e| ReadError::InvalidRecord {
        line,
        message: e.to_string(),
    })?;
    trace!(line, fields = record.len(), "record read");
    Ok(record)
}
