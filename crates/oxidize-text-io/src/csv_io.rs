use crate::error::ReadResult;

use oxidize_text_core::{FieldValue, Record, Scalar};
use std::io::Read;
use tracing::debug;

/// Stream the rows of CSV input as [`Record`]s keyed by the header row.
///
/// Cells that parse as integers become `Int`, then floats become `Float`, and anything
/// else (including empty cells) stays a string.
pub fn read_csv<R: Read>(reader: R) -> ReadResult<impl Iterator<Item = ReadResult<Record>>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    debug!(columns = headers.len(), "csv header read");

    Ok(rdr.into_records().map(move |row| {
        let row = row?;
        Ok(headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| (h.clone(), FieldValue::Scalar(parse_cell(cell))))
            .collect())
    }))
}

fn parse_cell(cell: &str) -> Scalar {
    if let Ok(i) = cell.parse::<i64>() {
        Scalar::Int(i)
    } else if let Ok(f) = cell.parse::<f64>() {
        Scalar::Float(f)
    } else {
        Scalar::Str(cell.to_string())
    }
}
