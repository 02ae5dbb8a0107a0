//! Delimited text decoder

use super::fields::canonicalize_field_name;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};

/// Decoder for delimited text files.
///
/// Headers come from the first row and are canonicalized. Values stay
/// strings (delimited files carry no types), except that an empty cell
/// becomes JSON null. Rows shorter than the header are padded with
/// nulls; surplus cells are dropped.
#[derive(Debug, Clone)]
pub struct CsvDecoder {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvDecoder {
    pub fn new(delimiter: u8, quote: u8) -> Self {
        Self { delimiter, quote }
    }

    pub fn decode(&self, content: &[u8]) -> Result<Vec<Record>> {
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .flexible(true)
            .from_reader(content);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::CsvParse {
                message: e.to_string(),
            })?
            .iter()
            .map(canonicalize_field_name)
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| Error::CsvParse {
                message: e.to_string(),
            })?;
            let mut record = Record::new();
            for (i, field) in headers.iter().enumerate() {
                let value = match row.get(i) {
                    Some("") | None => JsonValue::Null,
                    Some(cell) => JsonValue::String(cell.to_string()),
                };
                record.insert(field.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}
