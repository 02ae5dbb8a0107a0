//! Spreadsheet decoder

use super::fields::canonicalize_field_name;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Which worksheet to read
#[derive(Debug, Clone)]
pub enum SheetSelector {
    /// Zero-based position in the workbook
    Index(usize),
    Name(String),
}

/// Decoder for legacy spreadsheet exports (`.xls`/`.xlsx`).
///
/// `header_row` is the zero-based row holding the column names; some
/// reports put a title block above the table. Rows before it are
/// ignored. Unparseable numeric cells (NaN) become JSON null, matching
/// the empty-cell handling of the text decoders.
#[derive(Debug, Clone)]
pub struct SheetDecoder {
    pub selector: SheetSelector,
    pub header_row: usize,
}

impl Default for SheetDecoder {
    fn default() -> Self {
        Self {
            selector: SheetSelector::Index(0),
            header_row: 0,
        }
    }
}

impl SheetDecoder {
    pub fn decode(&self, content: &[u8]) -> Result<Vec<Record>> {
        let cursor = Cursor::new(content.to_vec());
        let mut workbook = open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::spreadsheet(e.to_string()))?;

        let sheet_name = match &self.selector {
            SheetSelector::Name(name) => name.clone(),
            SheetSelector::Index(i) => workbook
                .sheet_names()
                .get(*i)
                .cloned()
                .ok_or_else(|| Error::spreadsheet(format!("no sheet at index {i}")))?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| Error::spreadsheet(e.to_string()))?;

        let mut rows = range.rows().skip(self.header_row);
        let Some(header_cells) = rows.next() else {
            return Ok(Vec::new());
        };

        // Columns with a blank header carry no data worth keeping
        let headers: Vec<(usize, String)> = header_cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| match cell_to_value(cell) {
                JsonValue::Null => None,
                value => Some((i, canonicalize_field_name(&crate::types::scalar_to_string(&value)))),
            })
            .collect();

        let mut records = Vec::new();
        for row in rows {
            let mut record = Record::new();
            for (i, field) in &headers {
                let value = row.get(*i).map(cell_to_value).unwrap_or(JsonValue::Null);
                record.insert(field.clone(), value);
            }
            // Fully blank rows are padding, not data
            if record.values().any(|v| !v.is_null()) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Convert a cell to a JSON value. Non-finite floats become null.
fn cell_to_value(cell: &Data) -> JsonValue {
    match cell {
        Data::Empty | Data::Error(_) => JsonValue::Null,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            JsonValue::String(s.clone())
        }
        Data::Int(i) => JsonValue::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Data::Bool(b) => JsonValue::Bool(*b),
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64())
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
    }
}
