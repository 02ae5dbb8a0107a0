//! File decoders
//!
//! Turn raw file bytes into flat JSON records. Three formats appear in
//! the remote drops:
//! - delimited text ([`CsvDecoder`])
//! - legacy spreadsheets ([`SheetDecoder`])
//! - JSON exports ([`JsonDecoder`])
//!
//! CSV and spreadsheet decoders canonicalize header names into snake
//! case (see [`canonicalize_field_name`]); JSON exports keep their field
//! names as-is, since downstream consumers match on the export schema.
//! Decoders do not stamp `location_id`/`date`; the extraction pipeline
//! owns record identity.

mod csv;
mod fields;
mod json;
mod sheet;

pub use csv::CsvDecoder;
pub use fields::canonicalize_field_name;
pub use json::JsonDecoder;
pub use sheet::{SheetDecoder, SheetSelector};

#[cfg(test)]
mod tests;
