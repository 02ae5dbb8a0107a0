//! Tests for file decoders

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_csv_basic_decode() {
    let content = b"Order Id,Net Amount,Voided?\n123,10.50,false\n124,,true\n";
    let records = CsvDecoder::default().decode(content).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["order_id"], json!("123"));
    assert_eq!(records[0]["net_amount"], json!("10.50"));
    assert_eq!(records[0]["voided"], json!("false"));
    // Empty cells become null, not empty strings
    assert_eq!(records[1]["net_amount"], json!(null));
}

#[test]
fn test_csv_custom_delimiter_and_quote() {
    let content = b"a|b\n'x|y'|z\n";
    let records = CsvDecoder::new(b'|', b'\'').decode(content).unwrap();
    assert_eq!(records[0]["a"], json!("x|y"));
    assert_eq!(records[0]["b"], json!("z"));
}

#[test]
fn test_csv_short_rows_padded_with_null() {
    let content = b"a,b,c\n1,2\n";
    let records = CsvDecoder::default().decode(content).unwrap();
    assert_eq!(records[0]["a"], json!("1"));
    assert_eq!(records[0]["b"], json!("2"));
    assert_eq!(records[0]["c"], json!(null));
}

#[test]
fn test_csv_quoted_field_with_delimiter() {
    let content = b"name,note\nBurger,\"large, no onions\"\n";
    let records = CsvDecoder::default().decode(content).unwrap();
    assert_eq!(records[0]["note"], json!("large, no onions"));
}

#[test]
fn test_csv_empty_content() {
    let records = CsvDecoder::default().decode(b"").unwrap();
    assert!(records.is_empty());
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_bare_array() {
    let content = br#"[{"guid": "g1", "name": "Lunch"}, {"guid": "g2", "name": "Dinner"}]"#;
    let records = JsonDecoder::default().decode(content).unwrap();
    assert_eq!(records.len(), 2);
    // JSON field names pass through untouched
    assert_eq!(records[0]["guid"], json!("g1"));
    assert_eq!(records[1]["name"], json!("Dinner"));
}

#[test]
fn test_json_records_path() {
    let content = br#"{"data": {"menus": [{"guid": "g1"}]}}"#;
    let decoder = JsonDecoder::new(Some("data.menus".to_string()));
    let records = decoder.decode(content).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["guid"], json!("g1"));
}

#[test]
fn test_json_missing_records_path_yields_nothing() {
    let content = br#"{"data": {}}"#;
    let decoder = JsonDecoder::new(Some("data.menus".to_string()));
    assert!(decoder.decode(content).unwrap().is_empty());
}

#[test]
fn test_json_single_object_is_one_record() {
    let content = br#"{"guid": "g1", "name": "Lunch"}"#;
    let records = JsonDecoder::default().decode(content).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["guid"], json!("g1"));
}

#[test]
fn test_json_invalid_payloads_rejected() {
    assert!(JsonDecoder::default().decode(b"not json").is_err());
    assert!(JsonDecoder::default().decode(br#"[1, 2, 3]"#).is_err());
    assert!(JsonDecoder::default().decode(br#""just a string""#).is_err());
}

// ============================================================================
// Spreadsheet
// ============================================================================

#[test]
fn test_sheet_rejects_garbage_bytes() {
    let decoder = SheetDecoder::default();
    let err = decoder.decode(b"definitely not a workbook").unwrap_err();
    assert!(matches!(err, crate::error::Error::Spreadsheet { .. }));
}

#[test]
fn test_sheet_selector_by_name() {
    let decoder = SheetDecoder {
        selector: SheetSelector::Name("Summary".to_string()),
        header_row: 3,
    };
    // Still fails on garbage, but exercises the name-selection path
    assert!(decoder.decode(&[0u8; 16]).is_err());
}
