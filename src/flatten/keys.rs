//! Identifier synthesis and primary key validation

use crate::types::{scalar_to_string, Record, DATE_FIELD, LOCATION_ID_FIELD};
use tracing::warn;

/// Deterministic content hash of a record.
///
/// MD5 over the sorted non-null `field=value` pairs. Identical field
/// sets synthesize identical identifiers regardless of field order.
pub fn synthesize_unique_id(record: &Record) -> String {
    let mut pairs: Vec<String> = record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("{k}={}", scalar_to_string(v)))
        .collect();
    pairs.sort();
    format!("{:x}", md5::compute(pairs.join("&").as_bytes()))
}

/// Check that every primary key field is present and non-empty.
///
/// When a key field is missing, null, or empty and `generate` is set, a
/// content hash of the record fills the gap - except for
/// `location_id`/`date`, which only the extraction pipeline may stamp;
/// a record missing those is broken upstream and is dropped. With
/// `generate` unset the record is dropped with a warning.
///
/// Returns whether the record should be emitted.
pub fn validate_primary_keys(
    record: &mut Record,
    primary_keys: &[&str],
    generate: bool,
    stream: &str,
) -> bool {
    let missing: Vec<&str> = primary_keys
        .iter()
        .filter(|key| {
            match record.get(**key) {
                None => true,
                Some(v) if v.is_null() => true,
                Some(v) => v.as_str().is_some_and(str::is_empty),
            }
        })
        .copied()
        .collect();

    if missing.is_empty() {
        return true;
    }

    if !generate {
        warn!("Dropping record in stream {stream}: missing primary key field(s) {missing:?}");
        return false;
    }

    let unique_id = synthesize_unique_id(record);
    let mut unfillable = false;
    for key in &missing {
        if *key == LOCATION_ID_FIELD || *key == DATE_FIELD {
            unfillable = true;
        } else {
            record.insert(key.to_string(), serde_json::json!(unique_id));
        }
    }

    if unfillable {
        warn!("Dropping record in stream {stream}: missing {LOCATION_ID_FIELD}/{DATE_FIELD}");
        return false;
    }
    true
}

/// Stable identifier for a guid-less line item (a price row).
///
/// Fallback order is part of the output contract and must not change:
/// the node's own `guid` if present, else its `id` rendered as a string,
/// else the first 16 hex characters of
/// `md5("{parent_guid}_{index}_{amount}_{currency}")`.
pub fn line_item_id(parent_guid: &str, index: usize, node: &Record) -> String {
    if let Some(guid) = node.get("guid").filter(|v| !v.is_null()) {
        return scalar_to_string(guid);
    }
    if let Some(id) = node.get("id").filter(|v| !v.is_null()) {
        return scalar_to_string(id);
    }
    let amount = node.get("amount").map(scalar_to_string).unwrap_or_default();
    let currency = node.get("currency").map(scalar_to_string).unwrap_or_default();
    let seed = format!("{parent_guid}_{index}_{amount}_{currency}");
    format!("{:x}", md5::compute(seed.as_bytes()))[..16].to_string()
}
