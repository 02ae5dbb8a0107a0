//! Common types used throughout dropsync
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A flat output record: canonical field name → scalar or null value
pub type Record = JsonObject;

/// Context passed from a parent extraction to a child extraction.
///
/// Carries ancestor identifiers only (e.g. `location_id`, `date`,
/// `menu_guid`), never full records. A `BTreeMap` keeps serialization
/// stable so contexts fingerprint deterministically.
pub type Context = BTreeMap<String, String>;

// ============================================================================
// Record field names injected by the engine
// ============================================================================

/// Field stamped on every record with the owning location identifier
pub const LOCATION_ID_FIELD: &str = "location_id";

/// Field stamped on every record with the `YYYYMMDD` date folder name
pub const DATE_FIELD: &str = "date";

// ============================================================================
// Utilities
// ============================================================================

/// Render a JSON scalar as its plain string form (no quotes around strings).
///
/// Used by identifier synthesis, so the rendering must stay stable.
pub fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
