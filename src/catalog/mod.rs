//! Built-in stream catalog
//!
//! Each stream the extraction engine can produce is described by a
//! [`StreamDescriptor`]: where its data lives inside a date folder, how
//! to decode it, and what keys its records carry. The catalog is static;
//! streams are selected by name at run time.

use crate::decode::SheetSelector;
use crate::flatten::{Flattener, LevelSpec};
use std::sync::LazyLock;


// ============================================================================
// Descriptors
// ============================================================================

/// Where a stream's records come from and how to decode them
#[derive(Debug, Clone)]
pub enum SourceKind {
    /// One delimited text file per date folder
    Csv {
        file_name: &'static str,
        delimiter: u8,
        quote: u8,
    },
    /// One spreadsheet per date folder
    Sheet {
        file_name: &'static str,
        selector: SheetSelector,
        /// Zero-based row holding the column headers
        header_row: usize,
    },
    /// JSON export files selected by wildcard pattern
    Json {
        file_pattern: &'static str,
        records_path: Option<&'static str>,
    },
    /// Records at one depth of a nested JSON export
    Flattened {
        file_pattern: &'static str,
        flattener: Flattener,
    },
}

/// A stream the engine can extract
#[derive(Debug, Clone)]
pub struct StreamDescriptor {
    pub name: &'static str,
    pub source: SourceKind,
    /// Ordered primary key fields every record must carry
    pub primary_keys: &'static [&'static str],
    /// Synthesize missing key values instead of dropping the record
    pub generate_unique_ids: bool,
}

impl StreamDescriptor {
    const fn csv(name: &'static str, file_name: &'static str, primary_keys: &'static [&'static str]) -> Self {
        Self {
            name,
            source: SourceKind::Csv {
                file_name,
                delimiter: b',',
                quote: b'"',
            },
            primary_keys,
            generate_unique_ids: false,
        }
    }
}

// ============================================================================
// Menu export nesting
// ============================================================================

/// Both export generations are matched: `MenuExport_*.json` carries a
/// bare menu array, `MenuExportV2_*.json` wraps it in `{"menus": [...]}`.
const MENU_EXPORT_PATTERN: &str = "MenuExport*.json";

fn menu_flattener(depth: usize) -> Flattener {
    let levels = [
        LevelSpec::keyed(None, "menu_guid", &["groups"]),
        LevelSpec::keyed(Some("groups"), "group_guid", &["items", "subgroups"]),
        LevelSpec::keyed(Some("items"), "item_guid", &["optionGroups", "prices"]),
        LevelSpec::keyed(Some("optionGroups"), "option_group_guid", &["items"]),
        LevelSpec::keyed(Some("items"), "option_item_guid", &["optionGroups"]),
    ];
    Flattener::new(levels[..depth].to_vec(), Some("menus"))
}

fn price_flattener() -> Flattener {
    let mut flattener = menu_flattener(3);
    flattener.levels.push(LevelSpec::line_items("prices", "price_id"));
    flattener
}

// ============================================================================
// Catalog
// ============================================================================

static STREAMS: LazyLock<Vec<StreamDescriptor>> = LazyLock::new(|| {
    vec![
        StreamDescriptor {
            name: "accounting_report",
            source: SourceKind::Sheet {
                file_name: "AccountingReport.xls",
                selector: SheetSelector::Index(0),
                // A three-row title block sits above the table
                header_row: 3,
            },
            primary_keys: &["location_id", "date", "gl_account"],
            generate_unique_ids: false,
        },
        StreamDescriptor::csv(
            "all_items_report",
            "AllItemsReport.csv",
            &["location_id", "date", "item_id"],
        ),
        StreamDescriptor::csv(
            "cash_entries",
            "CashEntries.csv",
            &["location_id", "date", "entry_id"],
        ),
        StreamDescriptor::csv(
            "check_details",
            "CheckDetails.csv",
            &["location_id", "date", "check_id"],
        ),
        StreamDescriptor::csv(
            "house_account_export",
            "HouseAccountExport.csv",
            &["location_id", "date", "account_number"],
        ),
        StreamDescriptor::csv(
            "item_selection_details",
            "ItemSelectionDetails.csv",
            &["location_id", "date", "item_selection_id"],
        ),
        StreamDescriptor::csv(
            "kitchen_timings",
            "KitchenTimings.csv",
            &["location_id", "date", "id"],
        ),
        StreamDescriptor {
            name: "menu_export",
            source: SourceKind::Json {
                file_pattern: "MenuExport_*.json",
                records_path: None,
            },
            primary_keys: &["location_id", "date", "guid"],
            generate_unique_ids: false,
        },
        StreamDescriptor {
            name: "menu_export_v2",
            source: SourceKind::Json {
                file_pattern: "MenuExportV2_*.json",
                records_path: None,
            },
            primary_keys: &["location_id", "date", "guid"],
            generate_unique_ids: false,
        },
        StreamDescriptor::csv(
            "modifiers_selection_details",
            "ModifiersSelectionDetails.csv",
            &["location_id", "date", "modifier_id"],
        ),
        StreamDescriptor::csv(
            "order_details",
            "OrderDetails.csv",
            &["location_id", "date", "order_id"],
        ),
        StreamDescriptor::csv(
            "payment_details",
            "PaymentDetails.csv",
            &["location_id", "date", "payment_id"],
        ),
        StreamDescriptor::csv(
            "time_entries",
            "TimeEntries.csv",
            &["location_id", "date", "id"],
        ),
        StreamDescriptor {
            name: "menu_menus",
            source: SourceKind::Flattened {
                file_pattern: MENU_EXPORT_PATTERN,
                flattener: menu_flattener(1),
            },
            primary_keys: &["location_id", "date", "guid"],
            generate_unique_ids: true,
        },
        StreamDescriptor {
            name: "menu_groups",
            source: SourceKind::Flattened {
                file_pattern: MENU_EXPORT_PATTERN,
                flattener: menu_flattener(2),
            },
            primary_keys: &["location_id", "date", "menu_guid", "guid"],
            generate_unique_ids: true,
        },
        StreamDescriptor {
            name: "menu_items",
            source: SourceKind::Flattened {
                file_pattern: MENU_EXPORT_PATTERN,
                flattener: menu_flattener(3),
            },
            primary_keys: &["location_id", "date", "menu_guid", "group_guid", "guid"],
            generate_unique_ids: true,
        },
        StreamDescriptor {
            name: "menu_option_groups",
            source: SourceKind::Flattened {
                file_pattern: MENU_EXPORT_PATTERN,
                flattener: menu_flattener(4),
            },
            primary_keys: &[
                "location_id",
                "date",
                "menu_guid",
                "group_guid",
                "item_guid",
                "guid",
            ],
            generate_unique_ids: true,
        },
        StreamDescriptor {
            name: "menu_option_items",
            source: SourceKind::Flattened {
                file_pattern: MENU_EXPORT_PATTERN,
                flattener: menu_flattener(5),
            },
            primary_keys: &[
                "location_id",
                "date",
                "menu_guid",
                "group_guid",
                "item_guid",
                "option_group_guid",
                "guid",
            ],
            generate_unique_ids: true,
        },
        StreamDescriptor {
            name: "menu_prices",
            source: SourceKind::Flattened {
                file_pattern: MENU_EXPORT_PATTERN,
                flattener: price_flattener(),
            },
            primary_keys: &[
                "location_id",
                "date",
                "menu_guid",
                "group_guid",
                "item_guid",
                "price_id",
            ],
            generate_unique_ids: true,
        },
    ]
});

/// All built-in streams, in catalog order
pub fn builtin_streams() -> &'static [StreamDescriptor] {
    &STREAMS
}

/// Look up a stream descriptor by name
pub fn find_stream(name: &str) -> Option<&'static StreamDescriptor> {
    STREAMS.iter().find(|s| s.name == name)
}
