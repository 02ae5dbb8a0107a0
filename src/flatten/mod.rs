//! Hierarchical record flattening
//!
//! Menu exports are deeply nested JSON documents (menus contain groups,
//! groups contain items, items contain option groups and prices). Each
//! nesting depth is published as its own flat stream. A [`Flattener`]
//! describes one such stream as a path of [`LevelSpec`]s from the root
//! collection down to the emitted depth; walking the document yields one
//! record per node at that depth, stamped with every ancestor identifier
//! plus `location_id`/`date`.
//!
//! Identifier rules live in [`keys`]: records missing configured primary
//! key fields either get a deterministic synthesized value or are
//! dropped, and price rows (which have no guid of their own) get a
//! stable line-item identifier.

mod keys;
mod types;
mod walker;

pub use keys::{line_item_id, synthesize_unique_id, validate_primary_keys};
pub use types::{Flattener, LevelSpec};
