//! In-run caches
//!
//! Two caches keep a run from touching the remote server more than once
//! for the same data:
//! - [`ContentCache`] holds raw file bytes keyed by location, date
//!   folder, and path. Several streams read the same menu export file;
//!   only the first one pays for the transfer.
//! - [`RecordCache`] holds extracted record batches keyed by stream name
//!   and a context fingerprint, so child streams iterating many parent
//!   contexts trigger at most one physical extraction each.
//!
//! Both caches are scoped to a single run and cleared explicitly; there
//! is no TTL or size-based eviction.

mod content;
mod records;

pub use content::ContentCache;
pub use records::{context_fingerprint, RecordCache};
