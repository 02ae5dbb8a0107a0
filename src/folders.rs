//! Date folder resolution
//!
//! Each location directory contains one folder per business day, named
//! `YYYYMMDD`. Only the latest folder is extracted. Candidates are
//! identified by name alone (8 digits) so a location with years of
//! history costs a single listing plus one stat call, not one stat per
//! folder.

use crate::error::Result;
use crate::sftp::RemoteFs;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Whether `name` looks like a `YYYYMMDD` date folder
pub fn is_date_folder(name: &str) -> bool {
    name.len() == 8 && name.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a date folder name into a calendar date
pub fn folder_date(name: &str) -> Option<NaiveDate> {
    if !is_date_folder(name) {
        return None;
    }
    let year: i32 = name[..4].parse().ok()?;
    let month: u32 = name[4..6].parse().ok()?;
    let day: u32 = name[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Pick the latest date folder from a directory listing.
///
/// Zero-padded `YYYYMMDD` names order the same lexicographically and
/// chronologically, so this is a plain max over the candidates.
pub fn pick_latest<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().filter(|n| is_date_folder(n)).max()
}

/// Resolve the latest date folder under `/{location_id}`.
///
/// Only the chosen candidate is verified to be a directory. If that
/// check fails there is no fallback to the next-latest name; a file
/// masquerading as the newest date folder means the drop layout is
/// broken and silently reading an older day would hide it.
pub async fn resolve_latest<F>(fs: &F, location_id: &str) -> Result<Option<String>>
where
    F: RemoteFs + ?Sized,
{
    let location_path = format!("/{location_id}");
    info!("Finding latest date folder in {location_path}");

    let entries = fs.list_dir(&location_path).await?;
    if entries.is_empty() {
        info!("No items found in {location_path}");
        return Ok(None);
    }

    let candidates: Vec<&str> = entries
        .iter()
        .map(String::as_str)
        .filter(|n| is_date_folder(n))
        .collect();

    let Some(latest) = pick_latest(candidates.iter().copied()) else {
        info!("No date folders found in {location_path}");
        return Ok(None);
    };

    let latest_path = format!("{location_path}/{latest}");
    if !fs.is_directory(&latest_path).await? {
        warn!("Latest date folder candidate {latest} is not a directory");
        return Ok(None);
    }

    info!(
        "Found {} date folder candidates. Using latest: {latest}",
        candidates.len()
    );
    Ok(Some(latest.to_string()))
}
