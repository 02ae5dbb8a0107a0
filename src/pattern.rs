//! Filename wildcard matching
//!
//! Remote drops name export files with embedded timestamps
//! (`MenuExport_20250601_031502.json`), so streams select their files
//! with simple `*` wildcards. Only `*` is supported; there is no `?`,
//! no character classes, and no path separators - patterns match a bare
//! file name.

/// Match `name` against `pattern`, where `*` matches any run of
/// characters (including none).
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut pos = 0;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !name.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == last {
            // The trailing literal must fit after everything matched so far
            return name.ends_with(part) && name.len() - part.len() >= pos;
        } else {
            match name[pos..].find(part) {
                Some(offset) => pos += offset + part.len(),
                None => return false,
            }
        }
    }

    true
}
