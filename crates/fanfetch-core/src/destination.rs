//! Destination path derivation.
//!
//! A resource is saved under the output directory using the final segment of
//! its URL path. Two URLs sharing that segment map to the same file and the
//! later write wins; nothing here tries to disambiguate them.

use std::path::{Path, PathBuf};

/// Extracts the final path segment of `url` for use as a file name.
///
/// Query and fragment are ignored. Returns `None` when the URL cannot be
/// parsed, has no path, ends in `/`, or the segment is `.` / `..`.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Joins the URL's final path segment onto `output_dir`.
pub fn destination_path(output_dir: &Path, url: &str) -> Option<PathBuf> {
    file_name_from_url(url).map(|name| output_dir.join(name))
}
