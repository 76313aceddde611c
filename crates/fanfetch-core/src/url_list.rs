//! Default URL list: a plain-text file with one URL per line.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UrlListError {
    #[error("cannot read URL list {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("URL list {} contains no URLs", path.display())]
    Empty { path: PathBuf },
}

/// Parses list contents: whitespace is trimmed; blank lines and `#` comments are skipped.
/// Order is preserved.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads and parses the URL list at `path`. A missing, unreadable or empty file is an error.
pub fn load_url_list(path: &Path) -> Result<Vec<String>, UrlListError> {
    let contents = fs::read_to_string(path).map_err(|source| UrlListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_url_list(&contents);
    if urls.is_empty() {
        return Err(UrlListError::Empty {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(path = %path.display(), count = urls.len(), "loaded URL list");
    Ok(urls)
}
