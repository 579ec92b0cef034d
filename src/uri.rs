//! Remote URL construction and argument checks.
//!
//! Object URIs are relative to the storage account URL:
//!
//! ```text
//! container
//! container/path/to/object
//! ```
//!
//! Each `/`-separated segment is percent-encoded and appended to the account
//! URL, so `photos/2024/cat 1.png` becomes `<account>/photos/2024/cat%201.png`.

use std::io;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{OfsError, Result};

/// Parse the storage account URL, rejecting URLs that cannot carry a path.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let url =
        Url::parse(raw).map_err(|e| OfsError::InvalidUrl(format!("storage URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(OfsError::InvalidUrl(format!(
            "storage URL {raw:?} cannot carry a path"
        )));
    }
    Ok(url)
}

/// Segments of an object URI; empty, `.` and `..` segments are dropped.
fn segments(uri: &str) -> impl Iterator<Item = &str> {
    uri.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Append an object URI below `base`.
pub(crate) fn join(base: &Url, uri: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| OfsError::InvalidUrl(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments(uri));
    Ok(url)
}

/// Container arguments name a single top-level namespace, never a path.
pub(crate) fn ensure_container(container: &str) -> Result<&str> {
    if container.contains('/') {
        return Err(OfsError::InvalidContainer(container.to_string()));
    }
    Ok(container)
}

/// Upload destinations are directories; a `.` marks a file path.
pub(crate) fn ensure_put_path(put_path: &str) -> Result<&str> {
    if put_path.contains('.') {
        return Err(OfsError::InvalidPutPath(put_path.to_string()));
    }
    Ok(put_path)
}

/// Local destination for a downloaded object.
///
/// Built from the same segments as the request URL, so the result always
/// stays below `output_dir`. With `omit_folders` only the last segment is kept.
pub(crate) fn download_path(output_dir: &Path, uri: &str, omit_folders: bool) -> PathBuf {
    let mut path = output_dir.to_path_buf();
    if omit_folders {
        path.extend(segments(uri).last());
    } else {
        path.extend(segments(uri));
    }
    path
}

/// Remote object name for an uploaded file: its file name component.
pub(crate) fn upload_name(local_file: &Path) -> Result<&str> {
    local_file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            OfsError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no UTF-8 file name", local_file.display()),
            ))
        })
}
