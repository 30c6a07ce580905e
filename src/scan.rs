//! Directory scanning utilities for discovering image files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::DEFAULT_MAX_FILES;

/// Extensions (lowercase, without dot) shown by the slideshow.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// Options controlling directory scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Upper bound on returned entries; the rest are dropped.
    pub max_files: usize,
    /// Optional override for allowed extensions (lowercase, without dot).
    pub exts: Option<Vec<&'static str>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            exts: None,
        }
    }
}

/// Return `true` if `path` has an allowed image extension.
#[must_use]
pub fn is_supported_image(path: &Path, exts: Option<&[&str]>) -> bool {
    let exts = exts.unwrap_or(DEFAULT_EXTENSIONS);
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
}

/// Recursively list images under `root`, depth-first, in file-name order.
///
/// Unreadable entries are skipped and a missing or non-directory root yields
/// an empty list.
/// At most `opts.max_files` paths are returned.
#[must_use]
pub fn scan(root: &Path, opts: &ScanOptions) -> Vec<PathBuf> {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    if !root.is_dir() {
        debug!(root = %root.display(), "scan: root is not a directory");
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut truncated = false;

    for entry in WalkDir::new(&root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "scan: skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_supported_image(entry.path(), opts.exts.as_deref())
        {
            continue;
        }
        if out.len() >= opts.max_files {
            truncated = true;
            break;
        }
        out.push(entry.into_path());
    }

    if truncated {
        warn!(
            root = %root.display(),
            max_files = opts.max_files,
            "scan hit the file cap; remaining images ignored"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(is_supported_image(Path::new("/a/B.JPG"), None));
        assert!(is_supported_image(Path::new("c.Jpeg"), None));
        assert!(is_supported_image(Path::new("d.gif"), None));
        assert!(is_supported_image(Path::new("e.bmp"), None));
        assert!(!is_supported_image(Path::new("f.webp"), None));
        assert!(!is_supported_image(Path::new("noext"), None));
    }

    #[test]
    fn extension_override_replaces_defaults() {
        let exts = ["webp"];
        assert!(is_supported_image(Path::new("a.WEBP"), Some(&exts[..])));
        assert!(!is_supported_image(Path::new("a.jpg"), Some(&exts[..])));
    }
}
