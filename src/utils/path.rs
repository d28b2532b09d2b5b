//! Path helpers: normalization, recursive listing, tree copies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Collect all files below `dir`, recursively, in sorted order.
///
/// A missing directory yields an empty list.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect()
}

/// `path` relative to `root`, joined with forward slashes.
pub fn slash_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Check if file A is newer than file B
///
/// Returns `false` if either file doesn't exist or times can't be compared
pub fn is_newer_than(a: &Path, b: &Path) -> bool {
    let mtime = |p: &Path| p.metadata().and_then(|m| m.modified()).ok();
    let (Some(a_time), Some(b_time)) = (mtime(a), mtime(b)) else {
        return false;
    };
    a_time > b_time
}

/// Copy `file` to `target`, creating parent directories.
pub fn copy_file(file: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(file, target).map(|_| ())
}

/// Copy every file below `src` into `dst`, keeping relative paths.
///
/// Unless `force` is set, targets newer than their source are left alone.
/// Returns the number of files copied; a missing `src` copies nothing.
pub fn copy_tree(src: &Path, dst: &Path, force: bool) -> io::Result<usize> {
    let mut copied = 0;
    for file in collect_all_files(src) {
        let rel = file.strip_prefix(src).unwrap_or(&file);
        let target = dst.join(rel);
        if !force && target.exists() && !is_newer_than(&file, &target) {
            continue;
        }
        copy_file(&file, &target)?;
        copied += 1;
    }
    Ok(copied)
}
