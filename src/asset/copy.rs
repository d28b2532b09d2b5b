//! Plain file copies into the output tree.

use std::io;
use std::path::Path;

use crate::embed::build::{REDIRECT_HTML, RedirectVars};
use crate::utils::path::{collect_all_files, copy_file, copy_tree, is_newer_than, write_file};

/// `src/assets/**` → `dist/assets/**`.
///
/// Files already up to date are skipped unless `force` is set.
pub fn copy_assets(assets: &Path, target: &Path, force: bool) -> io::Result<usize> {
    copy_tree(assets, target, force)
}

/// Server-side files for the default locale: `vendor/**` and every `*.php`
/// below the source root, relative paths kept.
pub fn copy_backend(source: &Path, vendor: &Path, target: &Path, force: bool) -> io::Result<usize> {
    let mut copied = copy_tree(vendor, &target.join("vendor"), force)?;

    for file in collect_all_files(source) {
        if file.starts_with(vendor) || file.extension().is_none_or(|ext| ext != "php") {
            continue;
        }
        let rel = file.strip_prefix(source).unwrap_or(&file);
        let dest = target.join(rel);
        if !force && dest.exists() && !is_newer_than(&file, &dest) {
            continue;
        }
        copy_file(&file, &dest)?;
        copied += 1;
    }
    Ok(copied)
}

/// Write `dist/index.html` forwarding to the default locale.
pub fn write_redirect(output: &Path, default_locale: &str) -> io::Result<()> {
    let html = REDIRECT_HTML.render(&RedirectVars {
        default_locale: default_locale.to_string(),
    });
    write_file(&output.join("index.html"), html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copy_backend() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dist = temp.path().join("dist/en");
        write_file(&src.join("vendor/autoload.php"), "<?php").unwrap();
        write_file(&src.join("vendor/lib/a.txt"), "a").unwrap();
        write_file(&src.join("api/contact.php"), "<?php echo 1;").unwrap();
        write_file(&src.join("pages/index.html"), "x").unwrap();

        let count = copy_backend(&src, &src.join("vendor"), &dist, false).unwrap();
        assert_eq!(count, 3);
        assert!(dist.join("vendor/autoload.php").exists());
        assert!(dist.join("vendor/lib/a.txt").exists());
        assert_eq!(
            fs::read_to_string(dist.join("api/contact.php")).unwrap(),
            "<?php echo 1;"
        );
        assert!(!dist.join("pages/index.html").exists());
    }

    #[test]
    fn test_copy_assets_missing_source() {
        let temp = TempDir::new().unwrap();
        let count = copy_assets(&temp.path().join("nope"), &temp.path().join("out"), true).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_write_redirect() {
        let temp = TempDir::new().unwrap();
        write_redirect(temp.path(), "ar").unwrap();
        let html = fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert!(html.contains("url=./ar"));
    }
}
