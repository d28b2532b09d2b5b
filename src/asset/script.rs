//! Script bundles: every `*.js` in a source directory concatenated into one
//! file, plus its minified twin.

use std::fs;
use std::path::{Path, PathBuf};

use super::minify::minify_js;
use super::AssetError;
use crate::core::BuildMode;
use crate::debug;
use crate::utils::path::write_file;

/// A script bundle and the assets sub-directory it is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bundle {
    pub name: &'static str,
    pub dir: &'static str,
}

pub const BUNDLES: [Bundle; 3] = [
    Bundle {
        name: "script",
        dir: "js",
    },
    Bundle {
        name: "post-script",
        dir: "post-js",
    },
    Bundle {
        name: "critical-script",
        dir: "critical-js",
    },
];

impl Bundle {
    /// Bundle built from the assets sub-directory `dir`.
    pub fn for_dir(dir: &str) -> Option<Self> {
        BUNDLES.into_iter().find(|b| b.dir == dir)
    }
}

/// Concatenate the `*.js` files directly inside `dir` in sorted order.
///
/// `None` when the directory does not exist.
pub fn concat_sources(dir: &Path) -> Result<Option<String>, AssetError> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(None);
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "js"))
        .collect();
    files.sort();

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        parts.push(fs::read_to_string(file).map_err(AssetError::io(file))?);
    }
    Ok(Some(parts.join("\n")))
}

/// Build one bundle from `assets/{dir}` into `js_dir`.
///
/// Returns the path of the `.min.js` file, or `None` if the bundle has no
/// source directory.
pub fn build_bundle(
    bundle: Bundle,
    assets: &Path,
    js_dir: &Path,
    mode: BuildMode,
) -> Result<Option<PathBuf>, AssetError> {
    let Some(source) = concat_sources(&assets.join(bundle.dir))? else {
        debug!("script"; "no {} directory, skipping {}", bundle.dir, bundle.name);
        return Ok(None);
    };

    let minified = if mode.minify_scripts {
        minify_js(&source).map_err(|e| AssetError::Js(bundle.name.to_string(), e))?
    } else {
        source.clone()
    };

    let plain = js_dir.join(format!("{}.js", bundle.name));
    write_file(&plain, &source).map_err(AssetError::io(&plain))?;

    let min = js_dir.join(format!("{}.min.js", bundle.name));
    write_file(&min, minified).map_err(AssetError::io(&min))?;
    Ok(Some(min))
}

/// Build all bundles; returns how many were written.
pub fn build_bundles(assets: &Path, js_dir: &Path, mode: BuildMode) -> Result<usize, AssetError> {
    let mut count = 0;
    for bundle in BUNDLES {
        if build_bundle(bundle, assets, js_dir, mode)?.is_some() {
            count += 1;
        }
    }
    Ok(count)
}
