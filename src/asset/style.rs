//! SCSS compilation and CSS minification.

use std::fs;
use std::path::{Path, PathBuf};

use grass::{Options, OutputStyle};

use super::minify::minify_css;
use super::rtl::flip_stylesheet;
use super::AssetError;
use crate::debug;
use crate::utils::path::write_file;

/// Entry stylesheets and the name of their mirrored variant.
pub const STYLESHEETS: [(&str, &str); 2] = [("style", "style-rtl"), ("critical", "critical-rtl")];

/// Compile one SCSS file to expanded CSS.
pub fn compile_stylesheet(path: &Path, load_paths: &[PathBuf]) -> Result<String, AssetError> {
    let options = load_paths
        .iter()
        .fold(Options::default().style(OutputStyle::Expanded), |options, dir| {
            options.load_path(dir)
        });
    grass::from_path(path, &options).map_err(|e| AssetError::Sass(path.to_path_buf(), e))
}

/// Compile every entry stylesheet found in `scss_dir` into `css_dir`,
/// writing the LTR file and its RTL mirror.
///
/// Returns the written paths. Missing entries are skipped.
pub fn build_stylesheets(scss_dir: &Path, css_dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let load_paths = [scss_dir.to_path_buf()];
    let mut written = Vec::new();

    for (name, rtl_name) in STYLESHEETS {
        let source = scss_dir.join(format!("{name}.scss"));
        if !source.is_file() {
            debug!("styles"; "no {}", source.display());
            continue;
        }

        let css = compile_stylesheet(&source, &load_paths)?;
        let rtl = flip_stylesheet(&css);

        for (file, content) in [(name, css), (rtl_name, rtl)] {
            let target = css_dir.join(format!("{file}.css"));
            write_file(&target, content).map_err(AssetError::io(&target))?;
            written.push(target);
        }
    }
    Ok(written)
}

/// Write `*.min.css` next to every other CSS file directly inside `css_dir`.
///
/// With `minify` off the content is copied verbatim.
pub fn minify_stylesheets(css_dir: &Path, minify: bool) -> Result<usize, AssetError> {
    let Ok(entries) = fs::read_dir(css_dir) else {
        return Ok(0);
    };

    let mut sources: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "css"))
        .filter(|p| {
            !p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.ends_with(".min"))
        })
        .collect();
    sources.sort();

    for source in &sources {
        let content = fs::read_to_string(source).map_err(AssetError::io(source))?;
        let output = if minify {
            minify_css(&content).map_err(|e| AssetError::Css(source.clone(), e))?
        } else {
            content
        };
        let target = source.with_extension("min.css");
        write_file(&target, output).map_err(AssetError::io(&target))?;
    }
    Ok(sources.len())
}
