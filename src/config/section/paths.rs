//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "src"              # Template root; names are relative to it
//! locales = "src/locales"     # {lang}.json dictionaries and override dirs
//! pages = "src/pages"         # One output page per template
//! comps = "src/comps"         # {collection}/index.* templates
//! assets = "src/assets"       # scss/, js/, post-js/, critical-js/, static files
//! vendor = "src/vendor"       # Copied next to the default locale
//! output = "dist"
//! prod = "prod"               # Relativized production copy
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::{normalize_path, slash_relative};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source: PathBuf,
    pub locales: PathBuf,
    pub pages: PathBuf,
    pub comps: PathBuf,
    pub assets: PathBuf,
    pub vendor: PathBuf,
    pub output: PathBuf,
    pub prod: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            locales: "src/locales".into(),
            pages: "src/pages".into(),
            comps: "src/comps".into(),
            assets: "src/assets".into(),
            vendor: "src/vendor".into(),
            output: "dist".into(),
            prod: "prod".into(),
        }
    }
}

impl PathsConfig {
    pub const FIELD_PAGES: FieldPath = FieldPath::new("paths.pages");
    pub const FIELD_COMPS: FieldPath = FieldPath::new("paths.comps");
    pub const FIELD_OUTPUT: FieldPath = FieldPath::new("paths.output");

    /// Make every path absolute against `root`.
    pub fn normalize(&mut self, root: &Path) {
        for path in [
            &mut self.source,
            &mut self.locales,
            &mut self.pages,
            &mut self.comps,
            &mut self.assets,
            &mut self.vendor,
            &mut self.output,
            &mut self.prod,
        ] {
            *path = normalize_path(&root.join(&*path));
        }
    }

    /// Template name prefix of the pages directory (`pages`).
    pub fn pages_prefix(&self) -> String {
        slash_relative(&self.pages, &self.source)
    }

    /// Template name prefix of the components directory (`comps`).
    pub fn comps_prefix(&self) -> String {
        slash_relative(&self.comps, &self.source)
    }

    /// `{output}/assets`
    pub fn output_assets(&self) -> PathBuf {
        self.output.join("assets")
    }

    /// `{output}/assets/css`
    pub fn css_dir(&self) -> PathBuf {
        self.output_assets().join("css")
    }

    /// `{output}/assets/js`
    pub fn js_dir(&self) -> PathBuf {
        self.output_assets().join("js")
    }

    /// `{assets}/scss`
    pub fn scss_dir(&self) -> PathBuf {
        self.assets.join("scss")
    }

    /// Directories below the source root that never hold templates.
    pub fn template_excludes(&self) -> Vec<PathBuf> {
        vec![
            self.assets.clone(),
            self.vendor.clone(),
            self.locales.clone(),
            self.output.clone(),
        ]
    }

    /// Checks run after normalization.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, path) in [
            (Self::FIELD_PAGES, &self.pages),
            (Self::FIELD_COMPS, &self.comps),
        ] {
            if !path.starts_with(&self.source) {
                diag.error_with_hint(
                    field,
                    format!("`{}` is outside the source directory", path.display()),
                    "templates are named relative to `paths.source`",
                );
            }
        }
        if self.source.starts_with(&self.output) {
            diag.error(
                Self::FIELD_OUTPUT,
                "output directory must not contain the source directory",
            );
        }
    }
}
