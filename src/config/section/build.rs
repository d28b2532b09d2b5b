//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! minify = true                       # Minify HTML and CSS in every mode
//! render_errors = "fail"              # fail | warn
//! critical_placeholder = "[critical-css]"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// What to do with pages whose template fails to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderErrorPolicy {
    /// Render everything else, then fail the build listing every failure.
    #[default]
    Fail,
    /// Log the failure and skip the page.
    Warn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Minify HTML output and write minified CSS, for `serve` as well as
    /// `build`. Script bundles are only minified in production builds.
    pub minify: bool,

    /// Clean output directory before building (CLI only).
    #[serde(skip)]
    pub clean: bool,

    /// Write the relativized production copy after building.
    pub prod: bool,

    pub render_errors: RenderErrorPolicy,

    /// Marker replaced by the inlined critical stylesheet.
    pub critical_placeholder: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            minify: true,
            clean: false,
            prod: false,
            render_errors: RenderErrorPolicy::Fail,
            critical_placeholder: "[critical-css]".into(),
        }
    }
}

impl BuildConfig {
    pub const FIELD_PLACEHOLDER: FieldPath = FieldPath::new("build.critical_placeholder");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.critical_placeholder.trim().is_empty() {
            diag.error(Self::FIELD_PLACEHOLDER, "placeholder must not be empty");
        }
    }
}
