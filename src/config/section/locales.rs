//! `[locales]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [locales]
//! languages = ["en", "ar"]    # Empty: every {lang}.json in the locales dir
//! default = "en"              # Redirect target, owner of backend files
//! source = "en"               # Language the templates are written in
//! rtl = ["ar", "he", "fa", "ur"]
//! multilang = true            # false: render `default` only, at the output root
//! ```

use std::io;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::locale::{Locale, LocaleDirs, discover_locales};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalesConfig {
    pub languages: Vec<String>,
    pub default: String,
    pub source: String,
    pub rtl: Vec<String>,
    pub multilang: bool,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            default: "en".into(),
            source: "en".into(),
            rtl: ["ar", "he", "fa", "ur"].map(String::from).to_vec(),
            multilang: true,
        }
    }
}

impl LocalesConfig {
    pub const FIELD_DEFAULT: FieldPath = FieldPath::new("locales.default");
    pub const FIELD_SOURCE: FieldPath = FieldPath::new("locales.source");
    pub const FIELD_LANGUAGES: FieldPath = FieldPath::new("locales.languages");

    /// Locales to render, in order.
    ///
    /// Single-language sites render only the default locale.
    pub fn resolve(&self, dirs: &LocaleDirs) -> io::Result<Vec<Locale>> {
        if !self.multilang {
            return Ok(vec![Locale::new(&self.default, &self.rtl)]);
        }
        let codes = if self.languages.is_empty() {
            discover_locales(dirs)?
        } else {
            self.languages.clone()
        };
        Ok(codes.into_iter().map(|code| Locale::new(code, &self.rtl)).collect())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.default.trim().is_empty() {
            diag.error(Self::FIELD_DEFAULT, "default locale must not be empty");
        }
        if self.source.trim().is_empty() {
            diag.error(Self::FIELD_SOURCE, "source language must not be empty");
        }
        if !self.languages.is_empty() && !self.languages.contains(&self.default) {
            diag.error_with_hint(
                Self::FIELD_LANGUAGES,
                format!("default locale `{}` is not listed", self.default),
                "add it to `locales.languages` or leave the list empty",
            );
        }
        let mut seen = Vec::new();
        for lang in &self.languages {
            if seen.contains(&lang) {
                diag.error(Self::FIELD_LANGUAGES, format!("`{lang}` listed twice"));
            }
            seen.push(lang);
        }
    }
}
