//! Locale data: dictionaries, override files and their merge.
//!
//! ```text
//! locales/
//! ├── en.json                 # global dictionary for `en`
//! ├── en/about.json           # page override (pages/about.html)
//! └── en/blog/hello.json      # collection entry override
//! ```
//!
//! Loading is best-effort: the caller decides what a [`DataLoadError`] means,
//! the build path replaces it with an empty mapping via [`load_or_empty`].

mod loader;
mod merge;

pub use loader::{
    DataLoadError, LocaleDirs, collection_entries, discover_locales, load_locale_data,
    load_or_empty, overlay_entity,
};
pub(crate) use loader::report as report_load_error;
pub use merge::merge;

use std::fmt;
use std::path::PathBuf;

/// Key/value data handed to templates.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }

    #[inline]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

/// A language the site is rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub code: String,
    pub direction: Direction,
}

impl Locale {
    /// Build a locale, picking its direction from the configured RTL list.
    pub fn new(code: impl Into<String>, rtl: &[String]) -> Self {
        let code = code.into();
        let direction = if rtl.iter().any(|c| c.eq_ignore_ascii_case(&code)) {
            Direction::Rtl
        } else {
            Direction::Ltr
        };
        Self { code, direction }
    }

    #[cfg(test)]
    pub fn ltr(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            direction: Direction::Ltr,
        }
    }

    #[cfg(test)]
    pub fn rtl(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            direction: Direction::Rtl,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Repeatable content types, each rendered from one shared template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Work,
    Services,
    Blog,
    Careers,
    Impact,
}

impl Collection {
    pub const ALL: [Self; 5] = [
        Self::Work,
        Self::Services,
        Self::Blog,
        Self::Careers,
        Self::Impact,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Services => "services",
            Self::Blog => "blog",
            Self::Careers => "careers",
            Self::Impact => "impact",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an override file is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// A simple page, keyed by its template file stem.
    Page(String),
    /// One entry of a collection.
    Entry { collection: Collection, id: String },
}

impl EntityRef {
    pub fn page(stem: impl Into<String>) -> Self {
        Self::Page(stem.into())
    }

    pub fn entry(collection: Collection, id: impl Into<String>) -> Self {
        Self::Entry {
            collection,
            id: id.into(),
        }
    }

    /// Override file path relative to the locale's directory.
    pub fn override_path(&self) -> PathBuf {
        match self {
            Self::Page(stem) => PathBuf::from(format!("{stem}.json")),
            Self::Entry { collection, id } => {
                PathBuf::from(collection.as_str()).join(format!("{id}.json"))
            }
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(stem) => f.write_str(stem),
            Self::Entry { collection, id } => write!(f, "{collection}/{id}"),
        }
    }
}
