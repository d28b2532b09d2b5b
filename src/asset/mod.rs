//! Stylesheets, script bundles and static files.
//!
//! ```text
//! src/assets/scss/style.scss    → dist/assets/css/style.css, style-rtl.css
//! src/assets/scss/critical.scss → dist/assets/css/critical.css, critical-rtl.css
//! dist/assets/css/*.css         → dist/assets/css/*.min.css
//! src/assets/js/*.js            → dist/assets/js/script.js, script.min.js
//! src/assets/**                 → dist/assets/**
//! ```

mod copy;
pub mod minify;
pub mod rtl;
mod script;
mod style;

pub use copy::{copy_assets, copy_backend, write_redirect};
pub use script::{BUNDLES, Bundle, build_bundle, build_bundles, concat_sources};
pub use style::{STYLESHEETS, build_stylesheets, compile_stylesheet, minify_stylesheets};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to compile `{0}`")]
    Sass(PathBuf, #[source] Box<grass::Error>),

    #[error("failed to minify `{0}`: {1}")]
    Css(PathBuf, String),

    #[error("failed to minify bundle `{0}`: {1}")]
    Js(String, String),

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] io::Error),
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |e| Self::Io(path, e)
    }
}
