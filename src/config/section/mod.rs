//! Configuration section definitions.
//!
//! Each module corresponds to a section in `site.toml`:
//!
//! | Module    | TOML Section  | Purpose                                  |
//! |-----------|---------------|------------------------------------------|
//! | `paths`   | `[paths]`     | Source, locale, asset and output dirs    |
//! | `locales` | `[locales]`   | Languages, default, RTL list             |
//! | `build`   | `[build]`     | Minification, render failure policy      |
//! | `serve`   | `[serve]`     | Development server and live reload       |

mod build;
mod locales;
mod paths;
mod serve;

pub use build::{BuildConfig, RenderErrorPolicy};
pub use locales::LocalesConfig;
pub use paths::PathsConfig;
pub use serve::ServeConfig;
