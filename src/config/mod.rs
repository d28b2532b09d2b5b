//! Site configuration management for `site.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   ├── locales    # [locales]
//! │   ├── build      # [build]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults and the
//! site root becomes the working directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildConfig, LocalesConfig, PathsConfig, RenderErrorPolicy, ServeConfig};
pub use types::{
    ConfigDiagnostics, ConfigError, FieldPath, cfg, clear_clean_flag, init_config, reload_config,
};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
    locale::{Locale, LocaleDirs},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing site.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub locales: LocalesConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.apply_path_overrides(cli);
        self.normalize_paths(&root);
        self.apply_command_options(cli);
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {}", field);
        }
        eprintln!();
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Layout of the locales directory.
    pub fn locale_dirs(&self) -> LocaleDirs {
        LocaleDirs::new(&self.paths.locales)
    }

    /// Locales this build renders.
    pub fn resolve_locales(&self) -> Result<Vec<Locale>> {
        self.locales
            .resolve(&self.locale_dirs())
            .with_context(|| format!("failed to list locales in {}", self.paths.locales.display()))
    }

    /// Where pages of `lang` are written.
    pub fn locale_output(&self, lang: &str) -> PathBuf {
        if self.locales.multilang {
            self.paths.output.join(lang)
        } else {
            self.paths.output.clone()
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_path_overrides(&mut self, cli: &Cli) {
        if let Some(source) = &cli.source {
            // derived source paths follow the overridden root unless configured
            let defaults = PathsConfig::default();
            for (path, default) in [
                (&mut self.paths.locales, &defaults.locales),
                (&mut self.paths.pages, &defaults.pages),
                (&mut self.paths.comps, &defaults.comps),
                (&mut self.paths.assets, &defaults.assets),
                (&mut self.paths.vendor, &defaults.vendor),
            ] {
                if path == default
                    && let Ok(rel) = default.strip_prefix(&defaults.source)
                {
                    *path = source.join(rel);
                }
            }
            self.paths.source = source.clone();
        }
        Self::update_option(&mut self.paths.output, cli.output.as_ref());
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } | Commands::Watch { build_args } => {
                self.apply_build_args(build_args);
            }
            Commands::Serve {
                build_args,
                interface,
                port,
                watch,
            } => {
                self.apply_build_args(build_args);
                self.apply_serve_options(*interface, *port, *watch);
            }
            Commands::Clean => {}
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.render_errors, args.render_errors.as_ref());
        self.build.clean = args.clean;
        self.build.prod |= args.prod;
    }

    /// Apply serve-specific options.
    fn apply_serve_options(
        &mut self,
        interface: Option<std::net::IpAddr>,
        port: Option<u16>,
        watch: Option<bool>,
    ) {
        Self::update_option(&mut self.serve.interface, interface.as_ref());
        Self::update_option(&mut self.serve.port, port.as_ref());
        Self::update_option(&mut self.serve.watch, watch.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.set_root(&root);
        self.config_path = crate::utils::path::normalize_path(&self.config_path);
        self.paths.normalize(&root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&mut diag);
        self.locales.validate(&mut diag);
        self.build.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with default sections, as if loaded from
/// `root/site.toml`.
#[cfg(test)]
pub fn test_site_config(root: &Path) -> SiteConfig {
    let mut config = SiteConfig {
        config_path: root.join("site.toml"),
        ..SiteConfig::default()
    };
    config.normalize_paths(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::from_str("[paths\nsource = \"src\"").is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.root, PathBuf::new());
        assert!(config.build.minify);
        assert_eq!(config.serve.port, 8000);
        assert_eq!(config.locales.default, "en");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\noutput = \"public\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.paths.output, PathBuf::from("public"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_unknown_nested_field_detected() {
        let content = "[locales]\ndefualt = \"ar\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.locales.default, "en");
        assert_eq!(ignored, vec!["locales.defualt"]);
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[build]\nminify = false\n[serve]\nport = 9000";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_normalize_against_root() {
        let config = test_site_config(Path::new("/site"));
        assert_eq!(config.paths.output, PathBuf::from("/site/dist"));
        assert_eq!(config.paths.pages, PathBuf::from("/site/src/pages"));
        assert_eq!(config.locale_output("ar"), PathBuf::from("/site/dist/ar"));
    }

    #[test]
    fn test_single_language_output_root() {
        let mut config = test_site_config(Path::new("/site"));
        config.locales.multilang = false;
        assert_eq!(config.locale_output("en"), PathBuf::from("/site/dist"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "lisan",
            "-s",
            "web",
            "-o",
            "public",
            "serve",
            "--minify=false",
            "-p",
            "9000",
        ])
        .unwrap();

        let mut config = SiteConfig {
            config_path: PathBuf::from("/site/site.toml"),
            ..SiteConfig::default()
        };
        config.finalize(&cli);

        assert_eq!(config.paths.source, PathBuf::from("/site/web"));
        assert_eq!(config.paths.pages, PathBuf::from("/site/web/pages"));
        assert_eq!(config.paths.output, PathBuf::from("/site/public"));
        assert!(!config.build.minify);
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_validate_reports_all_sections() {
        let mut config = test_site_config(Path::new("/site"));
        config.locales.default = String::new();
        config.build.critical_placeholder = String::new();

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 2);
    }
}
