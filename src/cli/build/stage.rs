//! Re-runnable slices of the build, selected by the watcher.

use anyhow::Result;
use std::fmt;

use super::{build_site, pages::render_site, pipeline};
use crate::{
    asset::{Bundle, build_bundle},
    config::SiteConfig,
    core::BuildMode,
};

/// A part of the build that can run on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    /// Stylesheets, then pages (critical CSS is inlined into them)
    Styles,
    /// One script bundle
    Script(Bundle),
    /// Templates and locale data
    Pages,
    /// Plain asset copy
    Assets,
    /// Vendor tree and PHP files
    Backend,
    /// Everything, e.g. after a config change
    Full,
}

impl BuildStage {
    /// A full build covers every other stage.
    pub fn covers(self, other: Self) -> bool {
        self == Self::Full || self == other || (self == Self::Styles && other == Self::Pages)
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Styles => f.write_str("styles"),
            Self::Script(bundle) => write!(f, "{}", bundle.name),
            Self::Pages => f.write_str("pages"),
            Self::Assets => f.write_str("assets"),
            Self::Backend => f.write_str("backend"),
            Self::Full => f.write_str("site"),
        }
    }
}

/// Run one stage against the current output tree.
pub fn run_stage(stage: BuildStage, config: &SiteConfig, mode: BuildMode) -> Result<()> {
    match stage {
        BuildStage::Styles => {
            pipeline::build_styles(config)?;
            render_site(config)?;
        }
        BuildStage::Script(bundle) => {
            build_bundle(bundle, &config.paths.assets, &config.paths.js_dir(), mode)?;
        }
        BuildStage::Pages => {
            render_site(config)?;
        }
        BuildStage::Assets => pipeline::copy_site_assets(config, false)?,
        BuildStage::Backend => pipeline::copy_site_backend(config, false)?,
        BuildStage::Full => build_site(config, mode)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::BUNDLES;
    use crate::config::test_site_config;
    use crate::utils::path::write_file;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_covers() {
        assert!(BuildStage::Full.covers(BuildStage::Pages));
        assert!(BuildStage::Styles.covers(BuildStage::Pages));
        assert!(!BuildStage::Pages.covers(BuildStage::Styles));
        assert!(!BuildStage::Script(BUNDLES[0]).covers(BuildStage::Script(BUNDLES[1])));
    }

    #[test]
    fn test_display() {
        assert_eq!(BuildStage::Script(BUNDLES[1]).to_string(), "post-script");
        assert_eq!(BuildStage::Full.to_string(), "site");
    }

    #[test]
    fn test_script_stage_builds_one_bundle() {
        let temp = TempDir::new().unwrap();
        let config = test_site_config(temp.path());
        write_file(&config.paths.assets.join("js/a.js"), "var a = 1;").unwrap();
        write_file(&config.paths.assets.join("post-js/b.js"), "var b = 2;").unwrap();

        run_stage(BuildStage::Script(BUNDLES[0]), &config, BuildMode::DEVELOPMENT).unwrap();
        let js_dir = config.paths.js_dir();
        assert_eq!(fs::read_to_string(js_dir.join("script.min.js")).unwrap(), "var a = 1;");
        assert!(!js_dir.join("post-script.js").exists());
    }

    #[test]
    fn test_assets_stage_copies_new_files() {
        let temp = TempDir::new().unwrap();
        let config = test_site_config(temp.path());
        write_file(&config.paths.assets.join("images/logo.svg"), "<svg/>").unwrap();

        run_stage(BuildStage::Assets, &config, BuildMode::DEVELOPMENT).unwrap();
        assert!(config.paths.output_assets().join("images/logo.svg").exists());
    }
}
