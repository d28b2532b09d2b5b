//! Maps changed paths to the build stages that must re-run.

use std::path::{Path, PathBuf};

use crate::asset::Bundle;
use crate::cli::build::BuildStage;
use crate::config::SiteConfig;
use crate::render::TEMPLATE_EXTS;

/// Stage a change to `path` triggers, if any.
pub(super) fn classify(path: &Path, config: &SiteConfig) -> Option<BuildStage> {
    let paths = &config.paths;

    if path == config.config_path {
        return Some(BuildStage::Full);
    }
    if path.starts_with(&paths.output) || path.starts_with(&paths.prod) {
        return None;
    }
    if path.starts_with(&paths.vendor) {
        return Some(BuildStage::Backend);
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    if matches!(ext, "scss" | "sass") {
        return Some(BuildStage::Styles);
    }

    if let Ok(rel) = path.strip_prefix(&paths.assets) {
        if ext == "js"
            && let Some(bundle) = bundle_dir(rel).and_then(Bundle::for_dir)
        {
            return Some(BuildStage::Script(bundle));
        }
        return Some(BuildStage::Assets);
    }

    if path.starts_with(&paths.locales) {
        return (ext == "json").then_some(BuildStage::Pages);
    }

    if !path.starts_with(&paths.source) {
        return None;
    }
    if TEMPLATE_EXTS.contains(&ext) {
        return Some(BuildStage::Pages);
    }
    (ext == "php").then_some(BuildStage::Backend)
}

/// `js/app.js` → `js`; bundles only take files directly inside their dir.
fn bundle_dir(rel: &Path) -> Option<&str> {
    let mut components = rel.components();
    let dir = components.next()?.as_os_str().to_str()?;
    components.next()?;
    components.next().is_none().then_some(dir)
}

/// Deduplicated stages for a batch of changes, in pipeline order.
pub(super) fn plan_stages(changed: &[PathBuf], config: &SiteConfig) -> Vec<BuildStage> {
    let mut stages: Vec<BuildStage> = Vec::new();

    for stage in changed.iter().filter_map(|path| classify(path, config)) {
        if stages.iter().any(|s| s.covers(stage)) {
            continue;
        }
        stages.retain(|s| !stage.covers(*s));
        stages.push(stage);
    }

    stages.sort_by_key(|stage| rank(*stage));
    stages
}

fn rank(stage: BuildStage) -> u8 {
    match stage {
        BuildStage::Full => 0,
        BuildStage::Styles => 1,
        BuildStage::Assets => 2,
        BuildStage::Script(_) => 3,
        BuildStage::Pages => 4,
        BuildStage::Backend => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::BUNDLES;
    use crate::config::test_site_config;

    fn config() -> SiteConfig {
        test_site_config(Path::new("/site"))
    }

    fn stage(rel: &str) -> Option<BuildStage> {
        classify(&Path::new("/site").join(rel), &config())
    }

    #[test]
    fn test_classify_styles() {
        assert_eq!(stage("src/assets/scss/style.scss"), Some(BuildStage::Styles));
        assert_eq!(stage("src/assets/scss/partials/_nav.scss"), Some(BuildStage::Styles));
    }

    #[test]
    fn test_classify_bundles() {
        assert_eq!(stage("src/assets/js/app.js"), Some(BuildStage::Script(BUNDLES[0])));
        assert_eq!(stage("src/assets/post-js/late.js"), Some(BuildStage::Script(BUNDLES[1])));
        assert_eq!(
            stage("src/assets/critical-js/boot.js"),
            Some(BuildStage::Script(BUNDLES[2]))
        );
        // nested files are not part of a bundle
        assert_eq!(stage("src/assets/js/lib/x.js"), Some(BuildStage::Assets));
        assert_eq!(stage("src/assets/vendor-js/x.js"), Some(BuildStage::Assets));
    }

    #[test]
    fn test_classify_pages() {
        assert_eq!(stage("src/pages/index.html"), Some(BuildStage::Pages));
        assert_eq!(stage("src/comps/blog/index.nunjucks"), Some(BuildStage::Pages));
        assert_eq!(stage("src/partials/nav.njk"), Some(BuildStage::Pages));
        assert_eq!(stage("src/locales/ar.json"), Some(BuildStage::Pages));
        assert_eq!(stage("src/locales/ar/blog/first.json"), Some(BuildStage::Pages));
        assert_eq!(stage("src/locales/notes.txt"), None);
    }

    #[test]
    fn test_classify_backend_and_assets() {
        assert_eq!(stage("src/vendor/lib/index.html"), Some(BuildStage::Backend));
        assert_eq!(stage("src/api/contact.php"), Some(BuildStage::Backend));
        assert_eq!(stage("src/assets/images/logo.svg"), Some(BuildStage::Assets));
    }

    #[test]
    fn test_classify_ignored() {
        assert_eq!(stage("dist/en/index.html"), None);
        assert_eq!(stage("prod/en/index.html"), None);
        assert_eq!(stage("README.md"), None);
        assert_eq!(stage("src/notes.md"), None);
    }

    #[test]
    fn test_config_change_is_full() {
        assert_eq!(stage("site.toml"), Some(BuildStage::Full));
    }

    #[test]
    fn test_plan_dedup_and_order() {
        let root = Path::new("/site");
        let changed = vec![
            root.join("src/pages/index.html"),
            root.join("src/locales/en.json"),
            root.join("src/assets/js/a.js"),
            root.join("src/assets/js/b.js"),
            root.join("src/assets/images/x.png"),
        ];
        assert_eq!(
            plan_stages(&changed, &config()),
            vec![
                BuildStage::Assets,
                BuildStage::Script(BUNDLES[0]),
                BuildStage::Pages
            ]
        );
    }

    #[test]
    fn test_plan_styles_cover_pages() {
        let root = Path::new("/site");
        let changed = vec![
            root.join("src/pages/index.html"),
            root.join("src/assets/scss/style.scss"),
        ];
        assert_eq!(plan_stages(&changed, &config()), vec![BuildStage::Styles]);
    }

    #[test]
    fn test_plan_full_covers_everything() {
        let root = Path::new("/site");
        let changed = vec![root.join("src/assets/js/a.js"), root.join("site.toml")];
        assert_eq!(plan_stages(&changed, &config()), vec![BuildStage::Full]);
    }
}
