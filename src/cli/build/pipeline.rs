use anyhow::{Context, Result};
use std::fs;

use crate::{
    asset::{build_bundles, build_stylesheets, copy_assets, copy_backend, minify_stylesheets, write_redirect},
    config::SiteConfig,
    core::BuildMode,
    debug, log,
    rewrite::{ProdRewriter, export_prod},
    utils::plural_count,
};

/// Whether this build minifies CSS and HTML.
///
/// Applies to every build mode; only script bundles are left unminified in
/// development.
pub(super) fn minify_output(config: &SiteConfig) -> bool {
    config.build.minify
}

/// Prepare the output directory
pub(super) fn init_build(config: &SiteConfig) -> Result<()> {
    if config.build.clean {
        clean_output(config)?;
    }
    let output = &config.paths.output;
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Remove the output and prod directories.
pub fn clean_site(config: &SiteConfig) -> Result<()> {
    clean_output(config)?;

    let prod = &config.paths.prod;
    if prod.exists() {
        fs::remove_dir_all(prod)
            .with_context(|| format!("Failed to clear prod directory: {}", prod.display()))?;
    }
    log!("clean"; "removed {}", config.root_relative(&config.paths.output).display());
    Ok(())
}

fn clean_output(config: &SiteConfig) -> Result<()> {
    let output = &config.paths.output;
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    Ok(())
}

/// Compile stylesheets and write their `.min.css` twins
pub(super) fn build_styles(config: &SiteConfig) -> Result<()> {
    let css_dir = config.paths.css_dir();
    let written = build_stylesheets(&config.paths.scss_dir(), &css_dir)?;
    let minified = minify_stylesheets(&css_dir, minify_output(config))?;
    debug!("styles"; "{} compiled, {} minified", plural_count(written.len(), "stylesheet"), minified);
    Ok(())
}

/// Build every script bundle
pub(super) fn build_scripts(config: &SiteConfig, mode: BuildMode) -> Result<()> {
    let count = build_bundles(&config.paths.assets, &config.paths.js_dir(), mode)?;
    debug!("script"; "{} written", plural_count(count, "bundle"));
    Ok(())
}

/// Copy `src/assets/**` into the output assets directory
pub(super) fn copy_site_assets(config: &SiteConfig, force: bool) -> Result<()> {
    let target = config.paths.output_assets();
    let count = copy_assets(&config.paths.assets, &target, force)
        .with_context(|| format!("Failed to copy assets to {}", target.display()))?;
    debug!("assets"; "{} copied", plural_count(count, "file"));
    Ok(())
}

/// Copy vendor and PHP files next to the default locale
pub(super) fn copy_site_backend(config: &SiteConfig, force: bool) -> Result<()> {
    let target = config.locale_output(&config.locales.default);
    let count = copy_backend(&config.paths.source, &config.paths.vendor, &target, force)
        .with_context(|| format!("Failed to copy backend files to {}", target.display()))?;
    debug!("backend"; "{} copied", plural_count(count, "file"));
    Ok(())
}

/// Root `index.html` forwarding to the default locale (multilang only)
pub(super) fn write_site_redirect(config: &SiteConfig) -> Result<()> {
    if !config.locales.multilang {
        return Ok(());
    }
    write_redirect(&config.paths.output, &config.locales.default)
        .context("Failed to write redirect page")
}

/// Write the relativized production copy
pub(super) fn export_site(config: &SiteConfig) -> Result<()> {
    let langs: Vec<String> = config
        .resolve_locales()?
        .into_iter()
        .map(|locale| locale.code)
        .collect();
    let rewriter = ProdRewriter::new(&langs, &config.locales.default);

    let prod = &config.paths.prod;
    let count = export_prod(&config.paths.output, prod, &rewriter)
        .with_context(|| format!("Failed to export to {}", prod.display()))?;
    log!("prod"; "{} exported to {}", plural_count(count, "file"), config.root_relative(prod).display());
    Ok(())
}

pub(super) fn log_build_result(config: &SiteConfig, pages: usize) -> Result<()> {
    if pages == 0 {
        log!("warning"; "no pages rendered, check {}", config.root_relative(&config.paths.pages).display());
    } else {
        log!("build"; "done, {}", plural_count(pages, "page"));
    }
    Ok(())
}
