//! Page phase: render every locale, finish the HTML and write it out.

use anyhow::{Result, bail};
use rayon::prelude::*;

use super::pipeline::minify_output;
use crate::{
    config::{RenderErrorPolicy, SiteConfig},
    core::is_shutdown,
    log,
    logger::ProgressLine,
    render::{LocaleOutput, RenderFailure, RenderPlan, Renderer, render_locale},
    rewrite::{CriticalCss, PageFinisher},
    utils::{path::write_file, plural_count},
};

/// Pages written by one render pass and the pages that failed.
#[derive(Debug)]
pub struct RenderReport {
    pub written: usize,
    pub failures: Vec<RenderFailure>,
}

impl RenderReport {
    /// Apply the `render_errors` policy. Returns the number of pages written.
    pub fn finish(self, policy: RenderErrorPolicy) -> Result<usize> {
        report_failures(policy, &self.failures)?;
        Ok(self.written)
    }
}

/// Render, finish and write all pages. Returns the number written.
///
/// With `render_errors = "fail"` every page that rendered is still written
/// before the build reports the failures.
pub fn render_site(config: &SiteConfig) -> Result<usize> {
    render_pages(config)?.finish(config.build.render_errors)
}

/// Render, finish and write all pages, leaving the failures to the caller.
pub fn render_pages(config: &SiteConfig) -> Result<RenderReport> {
    let renderer = Renderer::load(&config.paths.source, &config.paths.template_excludes())?;
    let locales = config.resolve_locales()?;
    let dirs = config.locale_dirs();
    let pages_prefix = config.paths.pages_prefix();
    let comps_prefix = config.paths.comps_prefix();

    let plan = RenderPlan {
        renderer: &renderer,
        dirs: &dirs,
        pages: &pages_prefix,
        comps: &comps_prefix,
        multilang: config.locales.multilang,
    };

    let outputs: Vec<LocaleOutput> = locales
        .par_iter()
        .map(|locale| render_locale(&plan, locale))
        .collect();

    let critical = CriticalCss::load(&config.paths.css_dir());
    let finisher = PageFinisher {
        source_lang: &config.locales.source,
        minify: minify_output(config),
        placeholder: &config.build.critical_placeholder,
        critical: &critical,
    };

    let written = write_pages(config, &finisher, &outputs)?;
    let failures = outputs.into_iter().flat_map(|o| o.failures).collect();

    Ok(RenderReport { written, failures })
}

fn write_pages(config: &SiteConfig, finisher: &PageFinisher<'_>, outputs: &[LocaleOutput]) -> Result<usize> {
    let total = outputs.iter().map(|o| o.pages.len()).sum();
    let progress = ProgressLine::new(&[("pages", total)]);

    outputs.par_iter().try_for_each(|output| {
        output.pages.par_iter().try_for_each(|page| {
            if is_shutdown() {
                bail!("Aborted");
            }
            let html = finisher.finish(&page.html, &output.locale);
            let path = config.paths.output.join(&page.output);
            write_file(&path, html)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            progress.inc("pages");
            Ok(())
        })
    })?;

    progress.finish();
    Ok(total)
}

fn report_failures(policy: RenderErrorPolicy, failures: &[RenderFailure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    match policy {
        RenderErrorPolicy::Fail => {
            let list: Vec<String> = failures.iter().map(ToString::to_string).collect();
            bail!("{} failed:\n{}", plural_count(failures.len(), "page"), list.join("\n"))
        }
        RenderErrorPolicy::Warn => {
            for failure in failures {
                log!("warning"; "skipped {}", failure);
            }
            Ok(())
        }
    }
}
