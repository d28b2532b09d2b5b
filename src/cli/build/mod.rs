//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Init** - Clear the output directory when `--clean` is set
//! - **Styles** - SCSS to CSS, RTL mirror, `*.min.css` twins
//! - **Assets** - Copy `src/assets` into the output tree
//! - **Scripts** - Concatenate (and minify) the script bundles
//! - **Pages** - Render, finish and write every locale
//! - **Backend** - Vendor tree and PHP files for the default locale
//! - **Export** - Relativized copy for the prod directory

mod pages;
mod pipeline;
mod stage;

use anyhow::Result;

use crate::{config::SiteConfig, core::BuildMode, log};

pub use pages::render_site;
pub use pipeline::clean_site;
pub use stage::{BuildStage, run_stage};

/// Build the entire site.
///
/// Pipeline: init -> styles -> assets -> scripts -> pages -> redirect -> backend -> export
///
/// Render failures are reported once the redirect and backend files are in
/// place, so a failing build still leaves a complete output tree.
pub fn build_site(config: &SiteConfig, mode: BuildMode) -> Result<()> {
    pipeline::init_build(config)?;

    pipeline::build_styles(config)?;
    pipeline::copy_site_assets(config, config.build.clean)?;
    pipeline::build_scripts(config, mode)?;

    let report = pages::render_pages(config)?;
    pipeline::write_site_redirect(config)?;
    pipeline::copy_site_backend(config, config.build.clean)?;
    let pages = report.finish(config.build.render_errors)?;

    if config.build.prod {
        pipeline::export_site(config)?;
    }

    pipeline::log_build_result(config, pages)
}
