//! Lisan - a multilingual static site builder.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod locale;
mod logger;
mod reload;
mod render;
mod rewrite;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{
    Cli, Commands,
    build::{build_site, clean_site},
};
use config::{SiteConfig, cfg, clear_clean_flag, init_config};
use core::BuildMode;
use logger::status_error;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(SiteConfig::load(cli)?);

    match &cli.command {
        Commands::Build { .. } => build_site(&config, BuildMode::PRODUCTION),
        Commands::Serve { .. } => serve_site(),
        Commands::Watch { .. } => watch_site(&config),
        Commands::Clean => clean_site(&config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Bind first so early requests get the loading page, then build in the
/// background.
fn serve_site() -> Result<()> {
    let bound_server = cli::serve::bind_server()?;

    let config = cfg();
    std::thread::spawn(move || {
        initial_build(&config);
        core::set_serving();
    });

    bound_server.run()
}

// =============================================================================
// Watch Command
// =============================================================================

fn watch_site(config: &SiteConfig) -> Result<()> {
    initial_build(config);

    // Nothing sends on this channel: Ctrl+C exits directly without a server
    let (_shutdown_tx, shutdown_rx) = crossbeam::channel::unbounded::<()>();
    watch::run_watcher(None, shutdown_rx)
}

/// Development build before watching. Failures are reported, not fatal:
/// the next change retries.
fn initial_build(config: &SiteConfig) {
    match build_site(config, BuildMode::DEVELOPMENT) {
        Ok(()) => clear_clean_flag(),
        Err(e) => status_error("initial build failed", &format!("{:#}", e)),
    }
}
