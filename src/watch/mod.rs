//! File watcher driving incremental rebuilds.
//!
//! ```text
//! notify → Debouncer (timing, dedup) → classifier (path → stage) → run_stage → reload
//! ```

mod classifier;
mod debouncer;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use crate::{
    cli::build::run_stage,
    config::{SiteConfig, cfg, reload_config},
    core::{BuildMode, begin_update, end_update, is_shutdown},
    debug, log,
    logger::{status_error, status_success, status_unchanged},
    reload::ReloadServer,
};

use classifier::plan_stages;
use debouncer::{ChangeKind, Debouncer};

/// Shutdown poll interval while idle
const SHUTDOWN_POLL_MS: u64 = 100;

/// Watch the site sources until shutdown, rebuilding what changed.
///
/// Blocking: runs its own tokio runtime.
pub fn run_watcher(reloader: Option<Arc<ReloadServer>>, shutdown_rx: Receiver<()>) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(watch_loop(reloader, shutdown_rx))
}

async fn watch_loop(reloader: Option<Arc<ReloadServer>>, shutdown_rx: Receiver<()>) -> Result<()> {
    let config = cfg();
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })
    .context("Failed to create file watcher")?;

    for (path, mode) in watch_paths(&config) {
        watcher
            .watch(&path, mode)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
    }
    log!("watch"; "watching {}", config.root_relative(&config.paths.source).display());

    // notify only speaks std channels
    let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);
    std::thread::spawn(move || {
        while let Ok(result) = notify_rx.recv() {
            match result {
                Ok(event) => {
                    if async_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        }
    });

    let mut debouncer = Debouncer::new();
    loop {
        if is_shutdown() || shutdown_rx.try_recv().is_ok() {
            debug!("watch"; "shutdown signal received");
            break;
        }

        let wait = debouncer
            .sleep_duration()
            .min(Duration::from_millis(SHUTDOWN_POLL_MS));

        tokio::select! {
            biased;
            Some(event) = async_rx.recv() => debouncer.add_event(&event),
            _ = tokio::time::sleep(wait) => {
                let Some(changes) = debouncer.take_if_ready() else {
                    continue;
                };
                let reloader = reloader.clone();
                tokio::task::spawn_blocking(move || rebuild(changes, reloader.as_deref()))
                    .await
                    .context("rebuild task panicked")?;
            }
        }
    }

    Ok(())
}

/// Directories (and the config file) to watch.
fn watch_paths(config: &SiteConfig) -> Vec<(PathBuf, RecursiveMode)> {
    let paths = &config.paths;
    let mut dirs: Vec<PathBuf> = vec![paths.source.clone()];
    for dir in [&paths.locales, &paths.assets, &paths.vendor, &paths.pages, &paths.comps] {
        if !dirs.iter().any(|d| dir.starts_with(d)) {
            dirs.push(dir.clone());
        }
    }

    let mut watched: Vec<_> = dirs
        .into_iter()
        .filter(|dir| dir.is_dir())
        .map(|dir| (dir, RecursiveMode::Recursive))
        .collect();

    if config.config_path.is_file() {
        watched.push((config.config_path.clone(), RecursiveMode::NonRecursive));
    }
    watched
}

/// Re-run the stages affected by `changes` and notify browsers.
fn rebuild(changes: FxHashMap<PathBuf, ChangeKind>, reloader: Option<&ReloadServer>) {
    for (path, kind) in &changes {
        debug!("watch"; "{}: {}", kind.label(), path.display());
    }
    let mut changed: Vec<PathBuf> = changes.into_keys().collect();
    changed.sort();

    let config_path = cfg().config_path.clone();
    if changed.contains(&config_path) {
        match reload_config() {
            Ok(true) => log!("config"; "reloaded"),
            Ok(false) => changed.retain(|p| p != &config_path),
            Err(e) => {
                status_error("config reload failed", &format!("{:#}", e));
                return;
            }
        }
    }

    let config = cfg();
    let stages = plan_stages(&changed, &config);
    if stages.is_empty() {
        if let Some(path) = changed.first() {
            status_unchanged(&config.root_relative(path).display().to_string());
        }
        return;
    }

    begin_update();
    let mut rebuilt = Vec::with_capacity(stages.len());
    for stage in stages {
        match run_stage(stage, &config, BuildMode::DEVELOPMENT) {
            Ok(()) => rebuilt.push(stage.to_string()),
            Err(e) => status_error(&format!("failed: {stage}"), &format!("{:#}", e)),
        }
    }
    end_update();

    if rebuilt.is_empty() {
        return;
    }
    status_success(&format!("rebuilt: {}", rebuilt.join(", ")));
    if let Some(reloader) = reloader {
        reloader.broadcast_reload();
    }
}
