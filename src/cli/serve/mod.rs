//! Development server with live reload support.

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    config::{SiteConfig, cfg},
    core::{is_busy, is_serving, is_shutdown},
    debug, log,
    reload::ReloadServer,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::{Request, Server};

/// Longest a request waits for a running rebuild.
const UPDATE_WAIT_MS: u64 = 5000;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    reloader: Option<Arc<ReloadServer>>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server (and the live reload server when watching) without
/// starting the request loop
///
/// The caller runs the initial build in the background while requests get
/// the loading page.
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let reloader = if config.serve.watch {
        let reloader = ReloadServer::start(config.serve.livereload_port)?;
        debug!("reload"; "ws://localhost:{}", reloader.port());
        Some(Arc::new(reloader))
    } else {
        None
    };

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        reloader,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the watcher and the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let ws_port = self.reloader.as_ref().map(|r| r.port());
        let watcher = lifecycle::spawn_watcher(self.reloader, self.shutdown_rx);
        run_request_loop(&self.server, ws_port)?;
        lifecycle::wait_for_shutdown(watcher);
        Ok(())
    }
}

fn run_request_loop(server: &Server, ws_port: Option<u16>) -> Result<()> {
    // Slow responses (waiting for a rebuild) must not block other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        pool.spawn(move || {
            let config = cfg();
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &SiteConfig, ws_port: Option<u16>) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Served from memory, independent of the build state
    if let Some(port) = ws_port
        && request.url() == crate::embed::serve::LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    if !is_serving() {
        return response::respond_loading(request);
    }

    wait_for_update();

    if let Some(path) = path::resolve_path(request.url(), &config.paths.output) {
        return response::respond_file(request, &path, ws_port);
    }

    response::respond_not_found(request, config, ws_port)
}

/// Block while a rebuild is writing the output tree.
fn wait_for_update() {
    let step = Duration::from_millis(50);
    let mut waited = Duration::ZERO;
    while is_busy() && waited < Duration::from_millis(UPDATE_WAIT_MS) {
        std::thread::sleep(step);
        waited += step;
    }
}
