//! Development server.
//!
//! Serves the default pass destination over HTTP while the watcher keeps it
//! up to date.

mod lifecycle;
mod path;
mod response;

use crate::{
    bake::{BakeMode, Project},
    config::SiteConfig,
    core::{is_shutdown, register_server},
    log,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Worker threads answering requests.
const REQUEST_WORKERS: usize = 4;

/// Bake once (Fast), then serve until Ctrl+C.
pub fn serve_site(config: SiteConfig) -> Result<()> {
    let serve = config.serve.clone();
    let serve_root = config.destination_dir();
    let project = Arc::new(Project::open(config));

    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    // Watch before the first bake so edits made during it are seen.
    let watcher = lifecycle::spawn_watcher(Arc::clone(&project), serve.watch, shutdown_rx);

    let summary = project.bake(BakeMode::Fast);
    if !summary.is_success() {
        log!("serve"; "initial bake had failures, serving what was written");
    }
    log!("serve"; "http://{}", addr);

    run_request_loop(&server, &serve_root)?;
    lifecycle::wait_for_shutdown(watcher);
    Ok(())
}

fn run_request_loop(server: &Server, serve_root: &Path) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_WORKERS)
        .thread_name(|i| format!("oven-http-{i}"))
        .build()
        .context("failed to create request pool")?;

    for request in server.incoming_requests() {
        let serve_root: PathBuf = serve_root.to_path_buf();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &serve_root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    crate::debug!("serve"; "{} {}", request.method(), request.url());
    match path::resolve_path(request.url(), serve_root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request, serve_root),
    }
}
