//! File watching for `serve`.
//!
//! ```text
//! notify -> channel -> Debouncer (quiet period) -> classify -> Project
//! ```
//!
//! A single consumer thread owns the debouncer, so rebuilds never overlap.

mod classifier;
mod debouncer;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};
use notify::{RecursiveMode, Watcher};

use crate::bake::Project;
use crate::core::is_shutdown;
use crate::logger::{status_error, status_success, status_warning};
use crate::utils::{format_elapsed, plural_count};
use crate::{debug, log};

use classifier::{Rebuild, classify};
use debouncer::Debouncer;

/// Watch the project root until shutdown, rebuilding on changes.
///
/// Blocks the calling thread. The watcher is registered before returning
/// control to the loop, so edits made during the first bake are not lost.
pub fn watch(project: Arc<Project>, shutdown_rx: Receiver<()>) -> Result<()> {
    let root = project.config().get_root().to_path_buf();
    let (event_tx, event_rx) = channel::unbounded();

    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = event_tx.send(res);
    })
    .context("failed to create file watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", root.display()))?;

    log!("watch"; "watching {}", root.display());

    let mut debouncer = Debouncer::new();
    loop {
        crossbeam::select! {
            recv(event_rx) -> msg => match msg {
                Ok(Ok(event)) => debouncer.add_event(&event),
                Ok(Err(err)) => log!("watch"; "notify error: {}", err),
                Err(_) => break,
            },
            recv(shutdown_rx) -> _ => break,
            default(debouncer.sleep_duration()) => {
                if is_shutdown() {
                    break;
                }
                if let Some(changes) = debouncer.take_if_ready()
                    && let Some(rebuild) = classify(&changes, &project.config())
                {
                    rebuild_project(&project, &rebuild);
                }
            }
        }
    }

    debug!("watch"; "stopped");
    Ok(())
}

fn rebuild_project(project: &Project, rebuild: &Rebuild) {
    debug!("watch"; "{:?}", rebuild);

    if rebuild.config {
        match project.reload() {
            Ok(true) => log!("watch"; "config reloaded"),
            Ok(false) => {}
            Err(err) => {
                status_error("config not reloaded", &format!("{err:#}"));
                return;
            }
        }
    }
    if rebuild.data && !rebuild.config {
        project.reload_data();
    }

    let summary = project.update();
    let changed = plural_count(rebuild.sources, "file");
    let elapsed = format_elapsed(summary.elapsed);

    if summary.failed_passes > 0 {
        status_error(
            &format!("rebuild failed after {elapsed}"),
            &format!("{} of {} passes failed", summary.failed_passes, summary.passes),
        );
    } else if summary.report.failed > 0 {
        status_warning(&format!(
            "rebuilt in {elapsed}, {} failed ({changed} changed)",
            plural_count(summary.report.failed, "asset")
        ));
    } else {
        status_success(&format!("rebuilt in {elapsed} ({changed} changed)"));
    }
}
