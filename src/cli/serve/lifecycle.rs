//! Server lifecycle management.

use crate::{bake::Project, log, watch};
use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // port 0 asks the OS for a free port
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(err) => last_error = Some(err),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Start the watcher thread when watching is enabled.
pub fn spawn_watcher(
    project: Arc<Project>,
    enabled: bool,
    shutdown_rx: Receiver<()>,
) -> Option<JoinHandle<()>> {
    if !enabled {
        return None;
    }

    let spawned = thread::Builder::new()
        .name("oven-watch".into())
        .spawn(move || {
            if let Err(e) = watch::watch(project, shutdown_rx) {
                log!("watch"; "error: {:#}", e);
            }
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log!("watch"; "cannot start watcher: {}", e);
            None
        }
    }
}

/// Wait for the watcher to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_bind_retries_next_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (first, addr) = bind_with_retry(localhost, 0).unwrap();
        let taken = addr.port();

        let (_second, next) = bind_with_retry(localhost, taken).unwrap();
        assert_ne!(next.port(), taken);
        drop(first);
    }
}
