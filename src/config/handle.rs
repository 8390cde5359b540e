//! Shared config with atomic reload support.
//!
//! `arc-swap` gives lock-free reads to bake passes while the watcher swaps
//! in a fresh config after `oven.toml` changes.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use super::{ConfigError, SiteConfig};
use crate::utils::hash;

pub struct ConfigHandle {
    current: ArcSwap<SiteConfig>,
    /// Hash of the config file content the current value was parsed from.
    hash: AtomicU64,
}

impl ConfigHandle {
    pub fn new(config: SiteConfig) -> Self {
        let hash = fs::read_to_string(&config.config_path)
            .map(|content| hash::compute(&content))
            .unwrap_or(0);

        Self {
            current: ArcSwap::from_pointee(config),
            hash: AtomicU64::new(hash),
        }
    }

    #[inline]
    pub fn get(&self) -> Arc<SiteConfig> {
        self.current.load_full()
    }

    /// Reload config from disk if content changed.
    ///
    /// Returns `Ok(true)` if config was updated, `Ok(false)` if unchanged.
    /// On error the current config stays in place. The `[serve]` section is
    /// carried over since the server is already bound.
    pub fn reload(&self) -> Result<bool, ConfigError> {
        let current = self.get();
        let path = &current.config_path;

        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.clone(), err))?;
        let new_hash = hash::compute(&content);
        if new_hash == self.hash.load(Ordering::Relaxed) {
            return Ok(false);
        }

        let mut fresh = SiteConfig::from_content(&content, path)?;
        fresh.root.clone_from(&current.root);
        fresh.config_path.clone_from(&current.config_path);
        fresh.serve = current.serve.clone();

        self.current.store(Arc::new(fresh));
        self.hash.store(new_hash, Ordering::Relaxed);
        Ok(true)
    }
}
