//! Decide what a batch of file changes requires.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::debouncer::ChangeKind;
use crate::config::SiteConfig;
use crate::utils::path::normalize_path;

/// Work needed after a debounced batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct Rebuild {
    /// `oven.toml` changed.
    pub config: bool,
    /// A translation table or imported data file changed.
    pub data: bool,
    /// Source files changed.
    pub sources: usize,
}

impl Rebuild {
    pub(super) fn is_empty(&self) -> bool {
        !self.config && !self.data && self.sources == 0
    }
}

/// Classify `changes`; `None` when every change is irrelevant (output
/// files, paths outside the project).
pub(super) fn classify(
    changes: &FxHashMap<PathBuf, ChangeKind>,
    config: &SiteConfig,
) -> Option<Rebuild> {
    let root = config.get_root();
    let destination = normalize_path(&config.destination_dir());
    let locales = normalize_path(&config.locales_dir());
    let imports: Vec<PathBuf> = config
        .import_paths()
        .iter()
        .map(|p| normalize_path(p))
        .collect();

    let mut rebuild = Rebuild::default();
    for path in changes.keys() {
        if !path.starts_with(root) || path.starts_with(&destination) || is_vcs(path, root) {
            continue;
        }

        if *path == config.config_path {
            rebuild.config = true;
        } else if path.starts_with(&locales) || imports.contains(path) {
            rebuild.data = true;
        } else {
            rebuild.sources += 1;
        }
    }

    (!rebuild.is_empty()).then_some(rebuild)
}

fn is_vcs(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .is_some_and(|first| first.as_os_str() == ".git")
}
