//! Writing assets to the destination tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::Asset;
use crate::{debug, log};

/// Outcome of exporting one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Export {
    Written(PathBuf),
    /// Private name (the first path segment starts with `_`); nothing written.
    Skipped,
    /// I/O failure, already logged.
    Failed,
}

/// Names whose leading segment starts with `_` are never published.
///
/// Only the top level counts: `_drafts/x.html` is private,
/// `posts/_partial.html` is not.
pub fn is_private(relative_name: &str) -> bool {
    relative_name.starts_with('_')
}

impl Asset {
    /// Write this asset to `<dest_dir>/<relative name with target extension>`.
    ///
    /// Input assets are copied byte for byte; output assets write their
    /// in-memory content. Errors are logged under `export`, never raised.
    pub fn export(&self, dest_dir: &Path) -> Export {
        if is_private(self.relative_name()) {
            debug!("export"; "{}: private, skipped", self.relative_name());
            return Export::Skipped;
        }

        let target = dest_dir.join(self.target_name().as_ref());
        match self.write_to(&target) {
            Ok(()) => Export::Written(target),
            Err(err) => {
                log!("export"; "{}: {}", self.relative_name(), err);
                Export::Failed
            }
        }
    }

    fn write_to(&self, target: &Path) -> io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        match self {
            Asset::Input(input) => fs::copy(input.path(), target).map(|_| ()),
            Asset::Output(output) => fs::write(target, output.content().bytes()),
        }
    }
}
