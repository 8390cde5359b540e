//! Assets backed by a file on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;

use super::{Content, extension_of};
use crate::log;

/// A source file under the project root.
///
/// Content is read lazily and cached together with the file's modification
/// time; every access re-stats the file so edits made between bakes (or
/// during one) are picked up.
#[derive(Debug)]
pub struct InputAsset {
    path: PathBuf,
    root: PathBuf,
    relative_name: String,
    extension: String,
    cache: Mutex<Option<Cached>>,
}

#[derive(Debug)]
struct Cached {
    modified: SystemTime,
    content: Content,
}

impl InputAsset {
    /// `path` should live under `root`; otherwise the file name alone is
    /// used as the relative name.
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = root.into();
        let relative_name = crate::utils::path::relative_name(&path, &root).unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let extension = extension_of(&relative_name);

        Self {
            path,
            root,
            relative_name,
            extension,
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn relative_name(&self) -> &str {
        &self.relative_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Current content of the file.
    ///
    /// A read failure is logged and yields the last cached content, or empty
    /// content if the file was never read.
    pub fn content(&self) -> Content {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        let mut cache = self.cache.lock();

        if let (Some(cached), Some(modified)) = (cache.as_ref(), modified)
            && cached.modified == modified
        {
            return cached.content.clone();
        }

        match fs::read(&self.path) {
            Ok(bytes) => {
                let content = Content::new(bytes);
                if let Some(modified) = modified {
                    *cache = Some(Cached {
                        modified,
                        content: content.clone(),
                    });
                }
                content
            }
            Err(err) => {
                log!("file"; "{}: {}", self.relative_name, err);
                cache
                    .as_ref()
                    .map(|cached| cached.content.clone())
                    .unwrap_or_default()
            }
        }
    }
}
