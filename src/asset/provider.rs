//! Asset provider: enumerates the source tree.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use thiserror::Error;

use super::Asset;
use crate::log;

const IGNORED_DIRS: &[&str] = &[".git"];
const IGNORED_FILES: &[&str] = &[".DS_Store"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("source directory `{0}` does not exist")]
    MissingRoot(PathBuf),
}

/// Snapshot every file under `root` as an input asset rooted at `root`.
///
/// `.git` directories are not entered. Hidden files are kept; the default
/// `build.exclude` patterns filter them later. The result is sorted by
/// relative name.
pub fn fetch(root: &Path) -> Result<Vec<Asset>, FetchError> {
    if !root.is_dir() {
        return Err(FetchError::MissingRoot(root.to_path_buf()));
    }

    let mut assets: Vec<_> = WalkDir::new(root)
        .skip_hidden(false)
        .process_read_dir(|_, _, _, children| {
            children.retain(|entry| {
                entry.as_ref().map_or(true, |e| {
                    !(e.file_type().is_dir()
                        && IGNORED_DIRS.iter().any(|dir| e.file_name() == *dir))
                })
            });
        })
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log!("file"; "{}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| Asset::input(e.path(), root))
        .collect();

    assets.sort_by(|a, b| a.relative_name().cmp(b.relative_name()));
    Ok(assets)
}
