//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// ```text
/// /home/user/site/posts/      ← cwd
/// /home/user/site/oven.toml   ← found
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

/// Walk from `start` to the filesystem root looking for `name`.
fn find_upward(start: &Path, name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// File name for log lines, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("posts/2024");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("oven.toml"), "").unwrap();

        let found = find_upward(&nested, Path::new("oven.toml")).unwrap();
        assert_eq!(found, dir.path().join("oven.toml"));
        assert!(find_upward(&nested, Path::new("missing.toml")).is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/site/oven.toml")), "oven.toml");
    }
}
