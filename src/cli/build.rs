//! `oven build`.

use anyhow::{Result, bail};

use crate::bake::{BakeMode, Project};
use crate::config::SiteConfig;
use crate::log;
use crate::utils::{format_elapsed, plural_count};

use super::BuildArgs;

pub fn mode_for(args: &BuildArgs) -> BakeMode {
    if args.fast {
        BakeMode::Fast
    } else {
        BakeMode::Optimized
    }
}

/// Bake once and report. Fails the process when any asset failed.
pub fn build_site(config: SiteConfig, args: &BuildArgs) -> Result<()> {
    let destination = config.destination_dir();
    let project = Project::open(config);
    let summary = project.bake(mode_for(args));

    log!(
        "build";
        "{} in {} to {}",
        plural_count(summary.report.written, "file"),
        format_elapsed(summary.elapsed),
        destination.display()
    );

    if !summary.is_success() {
        bail!(
            "{} of {} passes aborted, {} failed",
            summary.failed_passes,
            summary.passes,
            plural_count(summary.report.failed, "asset")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_mode_for() {
        assert_eq!(mode_for(&BuildArgs::default()), BakeMode::Optimized);
        let fast = BuildArgs {
            fast: true,
            ..BuildArgs::default()
        };
        assert_eq!(mode_for(&fast), BakeMode::Fast);
    }

    #[test]
    fn test_build_site() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();
        let config = SiteConfig::load_or_create(&dir.path().join(CONFIG_FILE));

        build_site(config, &BuildArgs::default()).unwrap();
        assert!(dir.path().join("_site/robots.txt").is_file());
    }
}
