//! Fan-out execution of a chain over many assets.
//!
//! ```ignore
//! let report = chain.on(assets).export(&dest);
//! let outputs = chain.process_all(assets);
//! ```

use std::fmt;
use std::path::Path;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::{Chain, Processor, StageOutcome};
use crate::asset::{Asset, Export};
use crate::{core::is_shutdown, log};

/// Workers per chain unless configured otherwise.
pub const DEFAULT_PARALLELISM: usize = 32;

/// A chain bound to its input assets. Nothing runs until a sink is called.
pub struct Batch<'c> {
    chain: &'c Chain,
    assets: Vec<Asset>,
}

/// Per-batch outcome counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Assets that went through the chain.
    pub processed: usize,
    pub written: usize,
    /// Survived the chain but private, so not exported.
    pub skipped: usize,
    pub dropped: usize,
    /// Stage errors, stage panics and export failures.
    pub failed: usize,
}

enum Tally {
    Written,
    Skipped,
    Dropped,
    Failed,
}

impl Chain {
    /// Bind `assets` to this chain.
    pub fn on(&self, assets: impl IntoIterator<Item = Asset>) -> Batch<'_> {
        Batch {
            chain: self,
            assets: assets.into_iter().collect(),
        }
    }

    /// Run the chain over `assets` and return every surviving output.
    pub fn process_all(&self, assets: impl IntoIterator<Item = Asset>) -> Vec<Asset> {
        self.on(assets).collect()
    }

    fn pool(&self) -> Option<&ThreadPool> {
        self.pool
            .get_or_init(|| {
                let name = self.name().to_string();
                let built = ThreadPoolBuilder::new()
                    .num_threads(self.parallelism())
                    .thread_name(move |i| format!("oven-{name}-{i}"))
                    .build();
                match built {
                    Ok(pool) => Some(pool),
                    Err(err) => {
                        log!("pipeline"; "{}: no worker pool ({}), running sequentially", self.name(), err);
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Run and collect every surviving output, in no particular order.
    pub fn collect(self) -> Vec<Asset> {
        self.execute(|asset| self.chain.apply(asset).into_asset())
            .into_iter()
            .flatten()
            .collect()
    }

    /// Run and export every surviving output to `dest_dir`.
    pub fn export(self, dest_dir: &Path) -> BatchReport {
        let tallies = self.execute(|asset| match self.chain.apply(asset) {
            StageOutcome::Produced(output) => match output.export(dest_dir) {
                Export::Written(_) => Tally::Written,
                Export::Skipped => Tally::Skipped,
                Export::Failed => Tally::Failed,
            },
            StageOutcome::Dropped => Tally::Dropped,
            StageOutcome::Failed => Tally::Failed,
        });

        tallies
            .into_iter()
            .fold(BatchReport::default(), |mut report, tally| {
                report.processed += 1;
                match tally {
                    Tally::Written => report.written += 1,
                    Tally::Skipped => report.skipped += 1,
                    Tally::Dropped => report.dropped += 1,
                    Tally::Failed => report.failed += 1,
                }
                report
            })
    }

    /// Map every asset through `each` on the chain's pool.
    ///
    /// Items not yet started when shutdown is requested are skipped.
    fn execute<R, F>(&self, each: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&Asset) -> R + Send + Sync,
    {
        let step = |asset: &Asset| (!is_shutdown()).then(|| each(asset));

        match self.chain.pool() {
            Some(pool) => pool.install(|| self.assets.par_iter().filter_map(&step).collect()),
            None => self.assets.iter().filter_map(&step).collect(),
        }
    }
}

impl std::ops::AddAssign for BatchReport {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.written += other.written;
        self.skipped += other.skipped;
        self.dropped += other.dropped;
        self.failed += other.failed;
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} written, {} skipped, {} dropped, {} failed",
            self.processed, self.written, self.skipped, self.dropped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::OutputAsset;
    use crate::pipeline::processor;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn assets(count: usize) -> Vec<Asset> {
        (0..count)
            .map(|i| OutputAsset::new("/site", format!("page-{i}.txt"), format!("{i}")).into())
            .collect()
    }

    fn identity() -> Chain {
        Chain::new("identity").next(processor("copy", |a: &Asset| Ok(Some(a.clone()))))
    }

    #[test]
    fn test_fan_out_is_complete_for_pool_sizes() {
        for workers in [1, 4, 32] {
            let dest = TempDir::new().unwrap();
            let chain = identity().with_parallelism(workers);

            let report = chain.on(assets(100)).export(dest.path());

            assert_eq!(report.processed, 100, "workers={workers}");
            assert_eq!(report.written, 100, "workers={workers}");
            assert_eq!(report.failed, 0);

            let written: BTreeSet<_> = fs::read_dir(dest.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            let expected: BTreeSet<_> = (0..100).map(|i| format!("page-{i}.txt")).collect();
            assert_eq!(written, expected, "workers={workers}");
        }
    }

    #[test]
    fn test_collect_returns_survivors() {
        let chain = Chain::new("even")
            .with_parallelism(4)
            .next(processor("even", |a: &Asset| {
                let n: usize = a.content().text().unwrap_or_default().parse()?;
                Ok((n % 2 == 0).then(|| a.clone()))
            }));

        let mut names: Vec<_> = chain
            .process_all(assets(10))
            .iter()
            .map(|a| a.relative_name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["page-0.txt", "page-2.txt", "page-4.txt", "page-6.txt", "page-8.txt"]);
    }

    #[test]
    fn test_report_counts_outcomes() {
        let dest = TempDir::new().unwrap();
        let chain = Chain::new("mixed").next(processor("route", |a: &Asset| {
            match a.relative_name() {
                "drop.txt" => Ok(None),
                "fail.txt" => anyhow::bail!("cannot process"),
                "panic.txt" => panic!("stage bug"),
                _ => Ok(Some(a.clone())),
            }
        }));

        let input: Vec<Asset> = ["keep.txt", "_private.txt", "drop.txt", "fail.txt", "panic.txt"]
            .into_iter()
            .map(|name| OutputAsset::new("/site", name, "x").into())
            .collect();

        let report = chain.on(input).export(dest.path());
        assert_eq!(
            report,
            BatchReport {
                processed: 5,
                written: 1,
                skipped: 1,
                dropped: 1,
                failed: 2,
            }
        );
        assert!(dest.path().join("keep.txt").exists());
        assert!(!dest.path().join("_private.txt").exists());
    }

    #[test]
    fn test_batch_is_lazy() {
        let chain = Chain::new("panics").next(processor("boom", |_: &Asset| -> anyhow::Result<Option<Asset>> {
            panic!("must not run")
        }));
        let batch = chain.on(assets(3));
        assert_eq!(batch.len(), 3);
        drop(batch);
    }

    #[test]
    fn test_report_display() {
        let report = BatchReport {
            processed: 3,
            written: 2,
            skipped: 0,
            dropped: 1,
            failed: 0,
        };
        assert_eq!(report.to_string(), "3 processed, 2 written, 0 skipped, 1 dropped, 0 failed");
    }
}
