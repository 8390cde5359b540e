//! Ordered stage lists.

use std::fmt;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use rayon::ThreadPool;

use super::processor::{Processor, StageOutcome, run_stage};
use super::DEFAULT_PARALLELISM;
use crate::asset::Asset;

/// An ordered sequence of processors applied to one asset at a time.
///
/// Each stage receives the previous stage's output; the first stage that
/// yields nothing ends the chain for that asset. A chain is itself a
/// [`Processor`], so chains nest.
pub struct Chain {
    name: String,
    stages: Vec<Arc<dyn Processor>>,
    parallelism: usize,
    /// Worker pool, built on the first batch. `None` if building failed.
    pub(super) pool: OnceLock<Option<ThreadPool>>,
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            parallelism: DEFAULT_PARALLELISM,
            pool: OnceLock::new(),
        }
    }

    /// Append a stage.
    pub fn next(mut self, stage: impl Processor + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append a stage when `condition` holds.
    pub fn next_if(self, condition: bool, stage: impl Processor + 'static) -> Self {
        if condition { self.next(stage) } else { self }
    }

    /// Set the number of workers used by [`Chain::on`]. Zero is treated as one.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage on `asset`, stopping at the first drop or failure.
    pub fn apply(&self, asset: &Asset) -> StageOutcome {
        let mut current = asset.clone();
        for stage in &self.stages {
            match run_stage(stage.as_ref(), &current) {
                StageOutcome::Produced(next) => current = next,
                outcome => return outcome,
            }
        }
        StageOutcome::Produced(current)
    }
}

impl Processor for Chain {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        Ok(self.apply(asset).into_asset())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("parallelism", &self.parallelism)
            .finish()
    }
}
