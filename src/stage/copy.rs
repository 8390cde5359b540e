//! Identity stage.

use anyhow::Result;

use crate::asset::Asset;
use crate::pipeline::Processor;

/// Passes assets through unchanged; export does the copying.
#[derive(Debug, Clone, Default)]
pub struct Copy;

impl Processor for Copy {
    fn name(&self) -> &str {
        "copy"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        Ok(Some(asset.clone()))
    }
}
