//! Front-matter extraction stage.

use anyhow::{Context, Result};

use crate::asset::{Asset, Header, split_front_matter};
use crate::pipeline::Processor;

/// Splits the header block off text assets.
///
/// The output carries the parsed header and the body as content. Assets
/// without a header (or binary ones) pass through untouched; invalid YAML
/// is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatter;

impl Processor for FrontMatter {
    fn name(&self) -> &str {
        "front_matter"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        let content = asset.content();
        let Some(text) = content.text() else {
            return Ok(Some(asset.clone()));
        };

        let (Some(raw), body) = split_front_matter(text) else {
            return Ok(Some(asset.clone()));
        };

        let header = Header::parse(raw).context("cannot parse front matter")?;
        Ok(Some(asset.derive(body).with_header(Some(header)).into()))
    }
}
