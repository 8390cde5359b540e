//! Translation stage.

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;

use crate::asset::Asset;
use crate::i18n::Table;
use crate::pipeline::Processor;

/// Extensions whose content goes through `$key` substitution.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "md", "markdown", "html", "htm", "css", "js", "json", "xml", "svg", "txt", "yml", "yaml",
    "toml", "csv", "rss", "atom",
];

/// Replaces `$key` tokens with the pass language's strings.
///
/// Translation tables themselves (anything under the locales directory) are
/// dropped so they never reach the output.
pub struct Translate {
    table: Arc<Table>,
    /// `<locales>/` prefix of relative names to drop.
    locales_prefix: String,
}

impl Translate {
    pub fn new(table: Arc<Table>, locales_dir: &str) -> Self {
        Self {
            table,
            locales_prefix: format!("{}/", locales_dir.trim_end_matches('/')),
        }
    }
}

impl Processor for Translate {
    fn name(&self) -> &str {
        "translate"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        if asset.relative_name().starts_with(&self.locales_prefix) {
            return Ok(None);
        }
        if !TEXT_EXTENSIONS.contains(&asset.extension()) {
            return Ok(Some(asset.clone()));
        }

        let content = asset.content();
        let Some(text) = content.text() else {
            return Ok(Some(asset.clone()));
        };

        match self.table.substitute(text) {
            Cow::Borrowed(_) => Ok(Some(asset.clone())),
            Cow::Owned(translated) => Ok(Some(asset.derive(translated).into())),
        }
    }
}
