//! Assets produced in memory by a processor.

use std::path::{Path, PathBuf};

use super::{Asset, Content, Header, extension_of};

/// In-memory content tied to the source's root and relative name.
///
/// The extension may differ from the source (`post.md` renders to
/// `post.html`); export substitutes it into the relative name.
#[derive(Debug, Clone)]
pub struct OutputAsset {
    root: PathBuf,
    relative_name: String,
    extension: String,
    header: Option<Header>,
    content: Content,
}

impl OutputAsset {
    pub fn new(
        root: impl Into<PathBuf>,
        relative_name: impl Into<String>,
        content: impl Into<Content>,
    ) -> Self {
        let relative_name = relative_name.into();
        let extension = extension_of(&relative_name);
        Self {
            root: root.into(),
            relative_name,
            extension,
            header: None,
            content: content.into(),
        }
    }

    /// Replace the target extension (given without a leading dot).
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self
    }

    pub fn with_header(mut self, header: Option<Header>) -> Self {
        self.header = header;
        self
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

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }
}

impl From<OutputAsset> for Asset {
    fn from(output: OutputAsset) -> Self {
        Asset::Output(output.into())
    }
}
