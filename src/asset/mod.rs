//! Asset model.
//!
//! ```text
//! asset/
//! ├── content    # Content bytes + encoding
//! ├── input      # InputAsset: file on disk, mtime-checked cache
//! ├── output     # OutputAsset: processor result
//! ├── header     # front matter split + Header
//! ├── export     # writing assets to the destination tree
//! └── provider   # fetch(): enumerate the source tree
//! ```
//!
//! Every asset carries a relative name (path under the project root, `/`
//! separated). Selectors match on it and export derives the destination
//! from it.

mod content;
mod export;
mod header;
mod input;
mod output;
mod provider;

pub use content::{Content, Encoding};
pub use export::{Export, is_private};
pub use header::{Header, HeaderError, split_front_matter};
pub use input::InputAsset;
pub use output::OutputAsset;
pub use provider::{FetchError, fetch};

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A unit of content flowing through the pipeline. Cheap to clone.
#[derive(Debug, Clone)]
pub enum Asset {
    Input(Arc<InputAsset>),
    Output(Arc<OutputAsset>),
}

impl Asset {
    /// Input asset for `path` under the logical `root`.
    pub fn input(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self::Input(Arc::new(InputAsset::new(path, root)))
    }

    pub fn relative_name(&self) -> &str {
        match self {
            Self::Input(input) => input.relative_name(),
            Self::Output(output) => output.relative_name(),
        }
    }

    /// Lowercase extension without the dot, empty when there is none.
    pub fn extension(&self) -> &str {
        match self {
            Self::Input(input) => input.extension(),
            Self::Output(output) => output.extension(),
        }
    }

    /// File name of the relative name without its extension.
    pub fn file_stem(&self) -> &str {
        let name = self.relative_name();
        let file = name.rsplit('/').next().unwrap_or(name);
        match file.rfind('.') {
            Some(dot) if dot > 0 => &file[..dot],
            _ => file,
        }
    }

    /// Relative name with the target extension substituted.
    pub fn target_name(&self) -> Cow<'_, str> {
        let name = self.relative_name();
        let ext = self.extension();
        let current = extension_of(name);
        if current == ext {
            return Cow::Borrowed(name);
        }

        let base = if current.is_empty() {
            name
        } else {
            &name[..name.len() - current.len() - 1]
        };
        if ext.is_empty() {
            Cow::Borrowed(base)
        } else {
            Cow::Owned(format!("{base}.{ext}"))
        }
    }

    pub fn root(&self) -> &Path {
        match self {
            Self::Input(input) => input.root(),
            Self::Output(output) => output.root(),
        }
    }

    /// Physical path, only known for input assets.
    pub fn source_path(&self) -> Option<&Path> {
        match self {
            Self::Input(input) => Some(input.path()),
            Self::Output(_) => None,
        }
    }

    pub fn exists(&self) -> bool {
        match self {
            Self::Input(input) => input.exists(),
            Self::Output(_) => true,
        }
    }

    pub fn content(&self) -> Content {
        match self {
            Self::Input(input) => input.content(),
            Self::Output(output) => output.content().clone(),
        }
    }

    pub fn header(&self) -> Option<&Header> {
        match self {
            Self::Input(_) => None,
            Self::Output(output) => output.header(),
        }
    }

    /// New output asset with `content`, keeping root, relative name,
    /// extension and header.
    pub fn derive(&self, content: impl Into<Content>) -> OutputAsset {
        OutputAsset::new(self.root(), self.relative_name(), content)
            .with_extension(self.extension())
            .with_header(self.header().cloned())
    }
}

/// Lowercase extension of the last path segment.
///
/// Dot files such as `.htaccess` have no extension.
pub(crate) fn extension_of(name: &str) -> String {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rfind('.') {
        Some(dot) if dot > 0 => file[dot + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("posts/a.MD"), "md");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of(".htaccess"), "");
        assert_eq!(extension_of("dir.d/README"), "");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(Asset::input("/s/_layouts/post.html", "/s").file_stem(), "post");
        assert_eq!(Asset::input("/s/.nojekyll", "/s").file_stem(), ".nojekyll");
        assert_eq!(Asset::input("/s/LICENSE", "/s").file_stem(), "LICENSE");
    }

    #[test]
    fn test_target_name() {
        let source = Asset::input("/s/posts/Hello.md", "/s");
        assert_eq!(source.target_name(), "posts/Hello.md");

        let rendered: Asset = source.derive("<p>x</p>").with_extension("html").into();
        assert_eq!(rendered.relative_name(), "posts/Hello.md");
        assert_eq!(rendered.target_name(), "posts/Hello.html");

        let bare: Asset = OutputAsset::new("/s", "README", "x")
            .with_extension("txt")
            .into();
        assert_eq!(bare.target_name(), "README.txt");

        let stripped: Asset = OutputAsset::new("/s", "a.tmp", "x")
            .with_extension("")
            .into();
        assert_eq!(stripped.target_name(), "a");
    }

    #[test]
    fn test_derive_keeps_identity() {
        let mut header = Header::default();
        header.insert("layout", "post");
        let output: Asset = OutputAsset::new("/s", "index.md", "# Hi")
            .with_header(Some(header))
            .into();

        let derived = output.derive("<h1>Hi</h1>");
        assert_eq!(derived.relative_name(), "index.md");
        assert_eq!(derived.root(), Path::new("/s"));
        assert_eq!(derived.extension(), "md");
        assert_eq!(derived.header().and_then(|h| h.get_str("layout")), Some("post"));
        assert!(Asset::from(derived).exists());
    }
}
