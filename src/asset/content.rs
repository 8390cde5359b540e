//! Immutable asset content.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Binary,
}

/// Shared bytes plus the detected encoding. Cloning is a refcount bump.
#[derive(Clone, PartialEq, Eq)]
pub struct Content {
    encoding: Encoding,
    bytes: Arc<[u8]>,
}

impl Content {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let encoding = if std::str::from_utf8(&bytes).is_ok() {
            Encoding::Utf8
        } else {
            Encoding::Binary
        };
        Self {
            encoding,
            bytes: bytes.into(),
        }
    }

    /// UTF-8 view of the content, `None` for binary data.
    pub fn text(&self) -> Option<&str> {
        match self.encoding {
            Encoding::Utf8 => std::str::from_utf8(&self.bytes).ok(),
            Encoding::Binary => None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for Content {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            bytes: Arc::from(Vec::new()),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("encoding", &self.encoding)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self {
            encoding: Encoding::Utf8,
            bytes: text.into_bytes().into(),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::from(text.to_owned())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
