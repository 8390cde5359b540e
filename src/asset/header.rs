//! Front-matter metadata headers.
//!
//! A header is the YAML block between two `---` markers at the very top of a
//! text file:
//!
//! ```text
//! ---
//! title: Hello
//! layout: post
//! ---
//! # Body starts here
//! ```

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const MARKER: &str = "---";

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter must be a key/value mapping")]
    NotMapping,
}

/// Split `text` into its raw front-matter block and the body.
///
/// The header is the trimmed text between the leading `---` and the next
/// `---` found at or after offset 3. The body follows the closing marker with
/// leading whitespace removed. Without an opening or closing marker there is
/// no header and the whole text is the body.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    if !text.starts_with(MARKER) {
        return (None, text);
    }

    let start = MARKER.len();
    match text[start..].find(MARKER) {
        Some(offset) => {
            let end = start + offset;
            let header = text[start..end].trim();
            let body = text[end + MARKER.len()..].trim_start();
            (Some(header), body)
        }
        None => (None, text),
    }
}

/// Schema-less ordered metadata document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header(Mapping);

impl Header {
    /// Parse a raw front-matter block. An empty block is an empty header.
    pub fn parse(raw: &str) -> Result<Self, HeaderError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_yaml::from_str(raw)? {
            Value::Mapping(mapping) => Ok(Self(mapping)),
            Value::Null => Ok(Self::default()),
            _ => Err(HeaderError::NotMapping),
        }
    }

    pub fn from_mapping(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a dotted path such as `author.name` through nested mappings.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.0.get(parts.next()?)?;
        parts.try_fold(first, |value, part| value.get(part))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Typed lookup; missing keys and type mismatches yield `T::default()`.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key)
            .and_then(|value| serde_yaml::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(Value::String(key.into()), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_front_matter() {
        let text = "---\ntitle: Hello\nlayout: post\n---\n\n# Body";
        let (header, body) = split_front_matter(text);
        assert_eq!(header, Some("title: Hello\nlayout: post"));
        assert_eq!(body, "# Body");
    }

    #[test]
    fn test_split_without_header() {
        assert_eq!(split_front_matter("# Just text"), (None, "# Just text"));
        assert_eq!(split_front_matter(" ---\na: 1\n---"), (None, " ---\na: 1\n---"));
    }

    #[test]
    fn test_split_unclosed_header() {
        let text = "---\ntitle: Hello\n# never closed";
        assert_eq!(split_front_matter(text), (None, text));
    }

    #[test]
    fn test_split_closing_marker_search_starts_after_opening() {
        // closing marker right after the opening one
        let (header, body) = split_front_matter("------\nbody");
        assert_eq!(header, Some(""));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_header_parse_and_accessors() {
        let (raw, _) = split_front_matter("---\ntitle: Hello\ndraft: true\ntags: [a, b]\nauthor:\n  name: Ada\n---\n");
        let header = Header::parse(raw.unwrap()).unwrap();

        assert_eq!(header.get_str("title"), Some("Hello"));
        assert!(header.get_or_default::<bool>("draft"));
        assert_eq!(header.get_or_default::<Vec<String>>("tags"), vec!["a", "b"]);
        assert_eq!(header.get_or_default::<u32>("missing"), 0);
        assert_eq!(header.get_path("author.name").and_then(Value::as_str), Some("Ada"));
        assert!(header.get_path("author.email").is_none());
        assert!(header.contains_key("tags"));
        assert_eq!(header.len(), 4);
    }

    #[test]
    fn test_header_keeps_insertion_order() {
        let header = Header::parse("b: 1\na: 2\nc: 3").unwrap();
        let keys: Vec<_> = header
            .as_mapping()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_header_parse_errors() {
        assert!(matches!(Header::parse("title: [unclosed"), Err(HeaderError::Yaml(_))));
        assert!(matches!(Header::parse("- a\n- b"), Err(HeaderError::NotMapping)));
        assert!(Header::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_header_insert() {
        let mut header = Header::default();
        assert!(header.insert("layout", "post").is_none());
        assert_eq!(header.get_str("layout"), Some("post"));
        assert!(header.insert("layout", "page").is_some());
    }
}
