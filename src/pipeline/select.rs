//! Glob/regex selection over relative names.

use regex::Regex;
use thiserror::Error;

use crate::asset::Asset;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("invalid pattern `{pattern}`")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Translate a glob into an anchored, case-insensitive regex.
///
/// `*` matches any run of characters (including `/`), `?` one character;
/// everything else is literal.
pub fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() + 8);
    regex.push_str("(?i)^");
    for c in glob.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => {
                let mut buf = [0u8; 4];
                regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }
    regex.push('$');
    regex
}

/// One compiled selector.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn glob(glob: &str) -> Result<Self, SelectError> {
        let regex = Regex::new(&glob_to_regex(glob)).map_err(|source| SelectError::Invalid {
            pattern: glob.to_string(),
            source,
        })?;
        Ok(Self {
            source: glob.to_string(),
            regex,
        })
    }

    /// Use a regex as-is. It is matched against the whole relative name
    /// only if it anchors itself.
    pub fn regex(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
        }
    }

    pub fn is_match(&self, relative_name: &str) -> bool {
        self.regex.is_match(relative_name)
    }

    /// The glob or regex this pattern was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl TryFrom<&str> for Pattern {
    type Error = SelectError;

    fn try_from(glob: &str) -> Result<Self, Self::Error> {
        Self::glob(glob)
    }
}

/// A list of patterns; a name matches when any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct Patterns(Vec<Pattern>);

impl Patterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globs<I, S>(globs: I) -> Result<Self, SelectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        globs
            .into_iter()
            .map(|glob| Pattern::glob(glob.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn with(mut self, pattern: Pattern) -> Self {
        self.0.push(pattern);
        self
    }

    /// Union of both lists.
    pub fn union(mut self, other: &Patterns) -> Self {
        self.0.extend(other.0.iter().cloned());
        self
    }

    pub fn is_match(&self, relative_name: &str) -> bool {
        self.0.iter().any(|pattern| pattern.is_match(relative_name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Pattern> for Patterns {
    fn from(pattern: Pattern) -> Self {
        Self(vec![pattern])
    }
}

/// Order-preserving filters over asset lists.
///
/// ```ignore
/// let pages = assets.only(&markdown).except(&templates);
/// ```
pub trait Select {
    /// Assets whose relative name matches any pattern.
    fn only(&self, patterns: &Patterns) -> Vec<Asset>;

    /// Assets whose relative name matches none of the patterns.
    fn except(&self, patterns: &Patterns) -> Vec<Asset>;
}

impl Select for [Asset] {
    fn only(&self, patterns: &Patterns) -> Vec<Asset> {
        self.iter()
            .filter(|asset| patterns.is_match(asset.relative_name()))
            .cloned()
            .collect()
    }

    fn except(&self, patterns: &Patterns) -> Vec<Asset> {
        self.iter()
            .filter(|asset| !patterns.is_match(asset.relative_name()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::OutputAsset;

    fn names(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(Asset::relative_name).collect()
    }

    fn assets(names: &[&str]) -> Vec<Asset> {
        names
            .iter()
            .map(|name| OutputAsset::new("/site", *name, "").into())
            .collect()
    }

    #[test]
    fn test_glob_to_regex() {
        assert_eq!(glob_to_regex("*.md"), r"(?i)^.*\.md$");
        assert_eq!(glob_to_regex("a?c"), "(?i)^a.c$");
        assert_eq!(glob_to_regex("[x]+(y)"), r"(?i)^\[x\]\+\(y\)$");
    }

    #[test]
    fn test_glob_matching() {
        let md = Pattern::glob("*.md").unwrap();
        assert!(md.is_match("post.md"));
        assert!(md.is_match("a/b/post.md"));
        assert!(md.is_match("POST.MD"));
        assert!(!md.is_match("post.md.bak"));
        assert!(!md.is_match("postmd"));

        let single = Pattern::glob("page?.html").unwrap();
        assert!(single.is_match("page1.html"));
        assert!(!single.is_match("page10.html"));

        let dir = Pattern::glob("_layouts/*").unwrap();
        assert!(dir.is_match("_layouts/base.html"));
        assert!(!dir.is_match("posts/_layouts/base.html"));
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = Pattern::regex(Regex::new(r"^posts/\d{4}/").unwrap());
        assert!(pattern.is_match("posts/2024/a.md"));
        assert!(!pattern.is_match("posts/draft/a.md"));
        assert_eq!(pattern.as_str(), r"^posts/\d{4}/");
    }

    #[test]
    fn test_only_and_except_preserve_order() {
        let all = assets(&["c.md", "a.css", "b.md", "_layouts/x.html", "d.markdown"]);
        let markdown = Patterns::globs(["*.md", "*.markdown"]).unwrap();

        assert_eq!(names(&all.only(&markdown)), vec!["c.md", "b.md", "d.markdown"]);
        assert_eq!(names(&all.except(&markdown)), vec!["a.css", "_layouts/x.html"]);
    }

    #[test]
    fn test_selectors_compose() {
        let all = assets(&["_layouts/post.md", "index.md", "style.css"]);
        let markdown = Patterns::globs(["*.md"]).unwrap();
        let templates = Patterns::globs(["_layouts/*"]).unwrap();

        let pages = all.only(&markdown).except(&templates);
        assert_eq!(names(&pages), vec!["index.md"]);

        // selectors are not mutually exclusive
        assert_eq!(all.only(&markdown).only(&templates).len(), 1);
    }

    #[test]
    fn test_empty_patterns() {
        let all = assets(&["a", "b"]);
        let none = Patterns::new();
        assert!(all.only(&none).is_empty());
        assert_eq!(all.except(&none).len(), 2);
    }

    #[test]
    fn test_union_and_try_from() {
        let css = Patterns::from(Pattern::try_from("*.css").unwrap());
        let both = css.union(&Patterns::globs(["*.js"]).unwrap());
        assert_eq!(both.len(), 2);
        assert!(both.is_match("app.js"));
        assert!(both.is_match("site.css"));
    }
}
