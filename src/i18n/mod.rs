//! Per-language translation tables.
//!
//! Tables live in `<root>/<build.locales>/<lang>.yml`. Nested mappings are
//! flattened to dotted keys:
//!
//! ```yaml
//! greeting: Bonjour
//! nav:
//!   home: Accueil      # $nav.home
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use serde_yaml::Value;

use crate::{debug, log};

/// `$key` tokens; dots only join identifier segments so `$name.` ends at `name`.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)").unwrap()
});

/// Immutable key -> string lookup for one language.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Table {
    entries: FxHashMap<String, String>,
}

impl Table {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(text)?;
        let mut entries = FxHashMap::default();
        flatten(&mut entries, String::new(), &value);
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every known `$key` in `text`; unknown keys stay as written.
    ///
    /// Borrows when the text contains no tokens.
    pub fn substitute<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.entries.is_empty() {
            return Cow::Borrowed(text);
        }
        TOKEN.replace_all(text, |caps: &Captures| match self.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
    }
}

fn flatten(entries: &mut FxHashMap<String, String>, prefix: String, value: &Value) {
    match value {
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                let Some(key) = scalar_to_string(key) else {
                    continue;
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(entries, path, value);
            }
        }
        Value::Tagged(tagged) => flatten(entries, prefix, &tagged.value),
        other => {
            if let Some(text) = scalar_to_string(other)
                && !prefix.is_empty()
            {
                entries.insert(prefix, text);
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Lazily loaded tables keyed by language.
pub struct Translations {
    dir: PathBuf,
    tables: DashMap<String, Arc<Table>>,
}

impl Translations {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: DashMap::new(),
        }
    }

    /// Table for `lang`, loading `<dir>/<lang>.yml` on first use.
    ///
    /// Missing or malformed files give an empty table.
    pub fn get_or_load(&self, lang: &str) -> Arc<Table> {
        if let Some(table) = self.tables.get(lang) {
            return Arc::clone(&table);
        }
        Arc::clone(
            &self
                .tables
                .entry(lang.to_string())
                .or_insert_with(|| Arc::new(self.load(lang))),
        )
    }

    fn load(&self, lang: &str) -> Table {
        let path = self.dir.join(format!("{lang}.yml"));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("i18n"; "no table for `{}` at {}", lang, path.display());
                return Table::default();
            }
            Err(err) => {
                log!("i18n"; "cannot read {}: {}", path.display(), err);
                return Table::default();
            }
        };

        match Table::from_yaml(&text) {
            Ok(table) => {
                debug!("i18n"; "{}: {} strings", lang, table.len());
                table
            }
            Err(err) => {
                log!("i18n"; "{}: {}", path.display(), err);
                Table::default()
            }
        }
    }

    pub fn loaded(&self) -> usize {
        self.tables.len()
    }
}
