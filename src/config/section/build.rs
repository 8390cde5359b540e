//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! destination = "_site"
//! exclude = [".*", "*/.*"]
//! languages = ["en", "fr"]
//! imports = ["_data/site.yml"]
//! templates = ["_layouts/*", "_includes/*"]
//! locales = "locales"
//! workers = 32
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::pipeline::DEFAULT_PARALLELISM;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory, relative to the project root.
    pub destination: String,

    /// Glob patterns never fed to any chain.
    pub exclude: Vec<String>,

    /// One bake pass per language; empty means a single `default` pass.
    pub languages: Vec<String>,

    /// YAML data files exposed to templates under their file stem.
    pub imports: Vec<PathBuf>,

    /// Glob patterns selecting layout and include templates.
    pub templates: Vec<String>,

    /// Directory holding `<lang>.yml` translation tables.
    pub locales: String,

    /// Degree of parallelism per chain.
    pub workers: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            destination: "_site".into(),
            exclude: vec![".*".into(), "*/.*".into()],
            languages: Vec::new(),
            imports: Vec::new(),
            templates: vec!["_layouts/*".into(), "_includes/*".into()],
            locales: "locales".into(),
            workers: DEFAULT_PARALLELISM,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_relative_dir("build.destination", &self.destination)?;
        check_relative_dir("build.locales", &self.locales)?;

        if self.workers == 0 {
            return Err(ConfigError::Validation(
                "build.workers must be at least 1".into(),
            ));
        }

        if let Some(lang) = self
            .languages
            .iter()
            .find(|lang| lang.is_empty() || lang.contains(['/', '\\']))
        {
            return Err(ConfigError::Validation(format!(
                "build.languages contains an invalid language `{lang}`"
            )));
        }

        Ok(())
    }
}

/// Directory options must stay inside the project root.
fn check_relative_dir(field: &str, value: &str) -> Result<(), ConfigError> {
    let path = Path::new(value);
    let inside_root = !value.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

    if inside_root {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} must be a relative directory inside the project, got `{value}`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.destination, "_site");
        assert_eq!(config.build.templates, vec!["_layouts/*", "_includes/*"]);
        assert_eq!(config.build.workers, 32);
        assert!(config.build.languages.is_empty());
    }

    #[test]
    fn test_build_section() {
        let config = test_parse_config(
            "[build]\ndestination = \"public\"\nlanguages = [\"en\", \"fr\"]\nworkers = 4",
        );
        assert_eq!(config.build.destination, "public");
        assert_eq!(config.build.languages, vec!["en", "fr"]);
        assert_eq!(config.build.workers, 4);
        assert_eq!(config.build.locales, "locales");
    }

    #[test]
    fn test_validate_rejects_escaping_destination() {
        for bad in ["", "..", "../out", "/tmp/out", "."] {
            let build = BuildConfig {
                destination: bad.into(),
                ..BuildConfig::default()
            };
            assert!(build.validate().is_err(), "accepted `{bad}`");
        }

        let nested = BuildConfig {
            destination: "out/site".into(),
            ..BuildConfig::default()
        };
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let build = BuildConfig {
            workers: 0,
            ..BuildConfig::default()
        };
        assert!(build.validate().is_err());
    }
}
