//! Site configuration management for `oven.toml`.
//!
//! ```text
//! config/
//! ├── section/   # [build] and [serve]
//! ├── error      # ConfigError
//! ├── handle     # ArcSwap handle for hot reload
//! ├── util       # config discovery
//! └── mod.rs     # SiteConfig (this file)
//! ```
//!
//! Loading never fails hard: a missing file is created with defaults, a
//! malformed one is backed up to `oven.toml.bak` and replaced by defaults.

mod error;
mod handle;
mod section;
mod util;

pub use error::ConfigError;
pub use handle::ConfigHandle;
pub use section::{BuildConfig, ServeConfig};

use util::{display_name, find_config_file};

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "oven.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing oven.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// `init` targets `<cwd>/<name>/oven.toml`; other commands use `--root`
    /// when given, else search upward from cwd, else fall back to cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Self::resolve_config_path(cli)?;
        let mut config = Self::load_or_create(&config_path);
        config.apply_command_options(cli);
        Ok(config)
    }

    fn resolve_config_path(cli: &Cli) -> Result<PathBuf> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let base = cli.root.as_ref().map_or_else(|| cwd.clone(), |root| cwd.join(root));

        let path = match &cli.command {
            Commands::Init { name: Some(name) } => base.join(name).join(&cli.config),
            Commands::Init { name: None } => base.join(&cli.config),
            _ if cli.root.is_some() => base.join(&cli.config),
            _ => find_config_file(&cli.config).unwrap_or_else(|| cwd.join(&cli.config)),
        };
        Ok(path)
    }

    /// Load `path`, or fall back to defaults and persist them.
    ///
    /// A file that exists but cannot be parsed or validated is copied to
    /// `<name>.bak` before being overwritten.
    pub fn load_or_create(path: &Path) -> Self {
        let mut config = match Self::from_path(path) {
            Ok(config) => config,
            Err(err) if err.is_not_found() => {
                log!("config"; "{} not found, writing defaults", display_name(path));
                Self::default().persist_logged(path)
            }
            Err(err) => {
                log!("config"; "{}: {}, falling back to defaults", display_name(path), err);
                Self::backup(path);
                Self::default().persist_logged(path)
            }
        };

        config.set_paths(path);
        config
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_content(&content, path)
    }

    /// Parse and validate config text that was read from `path`.
    pub fn from_content(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {} are ignored: {}", display_name(path), fields.join(", "));
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build.validate()
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this config to `path`, creating parent directories.
    pub fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| ConfigError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(path, self.to_toml()?).map_err(|err| ConfigError::Io(path.to_path_buf(), err))
    }

    fn persist_logged(self, path: &Path) -> Self {
        if let Err(err) = self.persist(path) {
            log!("config"; "cannot write {}: {}", path.display(), err);
        }
        self
    }

    fn backup(path: &Path) {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".bak");
        let backup = PathBuf::from(backup);
        match fs::copy(path, &backup) {
            Ok(_) => log!("config"; "previous config saved to {}", display_name(&backup)),
            Err(err) => log!("config"; "cannot back up {}: {}", path.display(), err),
        }
    }

    /// Set absolute config path and derive the project root from it.
    fn set_paths(&mut self, path: &Path) {
        self.config_path = normalize_path(path);
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Output directory of the default pass.
    pub fn destination_dir(&self) -> PathBuf {
        self.root.join(&self.build.destination)
    }

    /// Output directory of a pass: language passes nest under the default one.
    pub fn destination_for(&self, language: Option<&str>) -> PathBuf {
        match language {
            Some(lang) => self.destination_dir().join(lang),
            None => self.destination_dir(),
        }
    }

    pub fn locales_dir(&self) -> PathBuf {
        self.root.join(&self.build.locales)
    }

    /// Import files resolved against the root.
    pub fn import_paths(&self) -> Vec<PathBuf> {
        self.build.imports.iter().map(|p| self.root.join(p)).collect()
    }

    /// Name of the config file relative to the root, for exclusion globs.
    pub fn config_relative_name(&self) -> Option<String> {
        crate::utils::path::relative_name(&self.config_path, &self.root)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => {
                Self::update_option(&mut self.build.workers, build_args.workers.as_ref());
            }
            Commands::Serve {
                interface,
                port,
                watch,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            Commands::Init { .. } => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
