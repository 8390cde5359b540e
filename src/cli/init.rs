//! `oven init`: starter files for a new site.
//!
//! The config file itself is written by config loading; this adds a layout,
//! a first page and an ignore file. Existing files are never overwritten.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::config::SiteConfig;
use crate::log;

const BASE_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
</head>
<body>
{{ body }}
</body>
</html>
"#;

const INDEX_PAGE: &str = "---
layout: base
title: Home
---
# Welcome

Edit `index.md` and run `oven serve`.
";

/// Write the starter files under the configured root.
pub fn new_site(config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let ignore = format!("/{}/\n.DS_Store\n", config.build.destination);

    let files = [
        ("_layouts/base.html", BASE_LAYOUT.to_string()),
        ("index.md", INDEX_PAGE.to_string()),
        (".gitignore", ignore),
    ];

    let mut created = 0;
    for (name, content) in &files {
        if write_if_absent(root, name, content)? {
            created += 1;
        }
    }

    log!("init"; "site ready in {} ({} new files)", root.display(), created);
    Ok(())
}

fn write_if_absent(root: &Path, name: &str, content: &str) -> Result<bool> {
    let path = root.join(name);
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(true)
}
