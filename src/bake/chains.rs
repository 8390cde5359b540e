//! The four chains of a bake pass.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::i18n::Table;
use crate::pipeline::{Chain, Patterns, SelectError};
use crate::stage::{
    self, FrontMatter, Layout, Markdown, MarkdownOptions, Minify, RegisterTemplate, Translate,
};
use crate::view::ViewEngine;

use super::BakeMode;

const MARKDOWN: [&str; 2] = ["*.md", "*.markdown"];
const OPTIMIZABLE: [&str; 4] = ["*.html", "*.htm", "*.css", "*.js"];

/// Selectors of one pass.
pub(super) struct Selection {
    pub exclude: Patterns,
    pub templates: Patterns,
    pub markdown: Patterns,
    pub optimizable: Patterns,
}

impl Selection {
    /// `build.exclude`, the whole destination tree and the config file are
    /// never fed to a chain.
    pub fn new(config: &SiteConfig) -> Result<Self, SelectError> {
        let mut exclude = Patterns::globs(&config.build.exclude)?
            .union(&Patterns::globs([format!("{}/*", config.build.destination)])?);
        if let Some(name) = config.config_relative_name() {
            exclude = exclude.union(&Patterns::globs([name])?);
        }

        Ok(Self {
            exclude,
            templates: Patterns::globs(&config.build.templates)?,
            markdown: Patterns::globs(MARKDOWN)?,
            optimizable: Patterns::globs(OPTIMIZABLE)?,
        })
    }
}

/// Chains in the order they run.
pub(super) struct Chains {
    pub templates: Chain,
    pub markdown: Chain,
    pub optimize: Chain,
    pub copy: Chain,
}

impl Chains {
    pub fn new(
        config: &SiteConfig,
        table: &Arc<Table>,
        views: &Arc<ViewEngine>,
        mode: BakeMode,
    ) -> Self {
        let workers = config.build.workers;
        let locales = config.build.locales.as_str();
        let translate = || Translate::new(Arc::clone(table), locales);
        let optimized = mode == BakeMode::Optimized;

        let templates = Chain::new("templates")
            .with_parallelism(workers)
            .next(translate())
            .next(FrontMatter)
            .next(RegisterTemplate::new(Arc::clone(views)));

        let markdown = Chain::new("markdown")
            .with_parallelism(workers)
            .next(translate())
            .next(FrontMatter)
            .next(Markdown::new(&MarkdownOptions::standard()))
            .next(Layout::new(Arc::clone(views)))
            .next_if(optimized, Minify);

        let optimize = Chain::new("optimize").with_parallelism(workers).next(translate());
        let optimize = if optimized {
            optimize.next(Minify)
        } else {
            optimize.next(stage::Copy)
        };

        let copy = Chain::new("copy")
            .with_parallelism(workers)
            .next(translate())
            .next(stage::Copy);

        Self {
            templates,
            markdown,
            optimize,
            copy,
        }
    }
}
