//! Markdown rendering stage (pulldown-cmark).

use anyhow::{Context, Result};
use pulldown_cmark::{Options, Parser, html};

use crate::asset::Asset;
use crate::pipeline::Processor;

/// Markdown extensions to enable.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// `# Heading {#custom-id}`
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Tables, footnotes, strikethrough and task lists.
    pub fn standard() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: false,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Renders Markdown content to HTML; the output extension becomes `html`.
#[derive(Debug, Clone)]
pub struct Markdown {
    options: Options,
}

impl Markdown {
    pub fn new(options: &MarkdownOptions) -> Self {
        Self {
            options: options.to_pulldown_options(),
        }
    }

    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new(&MarkdownOptions::standard())
    }
}

impl Processor for Markdown {
    fn name(&self) -> &str {
        "markdown"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        let content = asset.content();
        let text = content.text().context("markdown source is not valid UTF-8")?;
        let html = self.render(text);
        Ok(Some(asset.derive(html).with_extension("html").into()))
    }
}
