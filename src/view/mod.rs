//! View engine: template registry, include graph and layout rendering.
//!
//! ```text
//! view/
//! ├── template   # syntax, Compile trait, TemplateParser
//! ├── graph      # include inlining with cycle/depth guards
//! ├── data       # imported YAML globals
//! └── error      # ViewError
//! ```
//!
//! Templates are registered under their file stem. Registration is safe to
//! call from many workers at once: each name is compiled at most once per
//! distinct source.

mod data;
mod error;
mod graph;
mod template;

pub use data::load_imports;
pub use error::ViewError;
pub use graph::MAX_INCLUDE_DEPTH;
pub use template::{Compile, Segment, Template, TemplateParser, template_name};

use std::borrow::Cow;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxHashSet;
use serde_yaml::Value;

use crate::asset::{Asset, Header, split_front_matter};
use crate::utils::{hash, html};

/// Shared handle to a compiled template.
pub type ViewHandle = Arc<Template>;

/// Cache entry: the compiled template and the fingerprint of its source.
#[derive(Debug)]
pub struct CompiledView {
    pub fingerprint: u64,
    pub template: ViewHandle,
}

pub struct ViewEngine {
    views: DashMap<String, Arc<CompiledView>>,
    compiler: Box<dyn Compile>,
    globals: Header,
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ViewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEngine")
            .field("views", &self.views.len())
            .field("globals", &self.globals.len())
            .finish()
    }
}

impl ViewEngine {
    pub fn new() -> Self {
        Self::with_compiler(TemplateParser)
    }

    pub fn with_compiler(compiler: impl Compile + 'static) -> Self {
        Self {
            views: DashMap::new(),
            compiler: Box::new(compiler),
            globals: Header::default(),
        }
    }

    /// Values visible to every template after the page header.
    pub fn with_globals(mut self, globals: Header) -> Self {
        self.globals = globals;
        self
    }

    pub fn globals(&self) -> &Header {
        &self.globals
    }

    /// Register a template asset under its file stem.
    ///
    /// A header already parsed by an earlier stage is used as-is; otherwise
    /// front matter is split from the raw source.
    pub fn register(&self, asset: &Asset) -> Result<ViewHandle, ViewError> {
        let content = asset.content();
        let text = content
            .text()
            .ok_or_else(|| ViewError::NotText(asset.relative_name().to_string()))?;

        match asset.header() {
            Some(header) => self.register_source(asset.file_stem(), text, Some(header)),
            None => {
                let (raw, body) = split_front_matter(text);
                let header = raw.map(Header::parse).transpose()?;
                self.register_source(asset.file_stem(), body, header.as_ref())
            }
        }
    }

    /// Register `source` under `name`, compiling only when the fingerprint
    /// differs from the cached entry.
    pub fn register_source(
        &self,
        name: &str,
        source: &str,
        header: Option<&Header>,
    ) -> Result<ViewHandle, ViewError> {
        let layout = header.and_then(|h| h.get_str("layout")).unwrap_or_default();
        let fingerprint = hash::compute_parts(&[source.as_bytes(), layout.as_bytes()]);

        // The entry guard holds the shard lock, so concurrent registrations
        // of one name wait here instead of compiling again.
        match self.views.entry(name.to_string()) {
            Entry::Occupied(entry) if entry.get().fingerprint == fingerprint => {
                Ok(Arc::clone(&entry.get().template))
            }
            Entry::Occupied(mut entry) => match self.compile(name, source, header, fingerprint) {
                Ok(view) => {
                    let handle = Arc::clone(&view.template);
                    entry.insert(view);
                    Ok(handle)
                }
                Err(err) => {
                    // the old template no longer matches its source
                    entry.remove();
                    Err(err)
                }
            },
            Entry::Vacant(entry) => {
                let view = self.compile(name, source, header, fingerprint)?;
                let handle = Arc::clone(&view.template);
                entry.insert(view);
                Ok(handle)
            }
        }
    }

    fn compile(
        &self,
        name: &str,
        source: &str,
        header: Option<&Header>,
        fingerprint: u64,
    ) -> Result<Arc<CompiledView>, ViewError> {
        crate::debug!("view"; "compile {}", name);
        let template = self.compiler.compile(name, source, header)?;
        Ok(Arc::new(CompiledView {
            fingerprint,
            template: Arc::new(template),
        }))
    }

    pub fn get(&self, name: &str) -> Option<ViewHandle> {
        self.views.get(name).map(|view| Arc::clone(&view.template))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn clear(&self) {
        self.views.clear();
    }

    /// Drop every template whose name is not in `names`; returns how many
    /// were dropped.
    ///
    /// Called with the template names of the current source snapshot so a
    /// deleted or renamed layout stops resolving.
    pub fn retain_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> usize {
        let live: FxHashSet<&str> = names.into_iter().collect();
        let before = self.views.len();
        self.views.retain(|name, _| live.contains(name.as_str()));
        before.saturating_sub(self.views.len())
    }

    /// Transitive includes of `name`, dependencies first.
    pub fn dependencies(&self, name: &str) -> Result<Vec<String>, ViewError> {
        let template = self
            .get(name)
            .ok_or_else(|| ViewError::Missing(name.to_string()))?;
        graph::dependencies(&template, |n| self.get(n))
    }

    /// Render a page asset through `layout` and its parent layouts.
    pub fn render_page(&self, asset: &Asset, layout: &str) -> Result<String, ViewError> {
        let content = asset.content();
        let body = content
            .text()
            .ok_or_else(|| ViewError::NotText(asset.relative_name().to_string()))?;
        let empty = Header::default();
        self.render(layout, body, asset.header().unwrap_or(&empty))
    }

    /// Wrap `body` in `layout`, then in each parent layout in turn.
    pub fn render(&self, layout: &str, body: &str, page: &Header) -> Result<String, ViewError> {
        let mut output = body.to_string();
        let mut chain: Vec<String> = Vec::new();
        let mut next = Some(template_name(layout));

        while let Some(name) = next {
            if chain.contains(&name) {
                return Err(ViewError::Cycle(graph::describe_cycle(&chain, &name)));
            }
            if chain.len() >= MAX_INCLUDE_DEPTH {
                return Err(ViewError::TooDeep {
                    name,
                    depth: MAX_INCLUDE_DEPTH,
                });
            }

            let template = self
                .get(&name)
                .ok_or_else(|| ViewError::Missing(name.clone()))?;
            let segments = graph::resolve(&template, |n| self.get(n))?;
            output = self.render_segments(&segments, &output, page);

            next = template.layout.clone();
            chain.push(name);
        }

        Ok(output)
    }

    fn render_segments(&self, segments: &[Segment], body: &str, page: &Header) -> String {
        let mut out = String::with_capacity(body.len() + 256);
        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Body => out.push_str(body),
                Segment::Var(key) => {
                    let value = page.get_path(key).or_else(|| self.globals.get_path(key));
                    if let Some(value) = value {
                        out.push_str(&html::escape(&scalar(value)));
                    }
                }
                // resolved away by graph::resolve
                Segment::Include(_) => {}
            }
        }
        out
    }
}

/// Text form of a YAML value. Sequences join their scalar items; mappings
/// render as nothing.
fn scalar(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Sequence(items) => Cow::Owned(
            items
                .iter()
                .map(scalar)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Null | Value::Mapping(_) => Cow::Borrowed(""),
    }
}
