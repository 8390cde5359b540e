//! Bake orchestration.
//!
//! A bake runs one pass per configured language. Each pass fetches a fresh
//! snapshot of the source tree and drains four chains in order:
//!
//! ```text
//! templates  -> register layouts/includes with the view engine
//! markdown   -> front matter, render, layout, (minify)
//! optimize   -> html/css/js: minify or copy
//! copy       -> everything else
//! ```

mod chains;

use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use thiserror::Error;

use crate::asset::{FetchError, fetch};
use crate::config::{ConfigError, ConfigHandle, SiteConfig};
use crate::i18n::Translations;
use crate::pipeline::{BatchReport, Processor, Select, SelectError, panic_message};
use crate::utils::format_elapsed;
use crate::view::{ViewEngine, load_imports};
use crate::{debug, log};

use chains::{Chains, Selection};

/// Label and table name of the pass run when no languages are configured.
pub const DEFAULT_PASS: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeMode {
    /// Copy html/css/js as-is.
    Fast,
    /// Clean the destination first and minify.
    Optimized,
}

#[derive(Debug, Error)]
pub enum BakeError {
    #[error("cannot clean {}", .0.display())]
    Clean(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Outcome of a whole bake.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BakeSummary {
    pub passes: usize,
    pub failed_passes: usize,
    pub report: BatchReport,
    pub elapsed: Duration,
}

impl BakeSummary {
    pub fn is_success(&self) -> bool {
        self.failed_passes == 0 && self.report.failed == 0
    }
}

/// State derived from the config: translation tables and the view engine.
///
/// Rebuilt as a whole when the config or data files change.
struct Workspace {
    translations: Translations,
    views: Arc<ViewEngine>,
}

impl Workspace {
    fn new(config: &SiteConfig) -> Self {
        let globals = load_imports(&config.import_paths());
        Self {
            translations: Translations::new(config.locales_dir()),
            views: Arc::new(ViewEngine::new().with_globals(globals)),
        }
    }
}

pub struct Project {
    config: ConfigHandle,
    workspace: ArcSwap<Workspace>,
    /// Held for a whole bake; passes share one destination tree.
    baking: Mutex<()>,
}

impl Project {
    pub fn open(config: SiteConfig) -> Self {
        let workspace = Workspace::new(&config);
        Self {
            config: ConfigHandle::new(config),
            workspace: ArcSwap::from_pointee(workspace),
            baking: Mutex::new(()),
        }
    }

    pub fn config(&self) -> Arc<SiteConfig> {
        self.config.get()
    }

    /// Re-read the config file; a changed config rebuilds the workspace.
    pub fn reload(&self) -> Result<bool, ConfigError> {
        let changed = self.config.reload()?;
        if changed {
            self.reload_data();
        }
        Ok(changed)
    }

    /// Drop cached translation tables and templates and re-read imports.
    pub fn reload_data(&self) {
        self.workspace
            .store(Arc::new(Workspace::new(&self.config.get())));
    }

    /// Incremental rebuild used by the watcher.
    pub fn update(&self) -> BakeSummary {
        self.bake(BakeMode::Fast)
    }

    /// Run every pass. Failures are logged, never returned.
    ///
    /// Bakes are serialized: a watcher rebuild arriving mid-bake waits for
    /// the running one to finish.
    pub fn bake(&self, mode: BakeMode) -> BakeSummary {
        let _baking = self.baking.lock();
        let started = Instant::now();
        let config = self.config.get();
        let workspace = self.workspace.load_full();

        let languages: Vec<Option<&str>> = if config.build.languages.is_empty() {
            vec![None]
        } else {
            config.build.languages.iter().map(|l| Some(l.as_str())).collect()
        };

        let mut summary = BakeSummary::default();
        for language in languages {
            let label = language.unwrap_or(DEFAULT_PASS);
            summary.passes += 1;

            let pass = catch_unwind(AssertUnwindSafe(|| {
                self.bake_pass(&config, &workspace, language, mode)
            }));
            match pass {
                Ok(Ok(report)) => summary.report += report,
                Ok(Err(err)) => {
                    summary.failed_passes += 1;
                    log!("bake"; "{}: {:#}", label, anyhow::Error::from(err));
                }
                Err(payload) => {
                    summary.failed_passes += 1;
                    log!("bake"; "{}: panicked: {}", label, panic_message(payload.as_ref()));
                }
            }
        }

        summary.elapsed = started.elapsed();
        summary
    }

    fn bake_pass(
        &self,
        config: &SiteConfig,
        workspace: &Workspace,
        language: Option<&str>,
        mode: BakeMode,
    ) -> Result<BatchReport, BakeError> {
        let started = Instant::now();
        let label = language.unwrap_or(DEFAULT_PASS);
        let destination = config.destination_for(language);

        if mode == BakeMode::Optimized && destination.exists() {
            debug!("bake"; "cleaning {}", destination.display());
            fs::remove_dir_all(&destination)
                .map_err(|err| BakeError::Clean(destination.clone(), err))?;
        }

        let selection = Selection::new(config)?;
        let assets = fetch(config.get_root())?.except(&selection.exclude);
        debug!("bake"; "{}: {} assets", label, assets.len());

        let table = workspace.translations.get_or_load(label);
        let chains = Chains::new(config, &table, &workspace.views, mode);

        let templates = assets.only(&selection.templates);
        let pruned = workspace
            .views
            .retain_names(templates.iter().map(|asset| asset.file_stem()));
        if pruned > 0 {
            debug!("bake"; "{}: {} stale templates dropped", label, pruned);
        }
        let sources = assets.except(&selection.templates);
        let markdown = sources.only(&selection.markdown);
        let optimizable = sources.only(&selection.optimizable);
        let rest = sources
            .except(&selection.markdown)
            .except(&selection.optimizable);

        let mut total = BatchReport::default();
        for (chain, batch) in [
            (&chains.templates, templates),
            (&chains.markdown, markdown),
            (&chains.optimize, optimizable),
            (&chains.copy, rest),
        ] {
            if batch.is_empty() {
                continue;
            }
            let report = chain.on(batch).export(&destination);
            log!("bake"; "{} {}: {}", label, chain.name(), report);
            total += report;
        }

        log!("bake"; "{} done in {}", label, format_elapsed(started.elapsed()));
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project(root: &Path, config: &str) -> Project {
        write(root, CONFIG_FILE, config);
        Project::open(SiteConfig::load_or_create(&root.join(CONFIG_FILE)))
    }

    fn site(root: &Path) {
        write(root, "_layouts/base.html", "<html>{{ body }}</html>");
        write(root, "index.md", "---\nlayout: base\n---\n# Hi");
    }

    fn read(root: &Path, name: &str) -> String {
        fs::read_to_string(root.join(name)).unwrap()
    }

    #[test]
    fn test_fast_bake() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "css/site.css", "body {\n  color: red;\n}\n");
        write(root, "notes.txt", "plain");

        let summary = project(root, "").bake(BakeMode::Fast);

        assert!(summary.is_success(), "{summary:?}");
        assert_eq!(read(root, "_site/index.html"), "<html><h1>Hi</h1>\n</html>");
        assert_eq!(read(root, "_site/css/site.css"), "body {\n  color: red;\n}\n");
        assert_eq!(read(root, "_site/notes.txt"), "plain");
        assert!(!root.join("_site/_layouts").exists());
        assert!(!root.join("_site/oven.toml").exists());
        assert!(!root.join("_site/index.md").exists());
    }

    #[test]
    fn test_optimized_bake() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "_site/stale.html", "old");

        let summary = project(root, "").bake(BakeMode::Optimized);

        assert!(summary.is_success(), "{summary:?}");
        assert_eq!(read(root, "_site/index.html"), "<html><h1>Hi</h1></html>");
        assert!(!root.join("_site/stale.html").exists());
    }

    #[test]
    fn test_rebake_does_not_feed_on_its_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        let project = project(root, "");

        project.bake(BakeMode::Fast);
        let second = project.update();

        assert!(second.is_success());
        assert!(!root.join("_site/_site").exists());
        assert_eq!(second.report.written, 1);
    }

    #[test]
    fn test_markdown_without_front_matter_is_not_published() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "draft.md", "# no header");

        let summary = project(root, "").bake(BakeMode::Fast);

        assert_eq!(summary.report.dropped, 2); // the template and the draft
        assert!(!root.join("_site/draft.html").exists());
    }

    #[test]
    fn test_language_passes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "_layouts/base.html", "<p>$greeting</p>{{ body }}");
        write(root, "index.md", "---\nlayout: base\n---\n$farewell");
        write(root, "locales/en.yml", "greeting: Hello\nfarewell: Bye");
        write(root, "locales/fr.yml", "greeting: Bonjour");

        let project = project(root, "[build]\nlanguages = [\"en\", \"fr\"]\n");
        let summary = project.bake(BakeMode::Fast);

        assert_eq!(summary.passes, 2);
        assert_eq!(read(root, "_site/en/index.html"), "<p>Hello</p><p>Bye</p>\n");
        assert_eq!(read(root, "_site/fr/index.html"), "<p>Bonjour</p><p>$farewell</p>\n");
        assert!(!root.join("_site/en/locales").exists());
    }

    #[test]
    fn test_imports_are_template_globals() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "_data/site.yml", "title: Oven");
        write(root, "_layouts/base.html", "<title>{{ site.title }}</title>{{ body }}");
        write(root, "index.md", "---\nlayout: base\n---\nx");

        let project = project(root, "[build]\nimports = [\"_data/site.yml\"]\n");
        project.bake(BakeMode::Fast);
        assert_eq!(read(root, "_site/index.html"), "<title>Oven</title><p>x</p>\n");

        write(root, "_data/site.yml", "title: Changed");
        project.reload_data();
        project.bake(BakeMode::Fast);
        assert_eq!(read(root, "_site/index.html"), "<title>Changed</title><p>x</p>\n");
    }

    #[test]
    fn test_reload_picks_up_config_changes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        let project = project(root, "");
        assert!(!project.reload().unwrap());

        write(root, CONFIG_FILE, "[build]\ndestination = \"public\"\n");
        assert!(project.reload().unwrap());
        project.bake(BakeMode::Fast);
        assert!(root.join("public/index.html").exists());
    }

    #[test]
    fn test_concurrent_bakes_are_serialized() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        for i in 0..100 {
            write(root, &format!("posts/p{i}.md"), "---\nlayout: base\n---\nx");
            write(root, &format!("css/s{i}.css"), "a { color: red; }");
        }
        let project = project(root, "");

        for _ in 0..3 {
            let summaries: Vec<BakeSummary> = std::thread::scope(|scope| {
                let project = &project;
                let fast = scope.spawn(move || project.bake(BakeMode::Fast));
                let optimized = scope.spawn(move || project.bake(BakeMode::Optimized));
                vec![fast.join().unwrap(), optimized.join().unwrap()]
            });

            for summary in &summaries {
                assert!(summary.is_success(), "{summary:?}");
            }
            assert!(root.join("_site/index.html").exists());
            for i in 0..100 {
                assert!(root.join(format!("_site/posts/p{i}.html")).exists());
                assert!(root.join(format!("_site/css/s{i}.css")).exists());
            }
        }
    }

    #[test]
    fn test_deleted_layout_is_not_reused() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        let project = project(root, "");
        assert!(project.bake(BakeMode::Fast).is_success());

        fs::remove_file(root.join("_layouts/base.html")).unwrap();
        let summary = project.update();

        assert_eq!(summary.report.failed, 1, "{summary:?}");
        assert!(!project.workspace.load().views.contains("base"));
    }

    #[test]
    fn test_failing_pass_is_contained() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        let project = project(root, "");
        fs::remove_dir_all(root).unwrap();

        let summary = project.bake(BakeMode::Fast);
        assert_eq!(summary.passes, 1);
        assert_eq!(summary.failed_passes, 1);
        assert!(!summary.is_success());
    }
}
