use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 300;
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Quiet-period debouncer: collects events until none arrived for
/// `DEBOUNCE_MS`, and keeps rebuilds at least `REBUILD_COOLDOWN_MS` apart.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_rebuild: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_rebuild: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Removed then Created/Modified: restored, keep the new kind
    /// - Modified then Removed: Removed
    /// - Created then Removed: nothing happened
    /// - otherwise the first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // metadata-only changes would retrigger on our own writes
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);

            match self.changes.get(&path).copied() {
                None => {
                    crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => continue,
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the collected changes once the quiet period and cooldown passed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        self.last_rebuild = Some(Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_rebuild) = self.last_rebuild
            && last_rebuild.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Time until the debouncer could next become ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_rebuild
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Editor swap, backup and other temporary files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
        || name == "4913"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(paths: &[&str], kind: notify::EventKind) -> notify::Event {
        notify::Event {
            kind,
            paths: paths.iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    fn modify() -> notify::EventKind {
        notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Any,
        ))
    }

    fn create() -> notify::EventKind {
        notify::EventKind::Create(notify::event::CreateKind::File)
    }

    fn remove() -> notify::EventKind {
        notify::EventKind::Remove(notify::event::RemoveKind::File)
    }

    #[test]
    fn test_debouncer_empty() {
        let debouncer = Debouncer::new();
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.sleep_duration(), Duration::from_secs(86400));
    }

    #[test]
    fn test_event_kinds() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(&["/tmp/oven-a.md"], create()));
        debouncer.add_event(&event(&["/tmp/oven-b.md"], modify()));
        debouncer.add_event(&event(&["/tmp/oven-c.md"], remove()));

        assert_eq!(debouncer.changes.len(), 3);
        assert_eq!(debouncer.changes[&PathBuf::from("/tmp/oven-a.md")], ChangeKind::Created);
        assert_eq!(debouncer.changes[&PathBuf::from("/tmp/oven-b.md")], ChangeKind::Modified);
        assert_eq!(debouncer.changes[&PathBuf::from("/tmp/oven-c.md")], ChangeKind::Removed);
    }

    #[test]
    fn test_dedup_transitions() {
        let mut debouncer = Debouncer::new();
        let path = PathBuf::from("/tmp/oven-x.md");

        debouncer.add_event(&event(&["/tmp/oven-x.md"], modify()));
        debouncer.add_event(&event(&["/tmp/oven-x.md"], modify()));
        assert_eq!(debouncer.changes.len(), 1);

        debouncer.add_event(&event(&["/tmp/oven-x.md"], remove()));
        assert_eq!(debouncer.changes[&path], ChangeKind::Removed);

        debouncer.add_event(&event(&["/tmp/oven-x.md"], create()));
        assert_eq!(debouncer.changes[&path], ChangeKind::Created);

        debouncer.add_event(&event(&["/tmp/oven-x.md"], remove()));
        assert!(debouncer.changes.is_empty());
    }

    #[test]
    fn test_ignores_metadata_and_temp_files() {
        let mut debouncer = Debouncer::new();
        let metadata = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::WriteTime,
        ));
        debouncer.add_event(&event(&["/tmp/oven-a.md"], metadata));
        debouncer.add_event(&event(&["/tmp/a.md.swp", "/tmp/a.md~", "/tmp/.#a.md"], modify()));
        assert!(debouncer.changes.is_empty());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(&["/tmp/oven-a.md"], modify()));
        assert!(!debouncer.is_ready());
        assert!(debouncer.take_if_ready().is_none());
        assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 10));
        let changes = debouncer.take_if_ready().unwrap();
        assert_eq!(changes.len(), 1);
        assert!(debouncer.changes.is_empty());
    }

    #[test]
    fn test_cooldown_after_rebuild() {
        let mut debouncer = Debouncer::new();
        debouncer.last_rebuild = Some(Instant::now());
        debouncer.add_event(&event(&["/tmp/oven-a.md"], modify()));
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 10));

        assert!(!debouncer.is_ready());
        assert!(debouncer.sleep_duration() > Duration::from_millis(DEBOUNCE_MS));

        debouncer.last_rebuild =
            Some(Instant::now() - Duration::from_millis(REBUILD_COOLDOWN_MS + 10));
        assert!(debouncer.is_ready());
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/s/index.md.bak")));
        assert!(is_temp_file(Path::new("/s/4913")));
        assert!(!is_temp_file(Path::new("/s/index.md")));
        assert!(!is_temp_file(Path::new("/s/.gitignore")));
    }
}
