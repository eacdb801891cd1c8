//! Hypothesis-generation session: a forest plus its persistence mirror.
//!
//! Every mutating operation re-saves the snapshot. Saves are best-effort; the
//! in-memory forest is authoritative for the lifetime of the session.

use tracing::debug;

use crate::application::snapshot::{GenerationSnapshot, SnapshotStore};
use crate::domain::{Depth, Forest};

pub struct HypothesisSession {
    store: SnapshotStore,
    snapshot: GenerationSnapshot,
}

impl HypothesisSession {
    /// Open a session from the snapshot store, starting fresh when no usable
    /// snapshot exists.
    pub fn open(store: SnapshotStore) -> Self {
        let snapshot = store.load().unwrap_or_default();
        debug!(
            "session opened: {} groups",
            snapshot.groups.groups.len()
        );
        Self { store, snapshot }
    }

    pub fn forest(&self) -> &Forest {
        &self.snapshot.groups
    }

    pub fn scroll_top(&self) -> f64 {
        self.snapshot.scroll_top
    }

    /// Fan-out add at the given depth, then persist.
    pub fn generate(&mut self, depth: Depth, label: &str) {
        self.snapshot.groups.add(depth, label);
        self.persist();
    }

    /// Run the reference synchronizer, then persist.
    pub fn sync(&mut self) {
        self.snapshot.groups.sync_with_reference();
        self.persist();
    }

    /// Cascade-remove every node carrying the label, then persist.
    pub fn remove_label(&mut self, label: &str) {
        self.snapshot.groups.remove_label(label);
        self.persist();
    }

    /// Drop all groups, then persist.
    pub fn clear(&mut self) {
        self.snapshot.groups.clear();
        self.persist();
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.snapshot.scroll_top = scroll_top;
        self.persist();
    }

    /// Replace the forest wholesale (import path), then persist.
    pub fn replace_forest(&mut self, forest: Forest) {
        self.snapshot.groups = forest;
        self.persist();
    }

    fn persist(&self) {
        self.store.save(&self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::snapshot::SNAPSHOT_FILE;
    use crate::infrastructure::traits::RealFileSystem;
    use std::sync::Arc;

    fn open_in(dir: &std::path::Path) -> HypothesisSession {
        let store = SnapshotStore::new(Arc::new(RealFileSystem), dir.join(SNAPSHOT_FILE));
        HypothesisSession::open(store)
    }

    #[test]
    fn given_mutations_when_reopening_then_state_survives() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut session = open_in(dir.path());
            session.generate(Depth::Who, "Nation X");
            session.generate(Depth::What, "Economic");
            session.set_scroll_top(42.0);
        }
        let session = open_in(dir.path());
        assert_eq!(session.forest().groups.len(), 1);
        assert_eq!(session.forest().groups[0].whats[0].label, "Economic");
        assert_eq!(session.scroll_top(), 42.0);
    }

    #[test]
    fn given_clear_when_reopening_then_empty_forest() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut session = open_in(dir.path());
            session.generate(Depth::Who, "Nation X");
            session.clear();
        }
        assert!(open_in(dir.path()).forest().groups.is_empty());
    }
}
