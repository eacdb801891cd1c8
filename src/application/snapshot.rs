//! Local persistence mirror for the hypothesis forest.
//!
//! `{groups, scrollTop}` is written to `state.json` under the hypothesis tool
//! root on every mutating operation. Writes are best-effort: a failure is
//! logged at debug and swallowed, matching the fire-and-forget character of
//! the persistence layer. A missing or corrupt snapshot loads as `None`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Forest;
use crate::infrastructure::traits::FileSystem;

pub const SNAPSHOT_FILE: &str = "state.json";

/// One durable snapshot of the worksheet: the forest plus saved viewport
/// state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationSnapshot {
    pub groups: Forest,
    #[serde(rename = "scrollTop", default)]
    pub scroll_top: f64,
}

/// Snapshot reader/writer bound to one file path.
pub struct SnapshotStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load the snapshot. Missing file and parse failure both yield `None`
    /// so a damaged snapshot never blocks a fresh session.
    pub fn load(&self) -> Option<GenerationSnapshot> {
        let content = match self.fs.read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("snapshot load skipped: {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("snapshot unreadable: {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Write the snapshot, best-effort. Failures are logged at debug and
    /// swallowed; the in-memory state stays authoritative.
    pub fn save(&self, snapshot: &GenerationSnapshot) {
        let content = match serde_json::to_string_pretty(snapshot) {
            Ok(content) => content,
            Err(e) => {
                debug!("snapshot serialize failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.fs.ensure_parent(&self.path) {
            debug!("snapshot dir create failed: {}: {}", self.path.display(), e);
            return;
        }
        if let Err(e) = self.fs.write(&self.path, &content) {
            debug!("snapshot write failed: {}: {}", self.path.display(), e);
        }
    }
}
