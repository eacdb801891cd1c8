//! Hypothesis-generation file store.
//!
//! Two artifacts live under the hypothesis tool root: the source bullet list
//! at `input/source_list.txt` (header `So What?`) and the flat
//! `Hypotheses.txt`, one generated permutation per line. Both are plain
//! whole-file rewrites; concurrent writers race with last-write-wins.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::bullets::{self, SO_WHAT_HEADER};
use crate::domain::DomainError;
use crate::infrastructure::traits::FileSystem;

pub const SOURCE_FILE: &str = "input/source_list.txt";
pub const HYPOTHESES_FILE: &str = "Hypotheses.txt";

/// File store for the hypothesis-generation worksheet.
pub struct HypothesisStore {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl HypothesisStore {
    pub fn new(fs: Arc<dyn FileSystem>, root: PathBuf) -> Self {
        Self { fs, root }
    }

    pub fn source_path(&self) -> PathBuf {
        self.root.join(SOURCE_FILE)
    }

    pub fn hypotheses_path(&self) -> PathBuf {
        self.root.join(HYPOTHESES_FILE)
    }

    /// Append one bullet to the source list, creating the file with its
    /// header when absent. The label must be non-blank; callers validate.
    pub fn add_source(&self, label: &str) -> ApplicationResult<()> {
        let path = self.source_path();
        self.fs
            .ensure_parent(&path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        let existing = self.fs.read_to_string(&path).ok();
        let content = bullets::append(existing.as_deref(), label, SO_WHAT_HEADER);
        self.fs
            .write(&path, &content)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))?;
        debug!("add_source: appended to {}", path.display());
        Ok(())
    }

    /// Read the source list. A missing file yields an empty list.
    pub fn read_sources(&self) -> ApplicationResult<Vec<String>> {
        let path = self.source_path();
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok(bullets::parse(&content, SO_WHAT_HEADER)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ApplicationError::io(format!("read {}", path.display()), e)),
        }
    }

    /// Rewrite the whole source list from the given items.
    pub fn write_sources(&self, items: &[String]) -> ApplicationResult<()> {
        let path = self.source_path();
        self.fs
            .ensure_parent(&path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        let content = bullets::render(items, SO_WHAT_HEADER);
        self.fs
            .write(&path, &content)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }

    /// Append one line to `Hypotheses.txt`, creating it when missing.
    pub fn append_hypothesis(&self, line: &str) -> ApplicationResult<()> {
        let path = self.hypotheses_path();
        self.fs
            .ensure_parent(&path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        self.fs
            .append(&path, &format!("{line}\n"))
            .map_err(|e| ApplicationError::io(format!("append {}", path.display()), e))
    }

    /// Rewrite `Hypotheses.txt` from the given lines (no trailing newline,
    /// matching the historical file shape).
    pub fn rewrite_hypotheses(&self, lines: &[String]) -> ApplicationResult<()> {
        let path = self.hypotheses_path();
        self.fs
            .ensure_parent(&path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        self.fs
            .write(&path, &lines.join("\n"))
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }

    fn read_hypothesis_lines(&self) -> ApplicationResult<Vec<String>> {
        let path = self.hypotheses_path();
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok(split_lines(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![String::new()]),
            Err(e) => Err(ApplicationError::io(format!("read {}", path.display()), e)),
        }
    }

    /// Replace the line at `index`. An index at or past the end of the file
    /// is rejected, never extended.
    pub fn update_hypothesis_line(&self, index: usize, text: &str) -> ApplicationResult<()> {
        let mut lines = self.read_hypothesis_lines()?;
        if index >= lines.len() {
            return Err(DomainError::LineIndexOutOfRange {
                index,
                len: lines.len(),
            }
            .into());
        }
        lines[index] = text.to_string();
        self.rewrite_hypotheses(&lines)
    }

    /// Delete `Hypotheses.txt`. A missing file is not an error.
    pub fn delete_hypotheses(&self) -> ApplicationResult<()> {
        let path = self.hypotheses_path();
        match self.fs.remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApplicationError::io(format!("remove {}", path.display()), e)),
        }
    }

    /// Overwrite the source file with raw content, creating its directory.
    /// Used by the circleboard tool's cross-write.
    pub fn write_source_raw(&self, content: &str) -> ApplicationResult<()> {
        let path = self.source_path();
        self.fs
            .ensure_parent(&path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        self.fs
            .write(&path, content)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }
}

/// Split preserving empty segments, on `\n` or `\r\n`. An empty string is a
/// single empty line, mirroring how the file is indexed for updates.
fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}
