//! Indicator journal: append-only JSONL of normalized keyword records.
//!
//! The timeline and causal-map tools both funnel "Generate Hypothesis
//! Keywords" submissions into the circleboard tool's
//! `hypothesis_keywords.jsonl`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::indicators::IndicatorRecord;
use crate::infrastructure::traits::FileSystem;

pub const JOURNAL_FILE: &str = "hypothesis_keywords.jsonl";

pub struct IndicatorJournal {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl IndicatorJournal {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalize the body against the current clock and append one line.
    pub fn append(&self, body: &Value) -> ApplicationResult<IndicatorRecord> {
        let record = IndicatorRecord::normalize(body, Utc::now());
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| ApplicationError::io(format!("create {}", self.path.display()), e))?;
        self.fs
            .append(&self.path, &record.to_jsonl_line())
            .map_err(|e| ApplicationError::io(format!("append {}", self.path.display()), e))?;
        debug!("indicator appended: {}", self.path.display());
        Ok(record)
    }

    /// Raw journal content; a missing file reads as empty.
    pub fn load_raw(&self) -> ApplicationResult<String> {
        match self.fs.read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ApplicationError::io(
                format!("read {}", self.path.display()),
                e,
            )),
        }
    }
}
