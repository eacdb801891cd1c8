//! Circle-boarding file store.
//!
//! The board body is persisted verbatim to `CircleboardData.txt`; the tool
//! also cross-writes the hypothesis-generation source file (see
//! [`crate::application::services::hypothesis`]).

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::FileSystem;

pub const BOARD_FILE: &str = "CircleboardData.txt";

pub struct CircleboardStore {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl CircleboardStore {
    pub fn new(fs: Arc<dyn FileSystem>, root: PathBuf) -> Self {
        Self { fs, root }
    }

    pub fn board_path(&self) -> PathBuf {
        self.root.join(BOARD_FILE)
    }

    /// Overwrite the board file with the raw request body.
    pub fn save_board(&self, raw: &str) -> ApplicationResult<()> {
        let path = self.board_path();
        self.fs
            .ensure_parent(&path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        self.fs
            .write(&path, raw)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }

    /// Board content; a missing file reads as `None`.
    pub fn load_board(&self) -> ApplicationResult<Option<String>> {
        let path = self.board_path();
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::io(format!("read {}", path.display()), e)),
        }
    }
}
