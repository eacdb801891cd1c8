//! Domain-level errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unknown placement depth: {0}")]
    UnknownDepth(String),

    #[error("line index out of range: {index} (file has {len} lines)")]
    LineIndexOutOfRange { index: usize, len: usize },

    #[error("invalid export tree: {0}")]
    InvalidExportTree(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
