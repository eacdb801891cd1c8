//! Per-tool endpoint groups, one module per worksheet.

pub mod ach;
pub mod circleboard;
pub mod hypothesis;
pub mod indicators;
