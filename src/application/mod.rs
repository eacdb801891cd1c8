//! Application layer: sessions, snapshot persistence, and per-tool services.

pub mod error;
pub mod services;
pub mod session;
pub mod snapshot;

pub use error::{ApplicationError, ApplicationResult};
pub use session::HypothesisSession;
pub use snapshot::{GenerationSnapshot, SnapshotStore};
