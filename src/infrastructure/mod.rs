//! Infrastructure layer: I/O boundary traits and their real implementations.

pub mod traits;

pub use traits::{FileSystem, RealFileSystem};
