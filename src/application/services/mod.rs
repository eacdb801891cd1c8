//! Application services, one per worksheet tool's file surface.

pub mod ach;
pub mod circleboard;
pub mod hypothesis;
pub mod indicators;

pub use ach::AchStore;
pub use circleboard::CircleboardStore;
pub use hypothesis::HypothesisStore;
pub use indicators::IndicatorJournal;
