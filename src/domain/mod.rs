//! Core worksheet data structures and pure transformations.

pub mod bullets;
pub mod circleboard;
pub mod error;
pub mod evidence;
pub mod forest;
pub mod indicators;

pub use error::{DomainError, DomainResult};
pub use forest::{Depth, Forest, WhatNode, WhoNode, WhyNode};
