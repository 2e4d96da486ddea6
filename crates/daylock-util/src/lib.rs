//! Shared utilities for daylock
//!
//! This crate provides:
//! - Identity types (RuleId, RuleIdentity) and normalization helpers
//! - Time utilities (wall clock with mock support, current weekday)
//! - Default paths for data and config directories

mod identity;
mod paths;
mod time;

pub use identity::*;
pub use paths::*;
pub use time::*;
