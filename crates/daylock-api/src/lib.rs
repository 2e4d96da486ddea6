//! Shared vocabulary types for daylock
//!
//! Everything an external layer (GUI, tray, CLI) needs to talk about:
//! rules and their allowed-day sets, per-poll process snapshots,
//! termination outcomes, and user-visible notifications. All types are
//! serde-serializable so a foreground layer can consume them over any
//! transport.

mod events;
mod types;

pub use events::*;
pub use types::*;
