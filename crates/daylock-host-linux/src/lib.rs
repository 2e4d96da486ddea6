//! Linux host collaborators for daylock
//!
//! Implements the process table and terminator seams against /proc and
//! POSIX signals.

mod process_table;
mod terminator;

pub use process_table::*;
pub use terminator::*;
