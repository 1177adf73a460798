//! Character-budgeted analysis window.
//!
//! Recency is the only priority signal: the window is the longest run of most
//! recent entries whose formatted size fits the prompt budget.

pub mod builder;

pub use builder::{DEFAULT_ENTRY_OVERHEAD, Window, build_window};
