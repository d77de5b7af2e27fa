//! Request lifecycle aggregate - state and transitions.
//!
//! This module contains the state machine shared by every controller:
//! - Lifecycle states and failure reasons
//! - Generation markers used to detect stale settlements
//! - The total transition function over lifecycle events

pub mod state;
pub mod transitions;

pub use state::*;
pub use transitions::{Disposition, Ignored, LifecycleEvent};
