//! Core domain types for the valuation client.
//!
//! This module contains pure domain types with no I/O:
//! - Property attributes and their validators
//! - Market statistics snapshots
//! - The request lifecycle state machine

pub mod lifecycle;
pub mod property;
pub mod statistics;
