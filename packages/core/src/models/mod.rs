//! Data Models
//!
//! Core data structures shared across the crate:
//!
//! - `TrainingNode` - the Why/How/What hierarchy and its pure tree operations
//! - `WorkoutLog` / `Journal` - logged events and the in-memory log store
//! - `seed` - the known-good default dataset

mod log;
mod node;
pub mod seed;

pub use log::{Journal, WorkoutLog, DEFAULT_UNIT, UNKNOWN_NODE_NAME};
pub use node::{colors, NodeUpdate, TrainingNode};
