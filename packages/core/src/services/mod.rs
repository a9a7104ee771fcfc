//! Service Layer
//!
//! Business logic over the data models:
//!
//! - `TrainingService` - the single writer orchestrating state, persistence
//!   and the device bridge
//! - `trends` - pure aggregation over the workout journal
//! - `ServiceError` - errors surfaced to callers

mod error;
pub mod trends;
mod training_service;

pub use error::ServiceError;
pub use training_service::{SessionCounts, TrainingService};
