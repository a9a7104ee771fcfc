//! Golden Circle Core Business Logic Layer
//!
//! This crate provides the data management, layout geometry, and service
//! orchestration for the Golden Circle training app.
//!
//! # Architecture
//!
//! - **Why/How/What hierarchy**: purposes, training methods and concrete
//!   exercises form a four-level tree rendered as a zoomable wheel
//! - **Single writer**: all mutations funnel through `TrainingService`
//! - **libsql/SQLite**: embedded local database, seeded on first run
//! - **Pure geometry**: the layout engine emits coordinates and interaction
//!   decisions; rendering stays in the UI shell
//!
//! # Modules
//!
//! - [`models`] - Data structures (TrainingNode, WorkoutLog, Journal)
//! - [`layout`] - Radial partition and zoom engine for the wheel
//! - [`services`] - Business services (TrainingService, trends)
//! - [`db`] - Storage layer with libsql integration
//! - [`bridge`] - Companion watch message bridge

pub mod bridge;
pub mod db;
pub mod layout;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use layout::{ClickAction, RadialLayout};
pub use models::{Journal, NodeUpdate, TrainingNode, WorkoutLog};
pub use services::{ServiceError, TrainingService};
