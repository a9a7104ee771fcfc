//! Storage Layer
//!
//! Persistence for the training hierarchy and workout journal:
//!
//! - `TrainingStore` - the async persistence seam
//! - `SqliteStore` - local libsql/SQLite implementation
//! - flat-row codec between the hierarchy and its table shape

mod error;
mod sqlite_store;
mod store;

pub use error::DatabaseError;
pub use sqlite_store::SqliteStore;
pub use store::{rows_to_tree, tree_to_rows, NodeRow, TrainingStore};
