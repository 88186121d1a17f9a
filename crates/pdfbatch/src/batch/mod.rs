//! The batch engine: records, their JSON store, and the manager that owns
//! their lifecycle.

pub mod manager;
pub mod model;
pub mod store;

pub use manager::{BatchManager, StatusCounts};
pub use model::{Batch, BatchId, BatchStatus, FailureRecord, FileDescriptor, RenameRecord};
pub use store::BatchStore;
