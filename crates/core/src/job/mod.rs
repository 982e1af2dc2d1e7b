//! Job records and the registry that tracks them.

mod memory;
mod store;
mod types;

pub use memory::MemoryJobStore;
pub use store::{JobStore, StoreError};
pub use types::{JobParams, JobRecord, JobStatus};
