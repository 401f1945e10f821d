//! Port contracts for task persistence and live change streams.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod batch;
pub mod store;

pub use batch::{ChunkedSubscription, chunked_query};
pub use store::{
    MAX_SET_FILTER_ITEMS, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult, TaskSubscription,
};
