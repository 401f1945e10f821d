//! In-memory store adapter for tests and embedded use.

mod store;

pub use store::InMemoryTaskStore;
