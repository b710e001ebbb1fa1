//! Document-store boundary.
//!
//! This module defines the infrastructure-facing abstraction over the
//! external document database without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{Document, DocumentStore, StoreError, StoreResult, WriteBatch, WriteOp};
