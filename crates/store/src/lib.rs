//! `stockroom-store` — the document-store boundary.
//!
//! The back office persists everything in an external managed document
//! database. This crate defines the consumed surface of that database as a
//! trait (so the client handle is an explicitly injected dependency) plus an
//! in-memory implementation for tests and development.

pub mod collections;
pub mod document_store;

pub use document_store::{
    Document, DocumentStore, InMemoryDocumentStore, StoreError, StoreResult, WriteBatch, WriteOp,
};
