//! # Store Gateway
//!
//! Object store collaborator used by artifact cleanup.
//!
//! Responsibilities:
//! - List object keys under a prefix, one request per prefix
//! - Delete single objects, usable in a concurrent batch
//! - Talk to S3 (or an S3-compatible endpoint) through `object_store`
//! - Provide an in-memory store for tests and a directory-backed store for
//!   buckets mounted on the local filesystem

pub mod client;
pub mod error;
pub mod fs;
pub mod memory;
pub mod s3;

pub use client::{ListRequest, LocalObjectStore, ObjectStore};
pub use error::{Result, StoreError};
pub use fs::FsObjectStore;
pub use memory::{MemoryObjectStore, MemoryStoreConfig};
pub use s3::S3ObjectStore;
