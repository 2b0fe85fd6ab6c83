//! # Adapters Module
//!
//! Adapter implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: blob stores (in-memory, local filesystem)
//! - `infra`: time source

pub mod infra;
pub mod storage;

pub use infra::SystemTimeSource;
#[cfg(feature = "fs")]
pub use storage::FileSystemBlobStore;
pub use storage::InMemoryBlobStore;
