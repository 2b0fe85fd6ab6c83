//! Storage Adapters
//!
//! Implementations of the `BlobStore` trait.

#[cfg(feature = "fs")]
mod file;
mod memory;

#[cfg(feature = "fs")]
pub use file::FileSystemBlobStore;
pub use memory::InMemoryBlobStore;
