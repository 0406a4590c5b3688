//! Concrete resource providers and loaders for SERFS.
//!
//! - [`MemoryProvider`]: blobs held in memory
//! - [`DirectoryProvider`]: a directory tree exposed under flat keys
//! - [`ProviderRegistry`]: load providers by name from a fixed table
//! - [`DirectoryLoader`]: load providers by name from directories on disk

mod in_memory;
mod local_disk;
mod registry;

pub use in_memory::MemoryProvider;
pub use local_disk::DirectoryProvider;
pub use registry::{DirectoryLoader, ProviderRegistry};
