//! SERFS provider layer: the capabilities the resolution engine is built on.
//!
//! A resource provider is an external source of immutable, flat-named byte
//! blobs (an asset bundle compiled into a binary, a directory snapshot, an
//! archive). This crate only describes what the engine needs from one:
//!
//! - list every key it owns
//! - open a raw byte stream for one of those keys
//! - report a default key prefix (its namespace root)
//!
//! Providers are discovered through a [`ProviderLoader`], which resolves a
//! name to a [`ProviderHandle`].
//!
//! # Example
//!
//! ```rust
//! use std::io::{Cursor, Read};
//! use serfs_provider::{ProviderError, ResourceProvider, ResourceStream};
//!
//! struct Single;
//!
//! impl ResourceProvider for Single {
//!     fn name(&self) -> &str {
//!         "single"
//!     }
//!
//!     fn list_keys(&self) -> Vec<String> {
//!         vec!["App.hello.txt".to_string()]
//!     }
//!
//!     fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
//!         match key {
//!             "App.hello.txt" => Ok(Box::new(Cursor::new(b"hello".to_vec()))),
//!             _ => Err(ProviderError::missing_key(key)),
//!         }
//!     }
//! }
//!
//! assert_eq!(Single.default_prefix(), "App");
//! let mut text = String::new();
//! Single.open_raw("App.hello.txt").unwrap().read_to_string(&mut text).unwrap();
//! assert_eq!(text, "hello");
//! ```

mod error;
mod traits;

pub use error::ProviderError;
pub use traits::{namespace_of, ProviderHandle, ProviderLoader, ResourceProvider, ResourceStream};
