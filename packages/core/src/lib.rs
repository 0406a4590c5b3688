//! SERFS core: a read-only virtual filesystem over flat resource keys.
//!
//! Resource providers store blobs under flat, dotted keys
//! (`App.Templates.page.html`). This crate lets callers address them with
//! ordinary paths (`page.html`, `Templates/page.html`) and layers several
//! providers and mount folders into one searchable tree:
//!
//! - [`key`]: the pure path to key codec
//! - [`ResourceBundle`]: one provider's key snapshot plus mount folders
//! - [`ResourceOverlay`]: an ordered stack of bundles, first hit wins
//! - [`StreamDecoder`]: a transform applied to every opened stream
//! - [`OverlayConfig`]: JSON description of an overlay
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use serfs_core::{ProviderError, ResourceOverlay, ResourceProvider, ResourceStream};
//!
//! struct Site;
//!
//! impl ResourceProvider for Site {
//!     fn name(&self) -> &str { "site" }
//!     fn list_keys(&self) -> Vec<String> {
//!         vec![
//!             "Site.www.index.html".to_string(),
//!             "Site.www.css.main.css".to_string(),
//!         ]
//!     }
//!     fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
//!         Ok(Box::new(Cursor::new(key.as_bytes().to_vec())))
//!     }
//! }
//!
//! let overlay = ResourceOverlay::new(Arc::new(Site), "www");
//! assert!(overlay.exists("INDEX.html"));
//! assert!(overlay.folder_exists("css"));
//! assert_eq!(overlay.list_names("/"), vec!["css.main.css", "index.html"]);
//! ```

pub use bytes::Bytes;

mod bundle;
pub mod config;
pub mod decoder;
mod error;
pub mod key;
pub mod overlay;

pub use bundle::ResourceBundle;
pub use config::{OverlayConfig, ProviderConfig};
pub use decoder::{DecoderKind, GzipDecoder, IdentityDecoder, StreamDecoder};
pub use error::{Error, Result};
pub use overlay::ResourceOverlay;

// Re-export provider types for convenience
pub use serfs_provider::{
    ProviderError, ProviderHandle, ProviderLoader, ResourceProvider, ResourceStream,
};
