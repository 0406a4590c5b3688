//! Error types for the resolution engine.
//!
//! Nothing here means "not found". Lookups that miss return `Ok(None)`,
//! `false` or an empty listing; only failures that indicate a broken
//! provider, undecodable content or bad configuration become errors.

use thiserror::Error;

use serfs_provider::ProviderError;

/// Errors at the engine layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A key listed in a provider's snapshot could not be opened. The
    /// snapshot and the backing store have diverged.
    #[error("corrupt provider '{provider}': listed key {key} failed to open: {source}")]
    CorruptProvider {
        provider: String,
        key: String,
        #[source]
        source: ProviderError,
    },

    /// A resource read as text is not valid UTF-8.
    #[error("resource {path} is not valid UTF-8: {source}")]
    InvalidText {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Reading an opened stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Overlay configuration could not be loaded or applied.
    #[error("config error: {message}")]
    Config { message: String },

    /// Overlay configuration is not valid JSON for its schema.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
