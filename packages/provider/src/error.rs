//! Error types for the provider layer.
//!
//! These are capability failures only. "Path not found" is not an error at
//! this level or any level above it; a provider is only ever asked to open
//! keys it listed itself.

use thiserror::Error;

/// Errors raised by providers and loaders.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No provider could be loaded under this name.
    #[error("provider not found: {name}")]
    NotFound { name: String },

    /// The provider does not hold a blob under this key.
    #[error("no resource under key: {key}")]
    MissingKey { key: String },

    /// I/O failure while opening or enumerating resources.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider-specific failure.
    #[error("{message}")]
    Other { message: String },
}

impl ProviderError {
    pub fn not_found(name: impl Into<String>) -> Self {
        ProviderError::NotFound { name: name.into() }
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        ProviderError::MissingKey { key: key.into() }
    }

    /// True for the "no such provider" case a loader reports.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}
