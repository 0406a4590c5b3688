//! Stream decoders: transforms applied to raw provider streams.

use std::sync::Arc;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::ResourceStream;

/// Transform a raw provider stream before it reaches the caller.
///
/// Decoders are shared between bundles as `Arc<dyn StreamDecoder>`.
///
/// # Implementing Custom Decoders
///
/// ```rust
/// use std::io::Read;
/// use serfs_core::{ResourceStream, StreamDecoder};
///
/// /// Hands out at most the first kilobyte of every resource.
/// struct Preview;
///
/// impl StreamDecoder for Preview {
///     fn decode(&self, raw: ResourceStream) -> ResourceStream {
///         Box::new(raw.take(1024))
///     }
/// }
/// ```
pub trait StreamDecoder: Send + Sync {
    /// Wrap or replace `raw`. Failures belong to the returned stream's
    /// `read`.
    fn decode(&self, raw: ResourceStream) -> ResourceStream;
}

/// Passes streams through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityDecoder;

impl StreamDecoder for IdentityDecoder {
    fn decode(&self, raw: ResourceStream) -> ResourceStream {
        raw
    }
}

/// Decompresses gzip-encoded resources on the fly.
#[derive(Debug, Default, Clone, Copy)]
pub struct GzipDecoder;

impl StreamDecoder for GzipDecoder {
    fn decode(&self, raw: ResourceStream) -> ResourceStream {
        Box::new(GzDecoder::new(raw))
    }
}

/// Named decoders for configuration files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    #[default]
    Identity,
    Gzip,
}

impl DecoderKind {
    pub fn build(self) -> Arc<dyn StreamDecoder> {
        match self {
            DecoderKind::Identity => Arc::new(IdentityDecoder),
            DecoderKind::Gzip => Arc::new(GzipDecoder),
        }
    }
}

impl std::fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderKind::Identity => write!(f, "identity"),
            DecoderKind::Gzip => write!(f, "gzip"),
        }
    }
}

impl<T: StreamDecoder + ?Sized> StreamDecoder for Arc<T> {
    fn decode(&self, raw: ResourceStream) -> ResourceStream {
        self.as_ref().decode(raw)
    }
}

impl<T: StreamDecoder + ?Sized> StreamDecoder for Box<T> {
    fn decode(&self, raw: ResourceStream) -> ResourceStream {
        self.as_ref().decode(raw)
    }
}
