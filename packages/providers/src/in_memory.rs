//! In-memory resource provider.

use std::collections::BTreeMap;
use std::io::Cursor;

use bytes::Bytes;
use serfs_provider::{ProviderError, ResourceProvider, ResourceStream};

/// A provider holding its blobs in memory, keyed by storage key.
///
/// Useful for tests and for assets pulled in with `include_bytes!`.
///
/// # Example
///
/// ```rust
/// use std::io::Read;
/// use serfs_providers::MemoryProvider;
/// use serfs_provider::ResourceProvider;
///
/// let provider = MemoryProvider::new("assets")
///     .with_entry("App.Templates.test.txt", "Hello Serfs")
///     .with_entry("App.logo.png", &b"\x89PNG"[..]);
///
/// assert_eq!(provider.default_prefix(), "App");
/// let mut text = String::new();
/// provider.open_raw("App.Templates.test.txt").unwrap().read_to_string(&mut text).unwrap();
/// assert_eq!(text, "Hello Serfs");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    name: String,
    namespace: Option<String>,
    entries: BTreeMap<String, Bytes>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            entries: BTreeMap::new(),
        }
    }

    /// Declare the namespace root reported as the default prefix, instead of
    /// inferring it from the first key.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(key, data);
        self
    }

    /// Add or replace a blob. Bundles already built from this provider keep
    /// their old key snapshot.
    pub fn insert(&mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Option<Bytes> {
        self.entries.insert(key.into(), data.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
        match self.entries.get(key) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(ProviderError::missing_key(key)),
        }
    }

    fn default_prefix(&self) -> String {
        match &self.namespace {
            Some(namespace) => namespace.clone(),
            None => self
                .entries
                .keys()
                .next()
                .map(|key| serfs_provider::namespace_of(key).to_string())
                .unwrap_or_default(),
        }
    }
}
