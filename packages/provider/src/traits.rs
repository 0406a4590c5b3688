//! Provider and loader traits.

use std::io::Read;
use std::sync::Arc;

use crate::ProviderError;

/// A readable byte stream owned by the caller.
pub type ResourceStream = Box<dyn Read + Send>;

/// Shared handle to a loaded provider.
pub type ProviderHandle = Arc<dyn ResourceProvider>;

/// A source of immutable, flat-named byte blobs.
///
/// Keys are opaque, dot-separated identifiers such as
/// `App.Templates.page.html`. The provider never interprets them; the
/// resolution engine decides which key a logical path maps to.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn ResourceProvider>`.
pub trait ResourceProvider: Send + Sync {
    /// Name of the provider, used in logs and errors. Names need not be
    /// unique; registrations are told apart by handle.
    fn name(&self) -> &str;

    /// Every key this provider can open.
    ///
    /// Callers capture this once; a provider whose contents change later is
    /// not re-enumerated.
    fn list_keys(&self) -> Vec<String>;

    /// Open the blob stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(stream)` - A fresh stream positioned at the start of the blob.
    /// * `Err(ProviderError)` - The key is unknown or the blob is unreadable.
    fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError>;

    /// Prefix used when no explicit one is supplied.
    ///
    /// Defaults to the namespace of the first listed key, or the empty
    /// string for a provider with no keys.
    fn default_prefix(&self) -> String {
        self.list_keys()
            .first()
            .map(|key| namespace_of(key).to_string())
            .unwrap_or_default()
    }
}

/// Resolves provider names to handles.
pub trait ProviderLoader: Send + Sync {
    /// Load the provider called `name`.
    ///
    /// Returns `Err(ProviderError::NotFound)` when nothing answers to the
    /// name.
    fn load(&self, name: &str) -> Result<ProviderHandle, ProviderError>;
}

/// The namespace root of a key: everything before its first `.`.
///
/// A key without a dot is its own namespace.
pub fn namespace_of(key: &str) -> &str {
    key.split_once('.').map_or(key, |(ns, _)| ns)
}

// Blanket implementations for shared and boxed providers

impl<T: ResourceProvider + ?Sized> ResourceProvider for Arc<T> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn list_keys(&self) -> Vec<String> {
        self.as_ref().list_keys()
    }

    fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
        self.as_ref().open_raw(key)
    }

    fn default_prefix(&self) -> String {
        self.as_ref().default_prefix()
    }
}

impl<T: ResourceProvider + ?Sized> ResourceProvider for Box<T> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn list_keys(&self) -> Vec<String> {
        self.as_ref().list_keys()
    }

    fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
        self.as_ref().open_raw(key)
    }

    fn default_prefix(&self) -> String {
        self.as_ref().default_prefix()
    }
}

impl<T: ProviderLoader + ?Sized> ProviderLoader for Arc<T> {
    fn load(&self, name: &str) -> Result<ProviderHandle, ProviderError> {
        self.as_ref().load(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct TestProvider {
        keys: Vec<String>,
    }

    impl ResourceProvider for TestProvider {
        fn name(&self) -> &str {
            "test"
        }

        fn list_keys(&self) -> Vec<String> {
            self.keys.clone()
        }

        fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
            if self.keys.iter().any(|k| k == key) {
                Ok(Box::new(Cursor::new(key.as_bytes().to_vec())))
            } else {
                Err(ProviderError::missing_key(key))
            }
        }
    }

    #[test]
    fn default_prefix_uses_first_key_namespace() {
        let provider = TestProvider {
            keys: vec!["Game.Maps.level1.map".into(), "Other.x".into()],
        };
        assert_eq!(provider.default_prefix(), "Game");
    }

    #[test]
    fn default_prefix_of_empty_provider_is_empty() {
        let provider = TestProvider { keys: vec![] };
        assert_eq!(provider.default_prefix(), "");
    }

    #[test]
    fn namespace_of_key_without_dot() {
        assert_eq!(namespace_of("README"), "README");
        assert_eq!(namespace_of("a.b.c"), "a");
        assert_eq!(namespace_of(""), "");
    }

    #[test]
    fn object_safety_works() {
        let handle: ProviderHandle = Arc::new(TestProvider {
            keys: vec!["T.a.txt".into()],
        });
        assert_eq!(handle.name(), "test");
        assert!(handle.open_raw("T.a.txt").is_ok());
        assert!(handle.open_raw("T.b.txt").is_err());
    }

    #[test]
    fn arc_of_handle_delegates() {
        let handle: ProviderHandle = Arc::new(TestProvider {
            keys: vec!["T.a.txt".into()],
        });
        let wrapped = Arc::new(handle);
        assert_eq!(wrapped.default_prefix(), "T");
        assert_eq!(wrapped.list_keys(), vec!["T.a.txt".to_string()]);
    }
}
