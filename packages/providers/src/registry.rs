//! Loaders that resolve provider names to providers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serfs_provider::{ProviderError, ProviderHandle, ProviderLoader};

use crate::DirectoryProvider;

/// A fixed table of providers, looked up by exact name.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderHandle>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under its own name, replacing any previous entry.
    pub fn register(&mut self, provider: ProviderHandle) -> &mut Self {
        let name = provider.name().to_string();
        tracing::debug!(provider = %name, "Registering provider");
        self.providers.insert(name, provider);
        self
    }

    #[must_use]
    pub fn with(mut self, provider: ProviderHandle) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ProviderHandle> {
        self.providers.get(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}

impl ProviderLoader for ProviderRegistry {
    fn load(&self, name: &str) -> Result<ProviderHandle, ProviderError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(name))
    }
}

/// Loads a provider named `N` from a directory `N` under one of the search
/// roots, tried in order. Loaded providers are cached, so repeated loads of a
/// name share one scan.
#[derive(Default)]
pub struct DirectoryLoader {
    search_roots: Vec<PathBuf>,
    cache: Mutex<HashMap<String, ProviderHandle>>,
}

impl DirectoryLoader {
    pub fn new(search_roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_roots: search_roots.into_iter().map(Into::into).collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    // A panic while the lock was held cannot leave the map half-updated.
    fn cache(&self) -> MutexGuard<'_, HashMap<String, ProviderHandle>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DirectoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut cached: Vec<String> = self.cache().keys().cloned().collect();
        cached.sort_unstable();
        f.debug_struct("DirectoryLoader")
            .field("search_roots", &self.search_roots)
            .field("cached", &cached)
            .finish()
    }
}

impl ProviderLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<ProviderHandle, ProviderError> {
        if let Some(provider) = self.cache().get(name).cloned() {
            return Ok(provider);
        }

        // Names are single path components.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ProviderError::not_found(name));
        }

        for root in &self.search_roots {
            let candidate = root.join(name);
            if !candidate.is_dir() {
                continue;
            }
            tracing::debug!(provider = name, path = %candidate.display(), "Loading provider");
            let provider: ProviderHandle =
                Arc::new(DirectoryProvider::with_namespace(candidate, name)?);
            self.cache().insert(name.to_string(), provider.clone());
            return Ok(provider);
        }

        tracing::debug!(provider = name, "No directory found for provider");
        Err(ProviderError::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryProvider;
    use std::fs;

    #[test]
    fn registry_loads_by_exact_name() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(MemoryProvider::new("Assets").with_entry("Assets.a", "a")))
            .with(Arc::new(MemoryProvider::new("Other")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.load("Assets").unwrap().name(), "Assets");
        assert!(matches!(registry.load("assets"), Err(e) if e.is_not_found()));
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MemoryProvider::new("A").with_entry("A.one", "")));
        registry.register(Arc::new(MemoryProvider::new("A").with_entry("A.two", "")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.load("A").unwrap().list_keys(), vec!["A.two"]);
    }

    #[test]
    fn directory_loader_searches_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::create_dir_all(second.path().join("Shared")).unwrap();
        fs::write(second.path().join("Shared/x.txt"), "second").unwrap();
        fs::create_dir_all(first.path().join("Only")).unwrap();
        fs::write(first.path().join("Only/y.txt"), "first").unwrap();

        let loader = DirectoryLoader::new([first.path(), second.path()]);
        assert_eq!(loader.load("Shared").unwrap().list_keys(), vec!["Shared.x.txt"]);
        assert_eq!(loader.load("Only").unwrap().list_keys(), vec!["Only.y.txt"]);
        assert!(matches!(loader.load("Missing"), Err(e) if e.is_not_found()));
    }

    #[test]
    fn directory_loader_caches() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("Cached")).unwrap();
        let loader = DirectoryLoader::new([root.path()]);

        let first = loader.load("Cached").unwrap();
        let second = loader.load("Cached").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn directory_loader_rejects_path_names() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("a/b")).unwrap();
        let loader = DirectoryLoader::new([root.path()]);
        for name in ["a/b", "..", ""] {
            assert!(matches!(loader.load(name), Err(e) if e.is_not_found()));
        }
    }

    #[test]
    fn directory_loader_caches_after_a_poisoned_lock() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("Cached")).unwrap();
        let loader = Arc::new(DirectoryLoader::new([root.path()]));

        let holder = loader.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.cache.lock().unwrap();
            panic!("panic while holding the cache");
        })
        .join();
        assert!(loader.cache.is_poisoned());

        let first = loader.load("Cached").unwrap();
        let second = loader.load("Cached").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(format!("{:?}", loader).contains("Cached"));
    }
}
