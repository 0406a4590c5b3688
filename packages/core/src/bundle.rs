//! ResourceBundle: one provider's key snapshot plus its mounted folders.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::decoder::StreamDecoder;
use crate::{key, Error, ProviderHandle, ResourceStream, Result};

/// Searched when a bundle has no folders mounted.
static IMPLICIT_ROOT: [String; 1] = [String::new()];

/// A provider's resources as seen through a list of mount folders.
///
/// The key snapshot is taken once, sorted, when the bundle is created. Later
/// changes in the provider are not observed. Mount folders are searched in
/// the order they were mounted; the first folder that yields a key wins.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use std::sync::Arc;
/// use serfs_core::{IdentityDecoder, ProviderError, ResourceBundle, ResourceProvider, ResourceStream};
///
/// struct Assets;
///
/// impl ResourceProvider for Assets {
///     fn name(&self) -> &str { "assets" }
///     fn list_keys(&self) -> Vec<String> {
///         vec!["App.Templates.page.html".to_string()]
///     }
///     fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
///         Ok(Box::new(Cursor::new(key.as_bytes().to_vec())))
///     }
/// }
///
/// let mut bundle = ResourceBundle::new(Arc::new(Assets), "App", Arc::new(IdentityDecoder));
/// bundle.mount("Templates");
///
/// assert_eq!(bundle.find_key("PAGE.html"), Some("App.Templates.page.html"));
/// assert!(bundle.lookup("missing.html").unwrap().is_none());
/// ```
pub struct ResourceBundle {
    provider: ProviderHandle,
    prefix: String,
    keys: Vec<String>,
    folders: Vec<String>,
    decoder: Arc<dyn StreamDecoder>,
}

impl ResourceBundle {
    /// Capture `provider`'s keys under `prefix`.
    pub fn new(
        provider: ProviderHandle,
        prefix: impl Into<String>,
        decoder: Arc<dyn StreamDecoder>,
    ) -> Self {
        let prefix = prefix.into();
        let mut keys = provider.list_keys();
        keys.sort();
        debug!(
            provider = provider.name(),
            prefix = %prefix,
            keys = keys.len(),
            "captured resource bundle"
        );
        Self {
            provider,
            prefix,
            keys,
            folders: Vec::new(),
            decoder,
        }
    }

    pub fn provider(&self) -> &ProviderHandle {
        &self.provider
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The captured, sorted key snapshot.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Mounted folders in search order.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn decoder(&self) -> &Arc<dyn StreamDecoder> {
        &self.decoder
    }

    /// True if this bundle is the registration of this very `provider`
    /// handle under `prefix`. Distinct providers sharing a name are
    /// different registrations.
    pub fn is_identity(&self, provider: &ProviderHandle, prefix: &str) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.provider), Arc::as_ptr(provider))
            && self.prefix == prefix
    }

    /// Mount a folder. Duplicates (compared verbatim after normalization)
    /// are ignored.
    pub fn mount(&mut self, folder: &str) -> &mut Self {
        let folder = key::normalize_mount_folder(folder);
        if !self.folders.contains(&folder) {
            debug!(provider = self.provider.name(), folder = %folder, "mounted folder");
            self.folders.push(folder);
        }
        self
    }

    /// Replace the decoder used by subsequent lookups. Streams already
    /// handed out are unaffected.
    pub fn set_decoder(&mut self, decoder: Arc<dyn StreamDecoder>) {
        self.decoder = decoder;
    }

    /// Find the snapshot key `path` resolves to, without opening it.
    pub fn find_key(&self, path: &str) -> Option<&str> {
        self.search_folders().iter().find_map(|folder| {
            let wanted = key::to_key(&self.prefix, folder, path);
            let found = self
                .keys
                .iter()
                .find(|candidate| key::eq_ignore_case(candidate, &wanted));
            trace!(path, folder = %folder, key = %wanted, hit = found.is_some(), "resolve");
            found.map(String::as_str)
        })
    }

    /// True if `path` names a resource in this bundle.
    pub fn exists(&self, path: &str) -> bool {
        self.find_key(path).is_some()
    }

    /// Open `path` through the active decoder.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No mounted folder yields a key for `path`.
    /// * `Ok(Some(stream))` - The decoded stream.
    /// * `Err(Error::CorruptProvider)` - The key is in the snapshot but the
    ///   provider failed to open it.
    pub fn lookup(&self, path: &str) -> Result<Option<ResourceStream>> {
        let Some(found) = self.find_key(path) else {
            return Ok(None);
        };
        let raw = self.provider.open_raw(found).map_err(|source| {
            warn!(provider = self.provider.name(), key = found, error = %source, "listed key failed to open");
            Error::CorruptProvider {
                provider: self.provider.name().to_string(),
                key: found.to_string(),
                source,
            }
        })?;
        Ok(Some(self.decoder.decode(raw)))
    }

    /// True if any key lives under folder `path` in any mounted folder.
    pub fn folder_exists(&self, path: &str) -> bool {
        self.search_folders().iter().any(|folder| {
            let prefix = key::folder_prefix(&self.prefix, folder, path);
            self.keys
                .iter()
                .any(|candidate| key::strip_prefix_ignore_case(candidate, &prefix).is_some())
        })
    }

    /// Names under folder `base_name`, relative to it, for every mounted
    /// folder in turn.
    ///
    /// Names are flat key remainders (`sub.file.txt`), in snapshot order
    /// within a folder. A name present under two mounted folders is listed
    /// twice.
    pub fn list_names(&self, base_name: &str) -> Vec<String> {
        let mut names = Vec::new();
        for folder in self.search_folders() {
            let prefix = key::folder_prefix(&self.prefix, folder, base_name);
            names.extend(
                self.keys
                    .iter()
                    .filter_map(|candidate| key::strip_prefix_ignore_case(candidate, &prefix))
                    .map(str::to_string),
            );
        }
        names
    }

    /// Folders lookups actually search: the mounted folders, or the provider
    /// root (`""`) when nothing is mounted.
    pub fn search_folders(&self) -> &[String] {
        if self.folders.is_empty() {
            &IMPLICIT_ROOT
        } else {
            &self.folders
        }
    }
}

impl fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBundle")
            .field("provider", &self.provider.name())
            .field("prefix", &self.prefix)
            .field("keys", &self.keys.len())
            .field("folders", &self.folders)
            .finish()
    }
}
