//! ResourceOverlay: an ordered stack of resource bundles searched as one
//! filesystem.
//!
//! Bundles are searched in registration order and the first hit wins. The
//! first bundle (the "home" bundle, over the root provider) receives
//! unqualified mounts.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::bundle::ResourceBundle;
use crate::decoder::{IdentityDecoder, StreamDecoder};
use crate::{Error, ProviderError, ProviderHandle, ProviderLoader, ResourceStream, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read-only virtual filesystem over one or more resource providers.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use std::sync::Arc;
/// use serfs_core::{ProviderError, ResourceOverlay, ResourceProvider, ResourceStream};
///
/// struct Assets;
///
/// impl ResourceProvider for Assets {
///     fn name(&self) -> &str { "assets" }
///     fn list_keys(&self) -> Vec<String> {
///         vec![
///             "App.Templates.test.txt".to_string(),
///             "App.Extra.extra.txt".to_string(),
///         ]
///     }
///     fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
///         Ok(Box::new(Cursor::new(format!("{}\r\n", key).into_bytes())))
///     }
/// }
///
/// let mut overlay = ResourceOverlay::new(Arc::new(Assets), "Templates");
/// assert_eq!(overlay.read("test.txt").unwrap().as_deref(), Some("App.Templates.test.txt\r\n"));
/// assert!(!overlay.exists("extra.txt"));
///
/// overlay.mount("Extra");
/// assert_eq!(overlay.read_normalized("EXTRA.txt").unwrap().as_deref(), Some("App.Extra.extra.txt\n"));
/// ```
pub struct ResourceOverlay {
    bundles: Vec<ResourceBundle>,
    decoder: Arc<dyn StreamDecoder>,
    loader: Option<Arc<dyn ProviderLoader>>,
    ignore_missing_providers: bool,
}

impl ResourceOverlay {
    /// Create an overlay over `root` using its default prefix, with `folder`
    /// mounted in the home bundle.
    pub fn new(root: ProviderHandle, folder: &str) -> Self {
        let prefix = root.default_prefix();
        Self::with_prefix(root, prefix, folder)
    }

    /// Create an overlay over `root` with an explicit key prefix.
    pub fn with_prefix(root: ProviderHandle, prefix: impl Into<String>, folder: &str) -> Self {
        let decoder: Arc<dyn StreamDecoder> = Arc::new(IdentityDecoder);
        let mut home = ResourceBundle::new(root, prefix, decoder.clone());
        home.mount(folder);
        Self {
            bundles: vec![home],
            decoder,
            loader: None,
            ignore_missing_providers: false,
        }
    }

    /// Attach the capability used by [`add_provider_by_name`](Self::add_provider_by_name).
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn ProviderLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn set_loader(&mut self, loader: Arc<dyn ProviderLoader>) {
        self.loader = Some(loader);
    }

    /// When set, a provider that fails to load by name is replaced by the
    /// root provider instead of being reported missing.
    pub fn ignore_missing_providers(&self) -> bool {
        self.ignore_missing_providers
    }

    pub fn set_ignore_missing_providers(&mut self, ignore: bool) {
        self.ignore_missing_providers = ignore;
    }

    /// All bundles in search order. Never empty.
    pub fn bundles(&self) -> &[ResourceBundle] {
        &self.bundles
    }

    /// The bundle over the root provider.
    pub fn home(&self) -> &ResourceBundle {
        &self.bundles[0]
    }

    /// The decoder new bundles start with.
    pub fn decoder(&self) -> &Arc<dyn StreamDecoder> {
        &self.decoder
    }

    /// Mount a folder in the home bundle.
    pub fn mount(&mut self, folder: &str) -> &mut ResourceBundle {
        self.bundles[0].mount(folder)
    }

    /// Register `provider` under `prefix`.
    ///
    /// Returns the existing bundle if this (provider handle, prefix) pair is
    /// already registered; otherwise captures a new bundle at the end of the search
    /// order with the current default decoder.
    pub fn add_provider(
        &mut self,
        provider: ProviderHandle,
        prefix: impl Into<String>,
    ) -> &mut ResourceBundle {
        let prefix = prefix.into();
        if let Some(index) = self.position(&provider, &prefix) {
            return &mut self.bundles[index];
        }
        self.bundles
            .push(ResourceBundle::new(provider, prefix, self.decoder.clone()));
        let last = self.bundles.len() - 1;
        &mut self.bundles[last]
    }

    /// Load a provider by name and register it.
    ///
    /// `prefix` defaults to `name`. If loading fails (or no loader is
    /// attached) this returns `None`, unless
    /// [`ignore_missing_providers`](Self::ignore_missing_providers) is set, in
    /// which case the root provider stands in: with no explicit prefix that is
    /// the home bundle itself.
    pub fn add_provider_by_name(
        &mut self,
        name: &str,
        prefix: Option<&str>,
    ) -> Option<&mut ResourceBundle> {
        let loaded = match &self.loader {
            Some(loader) => loader.load(name),
            None => Err(ProviderError::not_found(name)),
        };

        match loaded {
            Ok(provider) => Some(self.add_provider(provider, prefix.unwrap_or(name))),
            Err(error) if self.ignore_missing_providers => {
                debug!(name, error = %error, "provider not loaded, substituting root provider");
                let root = self.home().provider().clone();
                let prefix = match prefix {
                    Some(prefix) => prefix.to_string(),
                    None => self.home().prefix().to_string(),
                };
                Some(self.add_provider(root, prefix))
            }
            Err(error) => {
                debug!(name, error = %error, "provider not loaded");
                None
            }
        }
    }

    /// Use `decoder` for every current bundle and every bundle added later.
    ///
    /// Streams already opened keep the decoder they were opened with.
    pub fn set_decoder(&mut self, decoder: Arc<dyn StreamDecoder>) {
        for bundle in &mut self.bundles {
            bundle.set_decoder(decoder.clone());
        }
        self.decoder = decoder;
    }

    /// Open `path` from the first bundle that has it.
    pub fn lookup(&self, path: &str) -> Result<Option<ResourceStream>> {
        for bundle in &self.bundles {
            if let Some(stream) = bundle.lookup(path)? {
                return Ok(Some(stream));
            }
        }
        trace!(path, "not found in any bundle");
        Ok(None)
    }

    /// Alias for [`lookup`](Self::lookup).
    pub fn open_read(&self, path: &str) -> Result<Option<ResourceStream>> {
        self.lookup(path)
    }

    /// The storage key `path` resolves to, without opening it.
    pub fn find_key(&self, path: &str) -> Option<&str> {
        self.bundles.iter().find_map(|bundle| bundle.find_key(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.bundles.iter().any(|bundle| bundle.exists(path))
    }

    pub fn folder_exists(&self, path: &str) -> bool {
        self.bundles.iter().any(|bundle| bundle.folder_exists(path))
    }

    /// Names under `base_name` from every bundle, in search order.
    ///
    /// Not de-duplicated: a name present in two bundles appears twice.
    pub fn list_names(&self, base_name: &str) -> Vec<String> {
        self.bundles
            .iter()
            .flat_map(|bundle| bundle.list_names(base_name))
            .collect()
    }

    /// Read the whole (decoded) resource.
    pub fn read_bytes(&self, path: &str) -> Result<Option<Bytes>> {
        let Some(mut stream) = self.lookup(path)? else {
            return Ok(None);
        };
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(Some(Bytes::from(buf)))
    }

    /// Read the resource as UTF-8 text, line endings untouched.
    pub fn read(&self, path: &str) -> Result<Option<String>> {
        let Some(bytes) = self.read_bytes(path)? else {
            return Ok(None);
        };
        decode_text(path, &bytes).map(Some)
    }

    /// Read the resource as UTF-8 text with `\r\n` and lone `\r` turned into
    /// `\n`.
    pub fn read_normalized(&self, path: &str) -> Result<Option<String>> {
        Ok(self.read(path)?.map(|text| normalize_newlines(&text)))
    }

    fn position(&self, provider: &ProviderHandle, prefix: &str) -> Option<usize> {
        self.bundles
            .iter()
            .position(|bundle| bundle.is_identity(provider, prefix))
    }
}

fn decode_text(path: &str, bytes: &[u8]) -> Result<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(body.to_vec()).map_err(|source| Error::InvalidText {
        path: path.to_string(),
        source,
    })
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

impl fmt::Debug for ResourceOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceOverlay")
            .field("bundles", &self.bundles)
            .field("has_loader", &self.loader.is_some())
            .field("ignore_missing_providers", &self.ignore_missing_providers)
            .finish()
    }
}
