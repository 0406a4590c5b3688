//! Declarative overlay configuration.
//!
//! An overlay can be described as JSON and built against a root provider and
//! a loader:
//!
//! ```json
//! {
//!   "root_folder": "TestTemplates",
//!   "mounts": ["MoreTemplates", "ExtraTemplates"],
//!   "providers": [{"name": "ResourcesForSerfsTest", "folders": ["Files"]}],
//!   "decoder": "identity",
//!   "ignore_missing_providers": false
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decoder::DecoderKind;
use crate::overlay::ResourceOverlay;
use crate::{Error, ProviderHandle, ProviderLoader, Result};

/// Configuration for a whole overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Folder mounted in the home bundle at construction; `""` when absent,
    /// which searches the provider root.
    pub root_folder: String,
    /// Key prefix of the root provider; its default prefix when absent.
    pub prefix: Option<String>,
    /// Extra folders mounted in the home bundle, in order.
    pub mounts: Vec<String>,
    /// Providers loaded by name, in search order after the root.
    pub providers: Vec<ProviderConfig>,
    pub decoder: DecoderKind,
    pub ignore_missing_providers: bool,
}

/// A provider loaded by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub folders: Vec<String>,
}

impl OverlayConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Build the overlay this configuration describes.
    ///
    /// A listed provider that cannot be loaded is an error unless
    /// `ignore_missing_providers` is set.
    pub fn build(
        &self,
        root: ProviderHandle,
        loader: Option<Arc<dyn ProviderLoader>>,
    ) -> Result<ResourceOverlay> {
        let mut overlay = match &self.prefix {
            Some(prefix) => ResourceOverlay::with_prefix(root, prefix.clone(), &self.root_folder),
            None => ResourceOverlay::new(root, &self.root_folder),
        };
        if let Some(loader) = loader {
            overlay.set_loader(loader);
        }
        overlay.set_ignore_missing_providers(self.ignore_missing_providers);
        overlay.set_decoder(self.decoder.build());

        for folder in &self.mounts {
            overlay.mount(folder);
        }

        for provider in &self.providers {
            let bundle = overlay
                .add_provider_by_name(&provider.name, provider.prefix.as_deref())
                .ok_or_else(|| {
                    Error::config(format!("provider '{}' could not be loaded", provider.name))
                })?;
            for folder in &provider.folders {
                bundle.mount(folder);
            }
        }

        Ok(overlay)
    }
}
