//! A provider that exposes a directory tree under flat storage keys.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::{fs, io};

use serfs_core::key;
use serfs_provider::{ProviderError, ResourceProvider, ResourceStream};

/// Serves the files below `root`, each under the key SERFS would compute for
/// its relative path: `docs/1.2/a b.txt` under namespace `Site` is stored as
/// `Site.docs._1._2.a b.txt`.
///
/// The tree is walked once at construction. Files added later are not seen;
/// files removed later fail to open with [`ProviderError::Io`].
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    name: String,
    namespace: String,
    root: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl DirectoryProvider {
    /// Serve `root` under a namespace named after the directory itself.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let root = root.into();
        let namespace = root
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Other {
                message: format!(
                    "cannot derive a namespace from directory path {}",
                    root.display()
                ),
            })?;
        Self::with_namespace(root, namespace)
    }

    /// Serve `root` with keys rooted at `namespace`. The provider is named
    /// after the namespace.
    pub fn with_namespace(
        root: impl Into<PathBuf>,
        namespace: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let root = root.into();
        let namespace = namespace.into();

        let attr = fs::metadata(&root)?;
        if !attr.is_dir() {
            return Err(ProviderError::Io(io::Error::other(format!(
                "provider root must be a directory: {}",
                root.display()
            ))));
        }
        let root = root.canonicalize()?;

        let files = scan(&root, &namespace)?;
        tracing::debug!(
            root = %root.display(),
            namespace = %namespace,
            files = files.len(),
            "Scanned directory provider"
        );

        Ok(DirectoryProvider {
            name: namespace.clone(),
            namespace,
            root,
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Filesystem path backing `key`, if the key was found by the scan.
    pub fn file_path(&self, key: &str) -> Option<&Path> {
        self.files.get(key).map(PathBuf::as_path)
    }
}

fn scan(root: &Path, namespace: &str) -> Result<BTreeMap<String, PathBuf>, ProviderError> {
    let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => ProviderError::Io(io),
            None => ProviderError::Other {
                message: format!("filesystem loop below {}", root.display()),
            },
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ProviderError::Other {
                message: format!(
                    "failed to strip provider root from {}: {}",
                    entry.path().display(),
                    e
                ),
            })?;
        let Some(logical) = logical_path(relative) else {
            tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 path");
            continue;
        };

        let storage_key = key::to_key(namespace, "", &logical);
        if let Some(existing) = files.get(&storage_key) {
            tracing::warn!(
                key = %storage_key,
                kept = %existing.display(),
                skipped = %entry.path().display(),
                "Two files map to the same key"
            );
            continue;
        }
        tracing::trace!(key = %storage_key, path = %entry.path().display(), "Found file");
        files.insert(storage_key, entry.into_path());
    }

    Ok(files)
}

fn logical_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => continue,
        }
    }
    Some(parts.join("/"))
}

impl ResourceProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_keys(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn open_raw(&self, key: &str) -> Result<ResourceStream, ProviderError> {
        let path = self
            .files
            .get(key)
            .ok_or_else(|| ProviderError::missing_key(key))?;
        tracing::debug!(key, path = %path.display(), "Opening file");
        let file = fs::File::open(path)?;
        Ok(Box::new(io::BufReader::new(file)))
    }

    fn default_prefix(&self) -> String {
        self.namespace.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn keys_follow_the_codec() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Templates/test.txt", "Hello");
        write(dir.path(), "1.2.3/test.txt", "digits");
        write(dir.path(), "A folder/with-dash/404.txt", "missing");
        write(dir.path(), "root.txt", "root");

        let provider = DirectoryProvider::with_namespace(dir.path(), "Site").unwrap();
        assert_eq!(
            provider.list_keys(),
            vec![
                "Site.A_folder.with_dash.404.txt",
                "Site.Templates.test.txt",
                "Site._1._2._3.test.txt",
                "Site.root.txt",
            ]
        );
        assert_eq!(provider.default_prefix(), "Site");
        assert_eq!(provider.name(), "Site");
    }

    #[test]
    fn open_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Templates/test.txt", "Hello Serfs");
        let provider = DirectoryProvider::with_namespace(dir.path(), "Site").unwrap();

        let mut text = String::new();
        provider
            .open_raw("Site.Templates.test.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "Hello Serfs");
        assert!(provider.file_path("Site.Templates.test.txt").is_some());
    }

    #[test]
    fn open_unlisted_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirectoryProvider::with_namespace(dir.path(), "Site").unwrap();
        assert!(matches!(
            provider.open_raw("Site.nothing.txt"),
            Err(ProviderError::MissingKey { .. })
        ));
    }

    #[test]
    fn removed_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gone.txt", "soon");
        let provider = DirectoryProvider::with_namespace(dir.path(), "Site").unwrap();
        fs::remove_file(dir.path().join("gone.txt")).unwrap();
        assert!(matches!(
            provider.open_raw("Site.gone.txt"),
            Err(ProviderError::Io(_))
        ));
    }

    #[test]
    fn namespace_defaults_to_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Assets");
        write(&root, "a.txt", "a");
        let provider = DirectoryProvider::new(&root).unwrap();
        assert_eq!(provider.namespace(), "Assets");
        assert_eq!(provider.list_keys(), vec!["Assets.a.txt"]);
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "file.txt", "x");
        assert!(matches!(
            DirectoryProvider::with_namespace(dir.path().join("file.txt"), "X"),
            Err(ProviderError::Io(_))
        ));
        assert!(matches!(
            DirectoryProvider::with_namespace(dir.path().join("absent"), "X"),
            Err(ProviderError::Io(_))
        ));
    }

    #[test]
    fn colliding_paths_keep_the_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a b/x.txt", "space");
        write(dir.path(), "a_b/x.txt", "underscore");
        let provider = DirectoryProvider::with_namespace(dir.path(), "Site").unwrap();
        assert_eq!(provider.list_keys(), vec!["Site.a_b.x.txt"]);

        let mut text = String::new();
        provider
            .open_raw("Site.a_b.x.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "space");
    }
}
