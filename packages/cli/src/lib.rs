//! Command-line access to a SERFS overlay built over directories on disk.
//!
//! Commands:
//! - `cat <path>` - Write a resource to stdout
//! - `ls [base]` - List names under a folder
//! - `exists <path>` - Exit 0 if the resource (or folder) exists, 1 otherwise
//! - `key <path>` - Show the storage key tried in every searched folder

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;

use serfs_core::{key, DecoderKind, OverlayConfig, ProviderConfig, ProviderHandle, ResourceOverlay};
use serfs_provider::ProviderError;
use serfs_providers::{DirectoryLoader, DirectoryProvider};

/// SERFS - browse resource folders as one filesystem
#[derive(Parser, Debug)]
#[command(name = "serfs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory served by the root provider
    #[arg(long)]
    pub dir: PathBuf,

    /// Key namespace of the root provider (defaults to the directory name)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Folder to mount in the root provider; the first one is the home folder
    #[arg(long = "folder", value_name = "FOLDER")]
    pub folders: Vec<String>,

    /// Additional provider, loaded by name from the search directories
    #[arg(long = "provider", value_name = "NAME")]
    pub providers: Vec<String>,

    /// Directory searched for providers loaded by name (defaults to the
    /// parent of --dir)
    #[arg(long = "search", value_name = "DIR")]
    pub search: Vec<PathBuf>,

    /// Overlay configuration file (JSON); replaces --folder and --provider
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Decompress every resource with gzip
    #[arg(long)]
    pub gzip: bool,

    /// Use the root provider in place of providers that cannot be loaded
    #[arg(long)]
    pub ignore_missing: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a resource to stdout
    Cat {
        path: String,
        /// Read as UTF-8 text with line endings normalized to \n
        #[arg(long)]
        normalize: bool,
    },
    /// List names under a folder
    Ls {
        #[arg(default_value = "/")]
        base: String,
    },
    /// Exit 0 if the resource exists, 1 otherwise
    Exists {
        path: String,
        /// Test for a folder instead of a resource
        #[arg(long)]
        folder_check: bool,
    },
    /// Show the storage key tried in every searched folder
    Key { path: String },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Core(#[from] serfs_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Cli {
    /// The log filter implied by `-v`.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Overlay configuration from `--config`, or assembled from flags.
    pub fn overlay_config(&self) -> Result<OverlayConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => OverlayConfig::from_file(path)?,
            None => {
                let mut folders = self.folders.iter().cloned();
                OverlayConfig {
                    root_folder: folders.next().unwrap_or_default(),
                    mounts: folders.collect(),
                    providers: self
                        .providers
                        .iter()
                        .map(|name| ProviderConfig {
                            name: name.clone(),
                            prefix: None,
                            folders: Vec::new(),
                        })
                        .collect(),
                    ..Default::default()
                }
            }
        };
        if self.gzip {
            config.decoder = DecoderKind::Gzip;
        }
        if self.ignore_missing {
            config.ignore_missing_providers = true;
        }
        Ok(config)
    }

    pub fn build_overlay(&self) -> Result<ResourceOverlay, CliError> {
        let root: ProviderHandle = Arc::new(match &self.namespace {
            Some(namespace) => DirectoryProvider::with_namespace(&self.dir, namespace.clone())?,
            None => DirectoryProvider::new(&self.dir)?,
        });

        let search = if self.search.is_empty() {
            self.dir.parent().map(|p| vec![p.to_path_buf()]).unwrap_or_default()
        } else {
            self.search.clone()
        };

        let config = self.overlay_config()?;
        tracing::debug!(?config, ?search, "Building overlay");
        Ok(config.build(root, Some(Arc::new(DirectoryLoader::new(search))))?)
    }
}

/// Run `command` against `overlay`, writing results to `out`.
pub fn execute(
    overlay: &ResourceOverlay,
    command: &Command,
    out: &mut impl Write,
) -> Result<ExitCode, CliError> {
    match command {
        Command::Cat { path, normalize } => {
            let found = if *normalize {
                overlay
                    .read_normalized(path)?
                    .map(|text| out.write_all(text.as_bytes()))
            } else {
                overlay.read_bytes(path)?.map(|bytes| out.write_all(&bytes))
            };
            match found {
                Some(written) => {
                    written?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("serfs: {}: not found", path);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Ls { base } => {
            for name in overlay.list_names(base) {
                writeln!(out, "{}", name)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Exists { path, folder_check } => {
            let found = if *folder_check {
                overlay.folder_exists(path)
            } else {
                overlay.exists(path)
            };
            Ok(if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Key { path } => {
            for bundle in overlay.bundles() {
                for folder in bundle.search_folders() {
                    let wanted = key::to_key(bundle.prefix(), folder, path);
                    let hit = bundle
                        .keys()
                        .iter()
                        .any(|candidate| key::eq_ignore_case(candidate, &wanted));
                    writeln!(
                        out,
                        "{}\t{}\t{}",
                        if hit { "*" } else { "-" },
                        bundle.provider().name(),
                        wanted
                    )?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
