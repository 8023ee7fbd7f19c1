//! RON-driven overlay configuration.
//!
//! Describes a set of host directories to mount and builds an [`OverlayFs`]
//! from it:
//!
//! ```ron
//! (
//!     mounts: [
//!         (prefix: "/mnt/project", root: "/home/amy/src/kaijutsu"),
//!         (prefix: "/mnt/reference", root: "../reference"),
//!         (prefix: "/scratch", root: "/tmp/scratch", enabled: false),
//!     ],
//! )
//! ```
//!
//! Relative roots are resolved against the directory holding the config
//! file when loaded with [`load_config`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::vfs::{Backend, LocalBackend, OverlayFs, VfsError};

/// A single host directory to mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Overlay prefix, e.g. `/mnt/project`.
    pub prefix: String,
    /// Host directory served under the prefix.
    pub root: PathBuf,
    /// Disabled mounts are skipped. Default: true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Parsed overlay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("cannot serve {}: {source}", root.display())]
    Root {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mount failed: {0}")]
    Mount(#[from] VfsError),
}

/// Parse a RON document into an `OverlayConfig`.
pub fn parse_config(text: &str) -> Result<OverlayConfig, ConfigError> {
    Ok(ron::from_str(text)?)
}

/// Read and parse a config file, resolving relative roots against its
/// directory.
pub fn load_config(path: impl AsRef<Path>) -> Result<OverlayConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mut config = parse_config(&text)?;

    if let Some(base) = path.parent() {
        for mount in &mut config.mounts {
            if mount.root.is_relative() {
                mount.root = base.join(&mount.root);
            }
        }
    }
    debug!(path = %path.display(), mounts = config.mounts.len(), "loaded overlay config");
    Ok(config)
}

impl OverlayConfig {
    /// Enabled mounts, in file order.
    pub fn enabled(&self) -> impl Iterator<Item = &MountConfig> {
        self.mounts.iter().filter(|m| m.enabled)
    }

    /// Build an overlay with a [`LocalBackend`] for every enabled mount.
    ///
    /// Stops at the first root that cannot be opened or prefix that cannot
    /// be mounted.
    pub fn build(&self) -> Result<OverlayFs, ConfigError> {
        let fs = OverlayFs::new();
        for mount in &self.mounts {
            if !mount.enabled {
                debug!(prefix = %mount.prefix, "skipping disabled mount");
                continue;
            }
            let backend = LocalBackend::new(&mount.root).map_err(|source| ConfigError::Root {
                root: mount.root.clone(),
                source,
            })?;
            fs.mount(&mount.prefix, Backend::statable(backend))?;
        }
        info!(mounts = fs.mounts().len(), "overlay built from config");
        Ok(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            r#"(
                mounts: [
                    (prefix: "/quux", root: "/srv/quux"),
                    (prefix: "/corge", root: "corge", enabled: false),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(config.mounts.len(), 2);
        assert_eq!(config.mounts[0].prefix, "/quux");
        assert_eq!(config.mounts[0].root, PathBuf::from("/srv/quux"));
        assert!(config.mounts[0].enabled);
        assert!(!config.mounts[1].enabled);
        assert_eq!(config.enabled().count(), 1);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_config("()").unwrap(), OverlayConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("(mounts: [(prefix: 42)])").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn test_load_and_build() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/hello.txt"), "hi").unwrap();
        let config_path = dir.path().join("overlay.ron");
        std::fs::write(
            &config_path,
            r#"(mounts: [
                (prefix: "/data", root: "data"),
                (prefix: "/off", root: "missing", enabled: false),
            ])"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.mounts[0].root, dir.path().join("data"));

        let fs = config.build().unwrap();
        assert_eq!(fs.read_file("/data/hello.txt").unwrap(), b"hi");
        assert!(!fs.is_mounted("/off"));
    }

    #[test]
    fn test_build_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = OverlayConfig {
            mounts: vec![MountConfig {
                prefix: "/gone".to_string(),
                root: dir.path().join("gone"),
                enabled: true,
            }],
        };
        assert!(matches!(config.build(), Err(ConfigError::Root { .. })));
    }

    #[test]
    fn test_build_duplicate_prefix() {
        let dir = TempDir::new().unwrap();
        let mount = MountConfig {
            prefix: "/same".to_string(),
            root: dir.path().to_path_buf(),
            enabled: true,
        };
        let config = OverlayConfig {
            mounts: vec![mount.clone(), MountConfig { prefix: "/same/".to_string(), ..mount }],
        };
        assert!(matches!(
            config.build(),
            Err(ConfigError::Mount(VfsError::AlreadyMounted(_)))
        ));
    }
}
