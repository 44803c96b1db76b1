//! Path resolution
//!
//! Every on-disk location the crate reads or writes is derived here, so all
//! callers agree on the layout. The home directory is injectable for tests.

use crate::core::artifact::SoftwareId;
use crate::core::platform::PlatformTag;
use crate::error::{MelaninError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    home: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(MelaninError::HomeDirectoryNotFound)?;
        Ok(Paths { home })
    }

    /// Root all paths under an arbitrary directory (tests).
    pub fn with_home(home: PathBuf) -> Self {
        Paths { home }
    }

    pub fn home(&self) -> &PathBuf {
        &self.home
    }

    /// Installation tree for a software: `~/bitcoin-core`, `~/whive-core`.
    pub fn install_dir(&self, software: SoftwareId) -> PathBuf {
        self.home.join(software.install_dir_name())
    }

    /// Data directory for a Bitcoin network mode: `~/.bitcoin/mainnet` or
    /// `~/.bitcoin/pruned`.
    pub fn bitcoin_data_dir(&self, pruned: bool) -> PathBuf {
        let mode = if pruned { "pruned" } else { "mainnet" };
        self.home.join(".bitcoin").join(mode)
    }

    pub fn bitcoin_conf_path(&self, pruned: bool) -> PathBuf {
        self.bitcoin_data_dir(pruned).join("bitcoin.conf")
    }

    /// Versioned fallback bin directory used when discovery finds nothing:
    /// `~/{id}-core/{id}-{version}/bin`.
    pub fn versioned_bin_dir(&self, software: SoftwareId, version: &str) -> PathBuf {
        self.install_dir(software)
            .join(format!("{}-{version}", software.key()))
            .join("bin")
    }

    /// The bundled CPU miner inside the Whive install tree.
    pub fn minerd_path(&self, platform: PlatformTag) -> PathBuf {
        self.install_dir(SoftwareId::Whive)
            .join("whive")
            .join("miner")
            .join(format!("minerd{}", platform.exe_suffix()))
    }

    /// Application preference file.
    pub fn prefs_path(&self) -> PathBuf {
        self.home.join(".melanin-click").join("prefs.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout() {
        let paths = Paths::with_home(PathBuf::from("/home/t"));
        assert_eq!(
            paths.install_dir(SoftwareId::Bitcoin),
            PathBuf::from("/home/t/bitcoin-core")
        );
        assert_eq!(
            paths.bitcoin_conf_path(false),
            PathBuf::from("/home/t/.bitcoin/mainnet/bitcoin.conf")
        );
        assert_eq!(
            paths.bitcoin_conf_path(true),
            PathBuf::from("/home/t/.bitcoin/pruned/bitcoin.conf")
        );
        assert_eq!(
            paths.versioned_bin_dir(SoftwareId::Whive, "22.2.3"),
            PathBuf::from("/home/t/whive-core/whive-22.2.3/bin")
        );
    }

    #[test]
    fn test_minerd_path_platform_suffix() {
        let paths = Paths::with_home(PathBuf::from("/home/t"));
        let unix = paths.minerd_path(crate::core::platform::PlatformTag::LinuxX86_64);
        assert!(unix.ends_with("whive-core/whive/miner/minerd"));
        let win = paths.minerd_path(crate::core::platform::PlatformTag::WindowsX86_64);
        assert!(win.to_string_lossy().ends_with("minerd.exe"));
    }
}
