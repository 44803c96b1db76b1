//! Free disk space checks and install strategy selection

use crate::core::artifact::SoftwareId;
use crate::error::Result;
use std::path::Path;

const GB: u64 = 1_000_000_000;

/// Free space above this supports a full Bitcoin node (initial block
/// download plus headroom).
pub const FULL_NODE_GB: u64 = 600;

/// Minimum free space for any install.
pub const MIN_INSTALL_GB: u64 = 10;

/// How an install should proceed given the measured free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategy {
    /// Enough space for an unpruned chain.
    Full,
    /// Enough for the binaries plus a pruned chain (Bitcoin only).
    Pruned,
    /// Not enough to install at all.
    Insufficient,
}

/// Free bytes on the filesystem containing `path`.
pub fn free_space(path: &Path) -> Result<u64> {
    Ok(fs4::available_space(path)?)
}

/// Classify free bytes into an install strategy.
///
/// Whive has no pruning concept: anything above the floor is a standard
/// (full) install.
pub fn classify(free_bytes: u64, software: SoftwareId) -> InstallStrategy {
    let free_gb = free_bytes / GB;
    match software {
        SoftwareId::Bitcoin => {
            if free_gb > FULL_NODE_GB {
                InstallStrategy::Full
            } else if free_gb > MIN_INSTALL_GB {
                InstallStrategy::Pruned
            } else {
                InstallStrategy::Insufficient
            }
        }
        SoftwareId::Whive => {
            if free_gb > MIN_INSTALL_GB {
                InstallStrategy::Full
            } else {
                InstallStrategy::Insufficient
            }
        }
    }
}

/// Measure and classify in one step. A failed space query is treated as
/// Insufficient: never proceed on an unknown amount.
pub fn check(path: &Path, software: SoftwareId) -> InstallStrategy {
    match free_space(path) {
        Ok(bytes) => classify(bytes, software),
        Err(e) => {
            log::warn!("Could not query free space on {path:?}: {e}");
            InstallStrategy::Insufficient
        }
    }
}

pub fn to_gb(bytes: u64) -> f64 {
    bytes as f64 / GB as f64
}
