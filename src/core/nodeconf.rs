//! Bitcoin node configuration generation

use crate::core::platform::{Arch, Os, PlatformTag};
use crate::error::Result;
use std::path::Path;

/// Write a `bitcoin.conf` tuned for the platform.
///
/// Always overwrites the target; callers that want create-once semantics
/// check for existence first. Lines are emitted in a fixed order: daemon
/// mode, transaction index, optional prune cap, per-OS dbcache, per-arch
/// parallelism.
pub fn write_node_config(path: &Path, pruned: bool, platform: PlatformTag) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render(pruned, platform))?;
    log::info!("Wrote node config at {path:?} (pruned={pruned})");
    Ok(())
}

fn render(pruned: bool, platform: PlatformTag) -> String {
    let mut lines = vec!["daemon=1".to_string(), "txindex=1".to_string()];

    if pruned {
        lines.push("prune=550".to_string());
    }

    // Unknown platforms follow the macOS default, the same fallback the
    // artifact table uses.
    let dbcache = match platform.os() {
        Os::Linux => 450,
        Os::MacOs | Os::Unknown => 800,
        Os::Windows => 1024,
    };
    lines.push(format!("dbcache={dbcache}"));

    // ARM cores tend to throttle under wide script-verification fan-out.
    let par = match platform.arch() {
        Arch::Arm64 => 4,
        Arch::X86_64 | Arch::Unknown => 8,
    };
    lines.push(format!("par={par}"));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pruned_config_contains_prune_line() {
        let content = render(true, PlatformTag::MacOsArm64);
        assert!(content.contains("prune=550"));
    }

    #[test]
    fn test_full_config_has_no_prune_line() {
        let content = render(false, PlatformTag::LinuxX86_64);
        assert!(!content.contains("prune="));
    }

    #[test]
    fn test_linux_x86_64_full_node_tuning() {
        // Scenario: Linux/x86_64 with room for a full node.
        let content = render(false, PlatformTag::LinuxX86_64);
        assert_eq!(content, "daemon=1\ntxindex=1\ndbcache=450\npar=8");
    }

    #[test]
    fn test_macos_arm64_pruned_tuning() {
        // Scenario: macOS/arm64 forced into pruned mode.
        let content = render(true, PlatformTag::MacOsArm64);
        assert_eq!(
            content,
            "daemon=1\ntxindex=1\nprune=550\ndbcache=800\npar=4"
        );
    }

    #[test]
    fn test_windows_tuning() {
        let content = render(false, PlatformTag::WindowsX86_64);
        assert!(content.contains("dbcache=1024"));
        assert!(content.contains("par=8"));
    }

    #[test]
    fn test_write_creates_parent_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let conf = tmp.path().join("mainnet").join("bitcoin.conf");

        write_node_config(&conf, false, PlatformTag::LinuxX86_64).unwrap();
        assert!(std::fs::read_to_string(&conf).unwrap().contains("dbcache=450"));

        // A second call overwrites in place.
        write_node_config(&conf, true, PlatformTag::LinuxX86_64).unwrap();
        assert!(std::fs::read_to_string(&conf).unwrap().contains("prune=550"));
    }
}
