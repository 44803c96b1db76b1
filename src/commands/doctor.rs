use crate::core::artifact::{ReleaseCatalog, SoftwareId};
use crate::core::discovery;
use crate::core::installer::{self, InstallState};
use crate::core::paths::Paths;
use crate::core::platform;
use crate::core::storage::{self, InstallStrategy};
use crate::error::Result;

/// Report the environment: platform, disk space, install state, and what
/// discovery can find for each software.
pub fn check_environment() -> Result<()> {
    println!("🔍 Melanin Click - Environment Check");
    println!();

    let paths = Paths::new()?;
    let catalog = ReleaseCatalog::default();
    let platform = platform::resolve_platform();

    let mut issues_found = 0;

    println!("🖥️  Platform: {}", platform.describe());
    println!();

    println!("💾 Disk Space:");
    match storage::free_space(paths.home()) {
        Ok(bytes) => {
            println!("  free space: {:.2} GB", storage::to_gb(bytes));
            for software in [SoftwareId::Bitcoin, SoftwareId::Whive] {
                let strategy = storage::classify(bytes, software);
                let label = match strategy {
                    InstallStrategy::Full => "✅ full",
                    InstallStrategy::Pruned => "✅ pruned",
                    InstallStrategy::Insufficient => {
                        issues_found += 1;
                        "❌ insufficient"
                    }
                };
                println!("  {} install: {label}", software.display_name());
            }
        }
        Err(e) => {
            println!("  ❌ could not query free space: {e}");
            issues_found += 1;
        }
    }
    println!();

    for software in [SoftwareId::Bitcoin, SoftwareId::Whive] {
        println!("📦 {}:", software.display_name());
        println!("  version: {}", catalog.version_of(software));

        let install_dir = paths.install_dir(software);
        match installer::inspect(&paths, software) {
            InstallState::Installed => {
                println!("  installed at: {:?}", install_dir);
                match discovery::find_bin_dir(&install_dir, software) {
                    Some(bin_dir) => println!("    ✅ binaries: {:?}", bin_dir),
                    None => {
                        println!("    ❌ no binaries found in installation tree");
                        issues_found += 1;
                    }
                }
            }
            InstallState::NotInstalled => {
                println!("  ⚠️  not installed");
            }
        }

        if software == SoftwareId::Bitcoin {
            for pruned in [false, true] {
                let conf = paths.bitcoin_conf_path(pruned);
                let mode = if pruned { "pruned" } else { "mainnet" };
                if conf.exists() {
                    println!("    ✅ {mode} config: {:?}", conf);
                } else {
                    println!("    ⚠️  {mode} config not written yet");
                }
            }
        }
        println!();
    }

    let minerd = paths.minerd_path(platform);
    println!("⛏️  Miner:");
    if minerd.exists() {
        println!("  ✅ {:?}", minerd);
    } else {
        println!("  ⚠️  not present (ships with Whive Core)");
    }
    println!();

    if issues_found == 0 {
        println!("✅ Environment looks good");
    } else {
        println!("❌ {issues_found} issue(s) found");
    }
    Ok(())
}
