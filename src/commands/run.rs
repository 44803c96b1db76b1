use crate::core::artifact::{ReleaseCatalog, SoftwareId};
use crate::core::nodeconf;
use crate::core::paths::Paths;
use crate::core::platform;
use crate::core::process;
use crate::error::Result;

/// Launch an installed node's GUI as a detached process.
pub fn run_node(software: SoftwareId, pruned: bool) -> Result<()> {
    let paths = Paths::new()?;
    let catalog = ReleaseCatalog::default();
    let platform = platform::resolve_platform();

    let mut args = Vec::new();
    if software == SoftwareId::Bitcoin {
        let conf_path = paths.bitcoin_conf_path(pruned);
        if !conf_path.exists() {
            nodeconf::write_node_config(&conf_path, pruned, platform)?;
            println!("Created bitcoin.conf at {}", conf_path.display());
        }
        if pruned {
            args.push(format!(
                "--datadir={}",
                paths.bitcoin_data_dir(true).display()
            ));
        }
        args.push(format!("-conf={}", conf_path.display()));
    } else if pruned {
        log::warn!("Whive has no pruned mode; ignoring --pruned");
    }

    let executable = process::resolve_gui_binary(&paths, software, platform, &catalog);
    process::launch(&paths, software, &executable, &args)?;

    let name = executable
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(software.key())
        .to_string();
    println!("✅ Started {name}");
    Ok(())
}
