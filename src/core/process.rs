//! Process supervision for installed node binaries
//!
//! Launches are detached: the child is spawned and immediately released, so
//! a GUI or daemon outlives the CLI invocation that started it. Status
//! queries run the companion control binary and capture its combined
//! output; a non-zero exit (node still starting, cookie not ready) is a
//! recoverable error, not a crash.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::artifact::{ReleaseCatalog, SoftwareId};
use crate::core::discovery;
use crate::core::paths::Paths;
use crate::core::platform::PlatformTag;
use crate::error::{MelaninError, Result};
use crate::utils::fs as fs_utils;

/// The one subcommand used to probe a running daemon.
const STATUS_SUBCOMMAND: &str = "getblockchaininfo";

/// Resolve the GUI executable for an installed software: discovery first,
/// then the conventional versioned layout.
pub fn resolve_gui_binary(
    paths: &Paths,
    software: SoftwareId,
    platform: PlatformTag,
    catalog: &ReleaseCatalog,
) -> PathBuf {
    let binary_name = format!("{}-qt{}", software.key(), platform.exe_suffix());
    resolve_binary(paths, software, platform, catalog, &binary_name)
}

fn resolve_binary(
    paths: &Paths,
    software: SoftwareId,
    platform: PlatformTag,
    catalog: &ReleaseCatalog,
    binary_name: &str,
) -> PathBuf {
    let install_dir = paths.install_dir(software);
    if let Some(bin_dir) = discovery::find_bin_dir(&install_dir, software) {
        return bin_dir.join(binary_name);
    }
    paths
        .versioned_bin_dir(software, catalog.version_of(software))
        .join(binary_name)
}

/// Start an executable as a detached child process.
///
/// The literal path is tried first; when absent, discovery re-resolves the
/// file inside the installation tree (release layouts move between
/// versions). The caller does not wait on, or own, the child.
pub fn launch(paths: &Paths, software: SoftwareId, executable: &Path, args: &[String]) -> Result<()> {
    let mut target = executable.to_path_buf();

    if !target.exists() {
        let fragment = executable
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let install_dir = paths.install_dir(software);
        match discovery::find_in_bin_dir(&install_dir, software, &fragment) {
            Some(found) => target = found,
            None => {
                return Err(MelaninError::BinaryNotFound {
                    name: executable.display().to_string(),
                })
            }
        }
    }

    fs_utils::make_executable(&target)?;

    Command::new(&target)
        .args(args)
        .spawn()
        .map_err(|e| MelaninError::process_error(format!("{}: {e}", target.display())))?;

    log::info!("Started {target:?}");
    Ok(())
}

/// Query a running daemon through its control binary.
///
/// Returns the status text on success. A non-zero exit yields
/// [`MelaninError::StatusError`] carrying the combined output so the caller
/// can show why the node is not responding.
pub fn node_status(
    paths: &Paths,
    software: SoftwareId,
    platform: PlatformTag,
    catalog: &ReleaseCatalog,
) -> Result<String> {
    let cli_name = format!("{}-cli{}", software.key(), platform.exe_suffix());
    let cli_path = resolve_binary(paths, software, platform, catalog, &cli_name);

    if !cli_path.exists() {
        return Err(MelaninError::BinaryNotFound { name: cli_name });
    }

    let output = Command::new(&cli_path)
        .arg(STATUS_SUBCOMMAND)
        .output()
        .map_err(|e| MelaninError::process_error(format!("{}: {e}", cli_path.display())))?;

    let combined = combine_output(&output.stdout, &output.stderr);
    if output.status.success() {
        Ok(combined)
    } else {
        Err(MelaninError::StatusError { output: combined })
    }
}

/// Run a command line in a freshly opened terminal window, so the process
/// stays visible and alive after this one exits.
pub fn launch_in_terminal(platform: PlatformTag, command: &str) -> Result<()> {
    crate::utils::terminal::open_terminal(platform, command)
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    let err = String::from_utf8_lossy(stderr);
    if !err.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(err.trim_end());
    }
    text.trim_end().to_string()
}
