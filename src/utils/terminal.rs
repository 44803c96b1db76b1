//! Opening a command in a new terminal window
//!
//! Miners run in a visible terminal the user can watch and close. Each
//! platform has its own way of opening one; on Linux the first available
//! emulator from a fixed candidate list is used.

use std::process::Command;

use crate::core::platform::{Os, PlatformTag};
use crate::error::{MelaninError, Result};

/// Linux terminal emulators, tried in order.
const LINUX_TERMINALS: &[&str] = &["gnome-terminal", "xterm", "konsole", "xfce4-terminal"];

/// Open a new terminal window running `command`. The terminal process is
/// detached; this returns as soon as the spawn succeeds.
pub fn open_terminal(platform: PlatformTag, command: &str) -> Result<()> {
    match platform.os() {
        Os::MacOs => open_macos(command),
        Os::Linux => open_linux(command),
        Os::Windows => open_windows(command),
        Os::Unknown => Err(MelaninError::TerminalNotFound),
    }
}

fn open_macos(command: &str) -> Result<()> {
    let script = format!("tell application \"Terminal\" to do script \"{command}\"");
    Command::new("osascript")
        .arg("-e")
        .arg(script)
        .spawn()
        .map_err(|e| MelaninError::process_error(format!("osascript: {e}")))?;
    Ok(())
}

fn open_linux(command: &str) -> Result<()> {
    let emulator = LINUX_TERMINALS
        .iter()
        .find(|name| which::which(name).is_ok())
        .ok_or(MelaninError::TerminalNotFound)?;

    let mut cmd = Command::new(emulator);
    if *emulator == "gnome-terminal" {
        // gnome-terminal takes the command after `--` and exits the wrapper
        // shell when the miner stops unless we keep bash alive.
        cmd.args(["--", "bash", "-c", &format!("{command}; exec bash")]);
    } else {
        cmd.args(["-e", command]);
    }

    cmd.spawn()
        .map_err(|e| MelaninError::process_error(format!("{emulator}: {e}")))?;
    Ok(())
}

fn open_windows(command: &str) -> Result<()> {
    Command::new("cmd.exe")
        .args(["/c", "start", "cmd", "/k", command])
        .spawn()
        .map_err(|e| MelaninError::process_error(format!("cmd.exe: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_platform_has_no_terminal() {
        let err = open_terminal(PlatformTag::Unknown, "echo hi").unwrap_err();
        assert!(matches!(err, MelaninError::TerminalNotFound));
    }
}
