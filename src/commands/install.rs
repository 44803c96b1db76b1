use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::core::artifact::{ReleaseCatalog, SoftwareId};
use crate::core::download::{ProgressMessage, Severity};
use crate::core::installer::{InstallLaunch, InstallOutcome, Orchestrator};
use crate::core::paths::Paths;
use crate::core::platform;
use crate::error::{MelaninError, Result};

/// How often the queued progress messages become visible output.
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

pub fn install(software: SoftwareId, assume_yes: bool) -> Result<()> {
    let paths = Paths::new()?;
    let catalog = ReleaseCatalog::default();
    let platform = platform::resolve_platform();
    let version = catalog.version_of(software).to_string();

    println!(
        "Installing {} {} on {}",
        software.display_name(),
        version,
        platform.describe()
    );
    println!("Checking storage for {}...", software.display_name());

    let orchestrator = Orchestrator::new(paths, catalog, platform);
    let launch = orchestrator.begin_install(software, || {
        if assume_yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(format!(
                "{} {} is installed. Update it?",
                software.display_name(),
                version
            ))
            .default(false)
            .interact()
            .unwrap_or(false)
    })?;

    let handle = match launch {
        InstallLaunch::AlreadyInstalled => {
            println!("✅ Skipping {} update.", software.display_name());
            return Ok(());
        }
        InstallLaunch::Started(handle) => handle,
    };

    // Cooperative polling on a fixed cadence; the channel closes when the
    // worker is done.
    loop {
        match handle.messages.recv_timeout(DRAIN_INTERVAL) {
            Ok(message) => render(&message),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    match handle.wait() {
        InstallOutcome::Completed => Ok(()),
        InstallOutcome::Cancelled => Err(MelaninError::Cancelled),
        InstallOutcome::Failed => Err(MelaninError::InstallFailed {
            software: software.display_name().to_string(),
        }),
    }
}

fn render(message: &ProgressMessage) {
    match message.severity {
        Severity::Info => println!("{}", message.text),
        Severity::Success => println!("✅ {}", message.text),
        Severity::Error => eprintln!("❌ {}", message.text),
    }
}
