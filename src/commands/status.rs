use crate::core::artifact::{ReleaseCatalog, SoftwareId};
use crate::core::paths::Paths;
use crate::core::platform;
use crate::core::process;
use crate::error::{MelaninError, Result};

/// Query a running node through its control binary and print the result.
pub fn node_status(software: SoftwareId) -> Result<()> {
    let paths = Paths::new()?;
    let catalog = ReleaseCatalog::default();
    let platform = platform::resolve_platform();

    match process::node_status(&paths, software, platform, &catalog) {
        Ok(text) => {
            println!("✅ {} Node Status:", software.display_name());
            println!("{text}");
            Ok(())
        }
        // The daemon not answering yet is an expected condition, not a
        // failure of this command.
        Err(MelaninError::StatusError { output }) => {
            eprintln!(
                "❌ Error checking {} status: {output}",
                software.display_name()
            );
            Ok(())
        }
        Err(other) => Err(other),
    }
}
