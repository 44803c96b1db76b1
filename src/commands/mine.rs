use crate::core::artifact::SoftwareId;
use crate::core::mining::{self, PoolTable};
use crate::core::paths::Paths;
use crate::core::platform;
use crate::core::prefs::Prefs;
use crate::core::process;
use crate::error::{MelaninError, Result};

pub struct MineOptions {
    pub address: Option<String>,
    pub worker: Option<String>,
    pub pool: Option<String>,
    pub assume_yes: bool,
}

/// Start pool mining in a freshly opened terminal window.
pub fn mine(software: SoftwareId, options: MineOptions) -> Result<()> {
    let paths = Paths::new()?;
    let platform = platform::resolve_platform();
    let pools = PoolTable::default();
    let mut prefs = Prefs::load(&paths.prefs_path())?;

    if !options.assume_yes {
        let proceed = dialoguer::Confirm::new()
            .with_prompt("Mining may cause hardware wear. Proceed?")
            .default(false)
            .interact()
            .map_err(|e| MelaninError::Prompt {
                message: e.to_string(),
            })?;
        if !proceed {
            println!("Mining cancelled.");
            return Ok(());
        }
    }

    // The CPU miner ships inside the Whive install tree for both coins.
    let minerd = paths.minerd_path(platform);
    if !minerd.exists() {
        eprintln!("❌ Miner not found. Please install Whive Core first.");
        return Err(MelaninError::BinaryNotFound {
            name: minerd.display().to_string(),
        });
    }

    match software {
        SoftwareId::Bitcoin => {
            let address = required_input(options.address, "Enter Bitcoin address")?;
            mining::validate_btc_address(&address)?;
            let worker = required_input(options.worker, "Enter machine name (worker ID)")?;
            mining::validate_worker_name(&worker)?;

            let pool_name = options.pool.unwrap_or_else(|| prefs.bitcoin_pool.clone());
            let pool_url =
                pools
                    .bitcoin_pool_url(&pool_name)
                    .ok_or_else(|| MelaninError::UnknownPool {
                        name: pool_name.clone(),
                    })?;

            let command = mining::bitcoin_miner_command(&minerd, pool_url, &address, &worker);
            process::launch_in_terminal(platform, &command)?;
            println!("✅ Started Bitcoin mining on {pool_name}...");

            if prefs.bitcoin_pool != pool_name {
                prefs.bitcoin_pool = pool_name;
                prefs.save(&paths.prefs_path())?;
            }
        }
        SoftwareId::Whive => {
            let address = required_input(options.address, "Enter Whive address")?;
            mining::validate_whive_address(&address)?;

            let command = mining::whive_miner_command(&minerd, pools.whive_pool_url(), &address);
            process::launch_in_terminal(platform, &command)?;
            println!("✅ Started Whive mining...");
        }
    }
    Ok(())
}

fn required_input(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| MelaninError::Prompt {
                message: e.to_string(),
            }),
    }
}
