//! Mining command construction and address validation
//!
//! Commands are built here and executed in an externally opened terminal
//! (see `utils::terminal`), so the miner keeps running and stays visible
//! after this process exits. Pool endpoints live in an injected table, not
//! scattered constants.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{MelaninError, Result};

static BTC_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$|^bc1[a-zA-HJ-NP-Z0-9]{38,58}$")
        .expect("address pattern is a fixed literal")
});

/// A named Bitcoin mining pool.
#[derive(Debug, Clone)]
pub struct Pool {
    pub name: &'static str,
    pub url: &'static str,
}

/// Immutable table of pool endpoints, injected into the command builder.
#[derive(Debug, Clone)]
pub struct PoolTable {
    bitcoin_pools: Vec<Pool>,
    whive_pool: &'static str,
}

impl Default for PoolTable {
    fn default() -> Self {
        PoolTable {
            bitcoin_pools: vec![
                Pool {
                    name: "CKPool",
                    url: "stratum+tcp://solo.ckpool.org:3333",
                },
                Pool {
                    name: "Public Pool",
                    url: "stratum+tcp://public-pool.io:21496",
                },
                Pool {
                    name: "Ocean Pool",
                    url: "stratum+tcp://stratum.ocean.xyz:3000",
                },
                Pool {
                    name: "Ocean Pool (Alt)",
                    url: "stratum+tcp://mine.ocean.xyz:3334",
                },
            ],
            whive_pool: "stratum+tcp://206.189.2.17:3333",
        }
    }
}

impl PoolTable {
    pub fn bitcoin_pools(&self) -> &[Pool] {
        &self.bitcoin_pools
    }

    pub fn bitcoin_pool_url(&self, name: &str) -> Option<&'static str> {
        self.bitcoin_pools
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.url)
    }

    pub fn whive_pool_url(&self) -> &'static str {
        self.whive_pool
    }
}

/// Check a Bitcoin address against the legacy (`1...`/`3...`) and bech32
/// (`bc1...`) shapes. Rejection happens before any side effect.
pub fn validate_btc_address(address: &str) -> Result<()> {
    if BTC_ADDRESS_RE.is_match(address) {
        Ok(())
    } else {
        log::warn!("Rejected malformed Bitcoin address");
        Err(MelaninError::InvalidAddress {
            address: address.to_string(),
        })
    }
}

/// Whive addresses are only checked for presence (the original behavior).
pub fn validate_whive_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        Err(MelaninError::MissingInput {
            name: "Whive address".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Worker names become the suffix of the pool username; reject empties.
pub fn validate_worker_name(worker: &str) -> Result<()> {
    if worker.trim().is_empty() {
        Err(MelaninError::MissingInput {
            name: "worker name".to_string(),
        })
    } else {
        Ok(())
    }
}

/// SHA-256d pool mining against a Bitcoin pool:
/// `minerd -a sha256d -o <pool> -u <address>.<worker> -p x`
pub fn bitcoin_miner_command(
    minerd: &Path,
    pool_url: &str,
    address: &str,
    worker: &str,
) -> String {
    format!(
        "{} -a sha256d -o {pool_url} -u {address}.{worker} -p x",
        minerd.display()
    )
}

/// Yespower CPU mining on the Whive pool with a fixed worker identity and
/// two threads:
/// `minerd -a yespower -o <pool> -u <address>.w1 -t 2`
pub fn whive_miner_command(minerd: &Path, pool_url: &str, address: &str) -> String {
    format!(
        "{} -a yespower -o {pool_url} -u {address}.w1 -t 2",
        minerd.display()
    )
}
