use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

// Use the library modules
use melanin_click::commands;
use melanin_click::core::artifact::SoftwareId;

#[derive(Parser)]
#[clap(name = "melanin")]
#[clap(about = "Bitcoin & Whive node installer and manager")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Software {
    Bitcoin,
    Whive,
}

impl From<Software> for SoftwareId {
    fn from(software: Software) -> Self {
        match software {
            Software::Bitcoin => SoftwareId::Bitcoin,
            Software::Whive => SoftwareId::Whive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download and install a node release for this platform
    Install {
        /// Which node to install
        #[clap(value_enum)]
        software: Software,
        /// Reinstall without asking when already installed
        #[clap(long)]
        yes: bool,
    },
    /// Launch an installed node
    Run {
        /// Which node to run
        #[clap(value_enum)]
        software: Software,
        /// Run Bitcoin as a pruned node
        #[clap(long)]
        pruned: bool,
    },
    /// Check a running node's status
    Status {
        /// Which node to query
        #[clap(value_enum)]
        software: Software,
    },
    /// Start pool mining in a new terminal
    Mine {
        /// Which coin to mine
        #[clap(value_enum)]
        software: Software,
        /// Payout address (prompted for when omitted)
        #[clap(long)]
        address: Option<String>,
        /// Worker name appended to the pool username (Bitcoin only)
        #[clap(long)]
        worker: Option<String>,
        /// Named Bitcoin pool (defaults to the saved preference)
        #[clap(long)]
        pool: Option<String>,
        /// Skip the hardware-wear disclaimer
        #[clap(long)]
        yes: bool,
    },
    /// Check and report the environment
    Doctor,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install { software, yes } => {
            commands::install::install(software.into(), yes).map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Run { software, pruned } => {
            commands::run::run_node(software.into(), pruned).map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Status { software } => {
            commands::status::node_status(software.into()).map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Mine {
            software,
            address,
            worker,
            pool,
            yes,
        } => commands::mine::mine(
            software.into(),
            commands::mine::MineOptions {
                address,
                worker,
                pool,
                assume_yes: yes,
            },
        )
        .map_err(|e| anyhow::anyhow!(e)),
        Commands::Doctor => {
            commands::doctor::check_environment().map_err(|e| anyhow::anyhow!(e))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
